//! Affliction use cases.
//!
//! Applying and clearing afflictions on actors, and the auto-fail gate every
//! roll passes before any dice are thrown.

use std::sync::Arc;

use weirdwizard_domain::{
    Actor, ActorId, AfflictionCatalog, AfflictionId, Attribute, DerivedStats,
    EffectChangeRegistry,
};

use crate::infrastructure::ports::{
    ActorRepo, DialogPort, HostError, NotificationPort, RepoError,
};

/// What the actor is trying to do when checked for auto-failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedAction {
    Attribute,
    Attack,
    Spell,
}

impl BlockedAction {
    fn verb(&self) -> &'static str {
        match self {
            BlockedAction::Attribute => "roll",
            BlockedAction::Attack => "attack",
            BlockedAction::Spell => "cast",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AfflictionError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("Affliction not in catalog: {0}")]
    UnknownAffliction(AfflictionId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Affliction operations.
pub struct AfflictionOps {
    actors: Arc<dyn ActorRepo>,
    dialog: Arc<dyn DialogPort>,
    notifier: Arc<dyn NotificationPort>,
    catalog: Arc<AfflictionCatalog>,
    registry: Arc<EffectChangeRegistry>,
}

impl AfflictionOps {
    pub fn new(
        actors: Arc<dyn ActorRepo>,
        dialog: Arc<dyn DialogPort>,
        notifier: Arc<dyn NotificationPort>,
        catalog: Arc<AfflictionCatalog>,
        registry: Arc<EffectChangeRegistry>,
    ) -> Self {
        Self {
            actors,
            dialog,
            notifier,
            catalog,
            registry,
        }
    }

    async fn actor(&self, id: ActorId) -> Result<Actor, AfflictionError> {
        self.actors
            .get(id)
            .await?
            .ok_or(AfflictionError::ActorNotFound(id))
    }

    /// Apply an affliction. Returns `false` when the actor already has it.
    pub async fn apply_affliction(
        &self,
        actor_id: ActorId,
        affliction: AfflictionId,
    ) -> Result<bool, AfflictionError> {
        let actor = self.actor(actor_id).await?;
        if actor.has_affliction(affliction) {
            tracing::debug!(actor_id = %actor_id, %affliction, "Affliction already present");
            return Ok(false);
        }

        let effect = self
            .catalog
            .get(affliction)
            .ok_or(AfflictionError::UnknownAffliction(affliction))?
            .to_effect();
        self.actors.create_effects(actor_id, vec![effect]).await?;

        tracing::info!(actor_id = %actor_id, %affliction, "Affliction applied");
        Ok(true)
    }

    /// Remove one affliction. Returns `false` when the actor did not have it.
    pub async fn remove_affliction(
        &self,
        actor_id: ActorId,
        affliction: AfflictionId,
    ) -> Result<bool, AfflictionError> {
        let actor = self.actor(actor_id).await?;
        let ids: Vec<_> = actor
            .effects
            .iter()
            .filter(|effect| effect.affliction == Some(affliction))
            .map(|effect| effect.id)
            .collect();
        if ids.is_empty() {
            return Ok(false);
        }

        self.actors.delete_effects(actor_id, ids).await?;
        tracing::info!(actor_id = %actor_id, %affliction, "Affliction removed");
        Ok(true)
    }

    /// Apply the affliction if absent, remove it otherwise. Returns whether
    /// the actor has it afterwards.
    pub async fn toggle_affliction(
        &self,
        actor_id: ActorId,
        affliction: AfflictionId,
    ) -> Result<bool, AfflictionError> {
        if self.remove_affliction(actor_id, affliction).await? {
            Ok(false)
        } else {
            self.apply_affliction(actor_id, affliction).await
        }
    }

    /// Delete every affliction effect of an actor.
    ///
    /// With `confirm`, asks first and returns `None` if declined. Otherwise
    /// returns how many effects were removed; clearing an actor without
    /// afflictions removes nothing.
    pub async fn clear_afflictions(
        &self,
        actor_id: ActorId,
        confirm: bool,
    ) -> Result<Option<usize>, AfflictionError> {
        let actor = self.actor(actor_id).await?;
        if confirm
            && !self
                .dialog
                .confirm(
                    "Clear Afflictions",
                    &format!("Remove every affliction from {}?", actor.name),
                )
                .await?
        {
            tracing::debug!(actor_id = %actor_id, "Clearing afflictions declined");
            return Ok(None);
        }

        let ids = actor.affliction_effect_ids();
        let count = ids.len();
        if count > 0 {
            self.actors.delete_effects(actor_id, ids).await?;
        }

        tracing::info!(actor_id = %actor_id, count, "Afflictions cleared");
        Ok(Some(count))
    }

    /// Whether an affliction makes the actor automatically fail rolls with
    /// `attribute`. Posts a warning when it does.
    pub fn is_actor_blocked(
        &self,
        actor: &Actor,
        action: BlockedAction,
        attribute: Option<Attribute>,
    ) -> bool {
        let Some(attribute) = attribute else {
            return false;
        };
        let stats = DerivedStats::prepare(actor, &self.registry);
        if !stats.auto_fail(attribute) {
            return false;
        }

        tracing::debug!(actor_id = %actor.id, ?action, %attribute, "Roll blocked by auto-fail");
        self.notifier.warn(&format!(
            "{} cannot {}: afflictions make {} rolls fail automatically.",
            actor.name,
            action.verb(),
            attribute
        ));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockActorRepo, MockDialogPort, MockNotificationPort};
    use mockall::predicate::*;
    use weirdwizard_domain::{ActiveEffect, ActorKind};

    struct Mocks {
        actors: MockActorRepo,
        dialog: MockDialogPort,
        notifier: MockNotificationPort,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                actors: MockActorRepo::new(),
                dialog: MockDialogPort::new(),
                notifier: MockNotificationPort::new(),
            }
        }

        fn build(self) -> AfflictionOps {
            AfflictionOps::new(
                Arc::new(self.actors),
                Arc::new(self.dialog),
                Arc::new(self.notifier),
                Arc::new(AfflictionCatalog::build_all()),
                Arc::new(EffectChangeRegistry::standard()),
            )
        }
    }

    fn afflicted(affliction: AfflictionId) -> Actor {
        let effect = AfflictionCatalog::build_all()
            .get(affliction)
            .unwrap()
            .to_effect();
        Actor::new("Ada", ActorKind::Character).with_effect(effect)
    }

    #[tokio::test]
    async fn applies_missing_affliction_as_one_effect() {
        let actor = Actor::new("Ada", ActorKind::Character);
        let id = actor.id;
        let mut mocks = Mocks::new();
        mocks
            .actors
            .expect_get()
            .with(eq(id))
            .returning(move |_| Ok(Some(actor.clone())));
        mocks
            .actors
            .expect_create_effects()
            .withf(move |actor, effects| {
                *actor == id
                    && effects.len() == 1
                    && effects[0].affliction == Some(AfflictionId::Stunned)
                    && effects[0].duration == Some(3600)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let applied = mocks
            .build()
            .apply_affliction(id, AfflictionId::Stunned)
            .await
            .unwrap();
        assert!(applied);
    }

    #[tokio::test]
    async fn does_not_duplicate_an_affliction() {
        let actor = afflicted(AfflictionId::Prone);
        let id = actor.id;
        let mut mocks = Mocks::new();
        mocks
            .actors
            .expect_get()
            .returning(move |_| Ok(Some(actor.clone())));
        mocks.actors.expect_create_effects().never();

        let applied = mocks
            .build()
            .apply_affliction(id, AfflictionId::Prone)
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn missing_actor_is_an_error() {
        let mut mocks = Mocks::new();
        mocks.actors.expect_get().returning(|_| Ok(None));

        let err = mocks
            .build()
            .apply_affliction(ActorId::new(), AfflictionId::Dazed)
            .await
            .unwrap_err();
        assert!(matches!(err, AfflictionError::ActorNotFound(_)));
    }

    #[tokio::test]
    async fn clear_deletes_only_afflictions() {
        let actor = afflicted(AfflictionId::Blinded).with_effect(ActiveEffect::new("Blessing"));
        let id = actor.id;
        let affliction_ids = actor.affliction_effect_ids();
        let mut mocks = Mocks::new();
        mocks
            .actors
            .expect_get()
            .returning(move |_| Ok(Some(actor.clone())));
        mocks
            .actors
            .expect_delete_effects()
            .withf(move |actor, ids| *actor == id && *ids == affliction_ids)
            .times(1)
            .returning(|_, _| Ok(()));

        let cleared = mocks.build().clear_afflictions(id, false).await.unwrap();
        assert_eq!(cleared, Some(1));
    }

    #[tokio::test]
    async fn clear_twice_is_idempotent() {
        let actor = Actor::new("Ada", ActorKind::Character);
        let id = actor.id;
        let mut mocks = Mocks::new();
        mocks
            .actors
            .expect_get()
            .returning(move |_| Ok(Some(actor.clone())));
        mocks.actors.expect_delete_effects().never();

        let ops = mocks.build();
        assert_eq!(ops.clear_afflictions(id, false).await.unwrap(), Some(0));
        assert_eq!(ops.clear_afflictions(id, false).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn declined_confirmation_abandons_clear() {
        let actor = afflicted(AfflictionId::Stunned);
        let id = actor.id;
        let mut mocks = Mocks::new();
        mocks
            .actors
            .expect_get()
            .returning(move |_| Ok(Some(actor.clone())));
        mocks.dialog.expect_confirm().returning(|_, _| Ok(false));
        mocks.actors.expect_delete_effects().never();

        let cleared = mocks.build().clear_afflictions(id, true).await.unwrap();
        assert_eq!(cleared, None);
    }

    #[tokio::test]
    async fn toggle_removes_present_affliction() {
        let actor = afflicted(AfflictionId::Slowed);
        let id = actor.id;
        let mut mocks = Mocks::new();
        mocks
            .actors
            .expect_get()
            .returning(move |_| Ok(Some(actor.clone())));
        mocks
            .actors
            .expect_delete_effects()
            .times(1)
            .returning(|_, _| Ok(()));
        mocks.actors.expect_create_effects().never();

        let has = mocks
            .build()
            .toggle_affliction(id, AfflictionId::Slowed)
            .await
            .unwrap();
        assert!(!has);
    }

    #[test]
    fn unconscious_blocks_strength_and_warns() {
        let actor = afflicted(AfflictionId::Unconscious);
        let mut mocks = Mocks::new();
        mocks
            .notifier
            .expect_warn()
            .withf(|message| message.contains("Ada cannot attack"))
            .times(1)
            .return_const(());

        let ops = mocks.build();
        assert!(ops.is_actor_blocked(&actor, BlockedAction::Attack, Some(Attribute::Str)));
    }

    #[test]
    fn unblocked_attribute_does_not_warn() {
        let actor = afflicted(AfflictionId::Unconscious);
        let mut mocks = Mocks::new();
        mocks.notifier.expect_warn().never();

        let ops = mocks.build();
        assert!(!ops.is_actor_blocked(&actor, BlockedAction::Attribute, Some(Attribute::Int)));
        assert!(!ops.is_actor_blocked(&actor, BlockedAction::Attribute, None));
    }
}

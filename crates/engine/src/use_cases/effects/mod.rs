//! Effect use cases.
//!
//! Health changes, instant effects fired from chat cards, triggered item
//! effects created on targets, and effect tooltips.

use std::sync::Arc;

use serde::Serialize;
use weirdwizard_domain::effects::{describe_change, paths};
use weirdwizard_domain::rolls::healing_from_expression;
use weirdwizard_domain::value_objects::{DiceParseError, EvaluatedFormula};
use weirdwizard_domain::{
    ActiveEffect, Actor, ActorId, DamageRollContext, DerivedStats, EffectChangeRegistry,
    InstantKind, BROKEN_CHANGE_MARKER,
};

use crate::infrastructure::ports::{ActorRepo, RandomPort, RepoError};
use crate::use_cases::afflictions::{AfflictionError, AfflictionOps};

#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("Invalid formula: {0}")]
    Formula(#[from] DiceParseError),
    #[error("Affliction error: {0}")]
    Affliction(#[from] AfflictionError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Which health value changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthTrack {
    Damage,
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthChange {
    pub actor: ActorId,
    pub track: HealthTrack,
    pub before: i32,
    pub after: i32,
}

/// What firing an instant effect did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstantOutcome {
    Health {
        /// The roll, for damage and healing formulas.
        rolled: Option<EvaluatedFormula>,
        change: HealthChange,
    },
    AfflictionApplied(bool),
    AfflictionsCleared(usize),
}

/// Effect operations.
pub struct EffectOps {
    actors: Arc<dyn ActorRepo>,
    random: Arc<dyn RandomPort>,
    afflictions: Arc<AfflictionOps>,
    registry: Arc<EffectChangeRegistry>,
}

impl EffectOps {
    pub fn new(
        actors: Arc<dyn ActorRepo>,
        random: Arc<dyn RandomPort>,
        afflictions: Arc<AfflictionOps>,
        registry: Arc<EffectChangeRegistry>,
    ) -> Self {
        Self {
            actors,
            random,
            afflictions,
            registry,
        }
    }

    async fn target(&self, id: ActorId) -> Result<Option<Actor>, EffectError> {
        let actor = self.actors.get(id).await?;
        if actor.is_none() {
            tracing::warn!(actor_id = %id, "Effect target not found, skipping");
        }
        Ok(actor)
    }

    /// Add damage, kept between zero and current health.
    pub async fn apply_damage(
        &self,
        target: ActorId,
        amount: i32,
    ) -> Result<Option<HealthChange>, EffectError> {
        let Some(actor) = self.target(target).await? else {
            return Ok(None);
        };
        let stats = DerivedStats::prepare(&actor, &self.registry);
        let after = actor.damage_after(amount, stats.current_health());
        self.actors.apply_damage(target, after).await?;

        tracing::info!(actor_id = %target, amount, before = actor.damage, after, "Damage applied");
        Ok(Some(HealthChange {
            actor: target,
            track: HealthTrack::Damage,
            before: actor.damage,
            after,
        }))
    }

    /// Heal damage, never below zero damage.
    pub async fn apply_healing(
        &self,
        target: ActorId,
        amount: i32,
    ) -> Result<Option<HealthChange>, EffectError> {
        let Some(actor) = self.target(target).await? else {
            return Ok(None);
        };
        let stats = DerivedStats::prepare(&actor, &self.registry);
        let after = actor.damage_after_healing(amount, stats.current_health());
        self.actors.apply_damage(target, after).await?;

        tracing::info!(actor_id = %target, amount, before = actor.damage, after, "Healing applied");
        Ok(Some(HealthChange {
            actor: target,
            track: HealthTrack::Damage,
            before: actor.damage,
            after,
        }))
    }

    /// Lower current health, not below zero.
    pub async fn lose_health(
        &self,
        target: ActorId,
        amount: i32,
    ) -> Result<Option<HealthChange>, EffectError> {
        let Some(actor) = self.target(target).await? else {
            return Ok(None);
        };
        let before = actor.base.int(paths::HEALTH_CURRENT);
        let after = before.saturating_sub(amount).max(0);
        self.actors.set_current_health(target, after).await?;

        tracing::info!(actor_id = %target, amount, before, after, "Health lost");
        Ok(Some(HealthChange {
            actor: target,
            track: HealthTrack::Current,
            before,
            after,
        }))
    }

    /// Raise current health, not above normal health.
    pub async fn recover_health(
        &self,
        target: ActorId,
        amount: i32,
    ) -> Result<Option<HealthChange>, EffectError> {
        let Some(actor) = self.target(target).await? else {
            return Ok(None);
        };
        let stats = DerivedStats::prepare(&actor, &self.registry);
        let before = actor.base.int(paths::HEALTH_CURRENT);
        let after = before.saturating_add(amount).min(stats.health()).max(before);
        self.actors.set_current_health(target, after).await?;

        tracing::info!(actor_id = %target, amount, before, after, "Health recovered");
        Ok(Some(HealthChange {
            actor: target,
            track: HealthTrack::Current,
            before,
            after,
        }))
    }

    /// Fire one instant effect on a target.
    pub async fn fire_instant(
        &self,
        target: ActorId,
        instant: &InstantKind,
    ) -> Result<Option<InstantOutcome>, EffectError> {
        tracing::debug!(actor_id = %target, label = instant.label_key(), "Firing instant effect");
        let rng = |min: i32, max: i32| self.random.gen_range(min, max);

        let outcome = match instant {
            InstantKind::Damage { formula } => {
                let rolled = DamageRollContext::new(formula.as_str()).roll(rng)?;
                self.apply_damage(target, rolled.total)
                    .await?
                    .map(|change| InstantOutcome::Health {
                        rolled: Some(rolled),
                        change,
                    })
            }
            InstantKind::Heal { formula } => {
                let mut rolled = healing_from_expression(formula)?.evaluate(rng);
                rolled.total = rolled.total.max(0);
                self.apply_healing(target, rolled.total)
                    .await?
                    .map(|change| InstantOutcome::Health {
                        rolled: Some(rolled),
                        change,
                    })
            }
            InstantKind::HealthLoss { amount } => self
                .lose_health(target, *amount)
                .await?
                .map(|change| InstantOutcome::Health {
                    rolled: None,
                    change,
                }),
            InstantKind::HealthRecover { amount } => self
                .recover_health(target, *amount)
                .await?
                .map(|change| InstantOutcome::Health {
                    rolled: None,
                    change,
                }),
            InstantKind::ApplyAffliction { affliction } => {
                match self.afflictions.apply_affliction(target, *affliction).await {
                    Ok(applied) => Some(InstantOutcome::AfflictionApplied(applied)),
                    Err(AfflictionError::ActorNotFound(_)) => {
                        tracing::warn!(actor_id = %target, "Effect target not found, skipping");
                        None
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            InstantKind::ClearAfflictions => {
                match self.afflictions.clear_afflictions(target, false).await {
                    Ok(cleared) => cleared.map(InstantOutcome::AfflictionsCleared),
                    Err(AfflictionError::ActorNotFound(_)) => {
                        tracing::warn!(actor_id = %target, "Effect target not found, skipping");
                        None
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };
        Ok(outcome)
    }

    /// Create copies of triggered effects on a target as one batch.
    ///
    /// Returns how many were created; `None` when the target is gone.
    pub async fn apply_effects(
        &self,
        target: ActorId,
        effects: &[ActiveEffect],
    ) -> Result<Option<usize>, EffectError> {
        if self.target(target).await?.is_none() {
            return Ok(None);
        }
        let copies: Vec<ActiveEffect> = effects.iter().map(ActiveEffect::materialize).collect();
        let count = copies.len();
        if count > 0 {
            self.actors.create_effects(target, copies).await?;
        }

        tracing::info!(actor_id = %target, count, "Effects applied");
        Ok(Some(count))
    }

    /// Tooltip lines for an effect, one per change.
    pub fn describe_effect(&self, effect: &ActiveEffect) -> Vec<String> {
        effect
            .changes
            .iter()
            .map(|change| {
                let line = describe_change(&self.registry, change);
                if line == BROKEN_CHANGE_MARKER {
                    tracing::warn!(
                        effect = %effect.name,
                        key = %change.key,
                        value = %change.value,
                        "Effect change is not registered"
                    );
                }
                line
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ScriptedRandom;
    use crate::infrastructure::ports::{MockActorRepo, MockDialogPort, MockNotificationPort};
    use mockall::predicate::*;
    use weirdwizard_domain::{
        ActorKind, AfflictionCatalog, AfflictionId, EffectChange, EffectTrigger,
    };

    fn ops(actors: MockActorRepo, dice: Vec<i32>) -> EffectOps {
        let actors: Arc<dyn ActorRepo> = Arc::new(actors);
        let registry = Arc::new(EffectChangeRegistry::standard());
        let afflictions = Arc::new(AfflictionOps::new(
            actors.clone(),
            Arc::new(MockDialogPort::new()),
            Arc::new(MockNotificationPort::new()),
            Arc::new(AfflictionCatalog::build_all()),
            registry.clone(),
        ));
        EffectOps::new(actors, Arc::new(ScriptedRandom::new(dice)), afflictions, registry)
    }

    fn returning(actor: Actor) -> MockActorRepo {
        let mut repo = MockActorRepo::new();
        repo.expect_get()
            .with(eq(actor.id))
            .returning(move |_| Ok(Some(actor.clone())));
        repo
    }

    #[tokio::test]
    async fn damage_is_capped_at_current_health() {
        let mut actor = Actor::new("Ada", ActorKind::Character);
        actor.damage = 8;
        let id = actor.id;
        let mut repo = returning(actor);
        repo.expect_apply_damage()
            .with(eq(id), eq(10))
            .times(1)
            .returning(|_, _| Ok(()));

        let change = ops(repo, vec![]).apply_damage(id, 5).await.unwrap().unwrap();
        assert_eq!(change.before, 8);
        assert_eq!(change.after, 10);
    }

    #[tokio::test]
    async fn healing_never_goes_below_zero_damage() {
        let mut actor = Actor::new("Ada", ActorKind::Character);
        actor.damage = 3;
        let id = actor.id;
        let mut repo = returning(actor);
        repo.expect_apply_damage()
            .with(eq(id), eq(0))
            .times(1)
            .returning(|_, _| Ok(()));

        let change = ops(repo, vec![]).apply_healing(id, 7).await.unwrap().unwrap();
        assert_eq!(change.after, 0);
    }

    #[tokio::test]
    async fn missing_target_is_skipped() {
        let mut repo = MockActorRepo::new();
        repo.expect_get().returning(|_| Ok(None));
        repo.expect_apply_damage().never();

        let change = ops(repo, vec![]).apply_damage(ActorId::new(), 4).await.unwrap();
        assert_eq!(change, None);
    }

    #[tokio::test]
    async fn damage_instant_rolls_its_formula() {
        let actor = Actor::new("Ada", ActorKind::Character);
        let id = actor.id;
        let mut repo = returning(actor);
        repo.expect_apply_damage()
            .with(eq(id), eq(7))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = ops(repo, vec![3, 4])
            .fire_instant(id, &InstantKind::Damage { formula: "2d6".into() })
            .await
            .unwrap();
        match outcome {
            Some(InstantOutcome::Health { rolled: Some(rolled), change }) => {
                assert_eq!(rolled.formula, "2d6");
                assert_eq!(rolled.total, 7);
                assert_eq!(change.after, 7);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn health_loss_lowers_current_health() {
        let actor = Actor::new("Ada", ActorKind::Character);
        let id = actor.id;
        let mut repo = returning(actor);
        repo.expect_set_current_health()
            .with(eq(id), eq(7))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = ops(repo, vec![])
            .fire_instant(id, &InstantKind::HealthLoss { amount: 3 })
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Some(InstantOutcome::Health { rolled: None, change }) if change.after == 7
        ));
    }

    #[tokio::test]
    async fn health_recovery_stops_at_normal_health() {
        let actor = Actor::new("Ada", ActorKind::Character).with_stat(paths::HEALTH_CURRENT, 6);
        let id = actor.id;
        let mut repo = returning(actor);
        repo.expect_set_current_health()
            .with(eq(id), eq(10))
            .times(1)
            .returning(|_, _| Ok(()));

        ops(repo, vec![])
            .fire_instant(id, &InstantKind::HealthRecover { amount: 9 })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn affliction_instant_applies_through_catalog() {
        let actor = Actor::new("Ada", ActorKind::Character);
        let id = actor.id;
        let mut repo = returning(actor);
        repo.expect_create_effects()
            .withf(|_, effects| effects[0].affliction == Some(AfflictionId::Frightened))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = ops(repo, vec![])
            .fire_instant(
                id,
                &InstantKind::ApplyAffliction {
                    affliction: AfflictionId::Frightened,
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, Some(InstantOutcome::AfflictionApplied(true)));
    }

    #[tokio::test]
    async fn triggered_effects_are_created_as_passive_copies() {
        let actor = Actor::new("Ada", ActorKind::Character);
        let id = actor.id;
        let burning = ActiveEffect::new("Burning").with_trigger(EffectTrigger::OnCritical);
        let source_id = burning.id;
        let mut repo = returning(actor);
        repo.expect_create_effects()
            .withf(move |_, effects| {
                effects.len() == 1
                    && effects[0].id != source_id
                    && effects[0].trigger == EffectTrigger::Passive
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let count = ops(repo, vec![]).apply_effects(id, &[burning]).await.unwrap();
        assert_eq!(count, Some(1));
    }

    #[test]
    fn tooltips_mark_broken_changes() {
        let effect = ActiveEffect::new("Odd")
            .with_change(EffectChange::new("boons.str", 1))
            .with_change(EffectChange::new("nonsense.key", 1));
        let lines = ops(MockActorRepo::new(), vec![]).describe_effect(&effect);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "WW.EffectKeys.boons.str +1");
        assert_eq!(lines[1], BROKEN_CHANGE_MARKER);
    }
}

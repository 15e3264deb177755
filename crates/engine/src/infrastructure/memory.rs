//! In-memory document store for development and testing.
//!
//! Holds actors and combats in maps behind a `RwLock`. Nothing is persisted;
//! the host's document layer replaces this in production.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use weirdwizard_domain::effects::paths;
use weirdwizard_domain::value_objects::ChangeValue;
use weirdwizard_domain::{
    combat::apply_updates, ActiveEffect, Actor, ActorId, Combat, CombatId, CombatantUpdate,
    EffectId,
};

use crate::infrastructure::ports::{ActorRepo, CombatRepo, RepoError};

/// In-memory actor documents.
#[derive(Default, Clone)]
pub struct InMemoryActorRepo {
    actors: Arc<RwLock<HashMap<ActorId, Actor>>>,
}

impl InMemoryActorRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an actor.
    pub async fn insert(&self, actor: Actor) {
        self.actors.write().await.insert(actor.id, actor);
    }

    async fn update<T>(
        &self,
        id: ActorId,
        f: impl FnOnce(&mut Actor) -> T,
    ) -> Result<T, RepoError> {
        let mut actors = self.actors.write().await;
        let actor = actors
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("Actor", id))?;
        Ok(f(actor))
    }
}

#[async_trait]
impl ActorRepo for InMemoryActorRepo {
    async fn get(&self, id: ActorId) -> Result<Option<Actor>, RepoError> {
        Ok(self.actors.read().await.get(&id).cloned())
    }

    async fn create_effects(
        &self,
        actor: ActorId,
        effects: Vec<ActiveEffect>,
    ) -> Result<(), RepoError> {
        self.update(actor, |actor| actor.effects.extend(effects))
            .await
    }

    async fn delete_effects(&self, actor: ActorId, ids: Vec<EffectId>) -> Result<(), RepoError> {
        self.update(actor, |actor| {
            actor.effects.retain(|effect| !ids.contains(&effect.id))
        })
        .await
    }

    async fn apply_damage(&self, actor: ActorId, damage: i32) -> Result<(), RepoError> {
        self.update(actor, |actor| actor.damage = damage).await
    }

    async fn set_current_health(&self, actor: ActorId, current: i32) -> Result<(), RepoError> {
        self.update(actor, |actor| {
            actor
                .base
                .set(paths::HEALTH_CURRENT, ChangeValue::Int(current))
        })
        .await
    }
}

/// In-memory combat documents.
#[derive(Default, Clone)]
pub struct InMemoryCombatRepo {
    combats: Arc<RwLock<HashMap<CombatId, Combat>>>,
}

impl InMemoryCombatRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, combat: Combat) {
        self.combats.write().await.insert(combat.id, combat);
    }
}

#[async_trait]
impl CombatRepo for InMemoryCombatRepo {
    async fn get(&self, id: CombatId) -> Result<Option<Combat>, RepoError> {
        Ok(self.combats.read().await.get(&id).cloned())
    }

    async fn update_combatants(
        &self,
        combat: CombatId,
        updates: Vec<CombatantUpdate>,
    ) -> Result<(), RepoError> {
        let mut combats = self.combats.write().await;
        let combat = combats
            .get_mut(&combat)
            .ok_or_else(|| RepoError::not_found("Combat", combat))?;
        apply_updates(combat, &updates);
        Ok(())
    }

    async fn set_turn(
        &self,
        combat: CombatId,
        round: u32,
        turn: Option<usize>,
    ) -> Result<(), RepoError> {
        let mut combats = self.combats.write().await;
        let combat = combats
            .get_mut(&combat)
            .ok_or_else(|| RepoError::not_found("Combat", combat))?;
        combat.round = round;
        combat.turn = turn;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weirdwizard_domain::{ActorKind, Combatant};

    #[tokio::test]
    async fn effects_are_created_and_deleted_in_batches() {
        let repo = InMemoryActorRepo::new();
        let actor = Actor::new("Ada", ActorKind::Character);
        let id = actor.id;
        repo.insert(actor).await;

        let first = ActiveEffect::new("Blessed");
        let second = ActiveEffect::new("Cursed");
        let first_id = first.id;
        repo.create_effects(id, vec![first, second]).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().unwrap().effects.len(), 2);

        repo.delete_effects(id, vec![first_id, EffectId::new()])
            .await
            .unwrap();
        let effects = repo.get(id).await.unwrap().unwrap().effects;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].name, "Cursed");
    }

    #[tokio::test]
    async fn writes_to_missing_actor_are_not_found() {
        let repo = InMemoryActorRepo::new();
        let err = repo.apply_damage(ActorId::new(), 3).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn combatant_updates_and_turn_are_persisted() {
        let repo = InMemoryCombatRepo::new();
        let ally = Combatant::player("Ally").with_initiative(3001);
        let ally_id = ally.id;
        let combat = Combat::new(vec![ally]);
        let id = combat.id;
        repo.insert(combat).await;

        repo.update_combatants(id, vec![CombatantUpdate::acted(ally_id, true)])
            .await
            .unwrap();
        repo.set_turn(id, 2, Some(0)).await.unwrap();

        let combat = repo.get(id).await.unwrap().unwrap();
        assert!(combat.combatants[0].acted);
        assert_eq!(combat.round, 2);
        assert_eq!(combat.turn, Some(0));
    }
}

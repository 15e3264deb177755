//! Document store port traits.
//!
//! Every read re-fetches the current document; writes are batched replace or
//! merge updates. Last writer wins, as in the host.

use async_trait::async_trait;
use weirdwizard_domain::{
    ActiveEffect, Actor, ActorId, Combat, CombatId, CombatantUpdate, EffectId,
};

use super::error::RepoError;
use crate::infrastructure::settings::SystemSettings;

// =============================================================================
// Actors
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActorRepo: Send + Sync {
    async fn get(&self, id: ActorId) -> Result<Option<Actor>, RepoError>;

    /// Create embedded effects as one batch.
    async fn create_effects(
        &self,
        actor: ActorId,
        effects: Vec<ActiveEffect>,
    ) -> Result<(), RepoError>;

    /// Delete embedded effects as one batch. Unknown ids are ignored.
    async fn delete_effects(&self, actor: ActorId, ids: Vec<EffectId>) -> Result<(), RepoError>;

    /// Persist the actor's new damage total.
    async fn apply_damage(&self, actor: ActorId, damage: i32) -> Result<(), RepoError>;

    /// Persist the actor's current health.
    async fn set_current_health(&self, actor: ActorId, current: i32) -> Result<(), RepoError>;
}

// =============================================================================
// Combat
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CombatRepo: Send + Sync {
    async fn get(&self, id: CombatId) -> Result<Option<Combat>, RepoError>;

    /// Apply combatant updates as one batch.
    async fn update_combatants(
        &self,
        combat: CombatId,
        updates: Vec<CombatantUpdate>,
    ) -> Result<(), RepoError>;

    async fn set_turn(
        &self,
        combat: CombatId,
        round: u32,
        turn: Option<usize>,
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Settings Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn get(&self) -> Result<SystemSettings, RepoError>;
}

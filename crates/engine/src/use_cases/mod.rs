//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific rules area. Use cases read
//! documents through the ports, run the domain rules and persist the result.

pub mod afflictions;
pub mod chat_actions;
pub mod combat;
pub mod effects;
pub mod roll;

// Re-export main types
pub use afflictions::{AfflictionError, AfflictionOps, BlockedAction};
pub use chat_actions::{ChatAction, ChatActionError, ChatActionResult, ChatActions};
pub use combat::{CombatError, CombatOps, TurnPointer};
pub use effects::{EffectError, EffectOps, HealthChange, InstantOutcome};
pub use roll::{RollError, RollUseCases};

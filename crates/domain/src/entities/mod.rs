//! Entities - documents with identity owned by the host

mod active_effect;
mod actor;
mod instant_effect;
mod item;

pub use active_effect::ActiveEffect;
pub use actor::{Actor, ActorKind, Disposition};
pub use instant_effect::{fired_by, EffectTrigger, InstantEffect, InstantKind};
pub use item::{Item, ItemKind, WeaponTraits};

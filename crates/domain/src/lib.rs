extern crate self as weirdwizard_domain;

pub mod combat;
pub mod effects;
pub mod entities;
pub mod error;
pub mod ids;
pub mod rolls;
pub mod value_objects;

pub use entities::{
    fired_by, ActiveEffect, Actor, ActorKind, Disposition, EffectTrigger, InstantEffect,
    InstantKind, Item, ItemKind, WeaponTraits,
};

pub use error::DomainError;

pub use effects::{
    AfflictionCatalog, AfflictionId, DerivedStats, EffectChange, EffectChangeRegistry,
    BROKEN_CHANGE_MARKER,
};

pub use combat::{Combat, Combatant, CombatantUpdate, SortUpdate};

pub use rolls::{AttributeRollContext, DamageRollContext, RollOrigin, RollResult, TargetSnapshot};

pub use ids::{ActorId, CombatId, CombatantId, EffectId, ItemId, MessageId};

pub use value_objects::{
    AgainstKey, Attribute, BoonSources, BoonsAgainst, DieRole, Outcome, RollFormula, RollTags,
};

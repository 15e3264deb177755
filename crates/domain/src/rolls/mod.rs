//! Roll construction and evaluation.

mod attribute;
mod damage;

pub use attribute::{AttributeRollContext, RollOrigin, RollResult, TargetRef, TargetSnapshot};
pub use damage::{healing_formula, healing_from_expression, DamageRollContext};

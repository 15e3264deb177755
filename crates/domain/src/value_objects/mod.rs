//! Value objects: small immutable rules types with no identity.

mod attribute;
mod boons;
mod dice;
mod outcome;
mod property_bag;

pub use attribute::{AgainstKey, Attribute};
pub use boons::{
    compute_final_boons, plus_minus, target_boons, BoonSources, BoonsAgainst, RollTags,
};
pub use dice::{
    DiceGroup, DiceParseError, DieResult, DieRole, EvaluatedFormula, EvaluatedTerm,
    FormulaStyle, FormulaTerm, RollFormula, Sign, TermBody, TermKind,
};
pub use outcome::{Outcome, CRITICAL_MARGIN, CRITICAL_THRESHOLD};
pub use property_bag::{ChangeValue, PropertyBag};

#[cfg(test)]
pub(crate) use dice::tests::scripted;

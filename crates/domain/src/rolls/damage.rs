//! Damage and healing rolls: literal sums of dice groups and flat modifiers.

use serde::{Deserialize, Serialize};

use crate::effects::DerivedStats;
use crate::entities::Item;
use crate::value_objects::{
    DiceGroup, DiceParseError, EvaluatedFormula, FormulaTerm, RollFormula, Sign, TermKind,
};

/// Inputs of a damage roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageRollContext {
    /// Base expression such as `2d6` or `1d6+1`.
    pub base: String,
    /// Extra d6 from bonus damage and effects.
    #[serde(default)]
    pub extra_dice: i32,
    #[serde(default)]
    pub modifier: i32,
    /// Brutal weapons reroll ones on every d6.
    #[serde(default)]
    pub brutal: bool,
}

impl DamageRollContext {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            extra_dice: 0,
            modifier: 0,
            brutal: false,
        }
    }

    /// Damage of an item, with the wielder's extra dice and modifiers.
    ///
    /// Returns `None` for items without a damage expression.
    pub fn for_item(item: &Item, stats: &DerivedStats, apply_bonus_damage: bool) -> Option<Self> {
        let base = item.damage.clone()?;
        let mut extra_dice = stats.extra_damage_dice();
        if apply_bonus_damage {
            extra_dice += stats.bonus_damage();
        }
        Some(Self {
            base,
            extra_dice,
            modifier: stats.extra_damage_mod(),
            brutal: item.traits.brutal,
        })
    }

    pub fn with_extra_dice(mut self, dice: i32) -> Self {
        self.extra_dice = dice;
        self
    }

    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn brutal(mut self) -> Self {
        self.brutal = true;
        self
    }

    /// `{base} + {extra}d6 + {mod}`, with `r1` on every d6 group when brutal.
    pub fn formula(&self) -> Result<RollFormula, DiceParseError> {
        let mut formula = RollFormula::spaced();
        for term in RollFormula::parse_terms(&self.base, TermKind::Damage)? {
            formula.push(term);
        }
        if self.extra_dice > 0 {
            let group = DiceGroup::new(self.extra_dice.unsigned_abs(), 6)?;
            formula.push(FormulaTerm::dice(TermKind::BonusDamage, Sign::Plus, group));
        }
        if self.modifier != 0 {
            formula.push(FormulaTerm::flat(TermKind::Modifier, self.modifier));
        }
        if self.brutal {
            formula.map_dice(|group| {
                if group.faces == 6 {
                    group.with_reroll_ones()
                } else {
                    group
                }
            });
        }
        Ok(formula)
    }

    /// Evaluate; totals below zero deal no damage.
    pub fn roll(&self, rng: impl FnMut(i32, i32) -> i32) -> Result<EvaluatedFormula, DiceParseError> {
        let mut evaluated = self.formula()?.evaluate(rng);
        evaluated.total = evaluated.total.max(0);
        Ok(evaluated)
    }
}

/// Healing roll: `{dice}d6` plus an optional flat modifier.
pub fn healing_formula(dice: u32, modifier: i32) -> Result<RollFormula, DiceParseError> {
    let mut formula = RollFormula::spaced();
    formula.push(FormulaTerm::dice(
        TermKind::Healing,
        Sign::Plus,
        DiceGroup::new(dice, 6)?,
    ));
    if modifier != 0 {
        formula.push(FormulaTerm::flat(TermKind::Modifier, modifier));
    }
    Ok(formula)
}

/// Healing roll from a stored expression such as `1d6+2`.
pub fn healing_from_expression(expression: &str) -> Result<RollFormula, DiceParseError> {
    let mut formula = RollFormula::spaced();
    for term in RollFormula::parse_terms(expression, TermKind::Healing)? {
        formula.push(term);
    }
    Ok(formula)
}

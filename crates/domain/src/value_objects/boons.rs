//! Boon/bane modifier pipeline.
//!
//! A d20 check gains boon dice from several independent sources. All of them
//! are plain integers (negative values are banes) and they are summed without
//! clamping. A sum of zero means a plain roll with no boon dice.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::AgainstKey;

/// Sum every enabled boon contribution.
///
/// `attack_if_toggled` and `spell_if_toggled` are expected to already be zero
/// when their toggle is off; see [`BoonSources::final_boons`].
pub fn compute_final_boons(
    situational: i32,
    effect_boons: i32,
    fixed_boons: i32,
    attack_if_toggled: i32,
    spell_if_toggled: i32,
) -> i32 {
    situational + effect_boons + fixed_boons + attack_if_toggled + spell_if_toggled
}

/// Render a signed integer with its sign always visible: `+2`, `-1`, `+0`.
pub fn plus_minus(value: i32) -> String {
    if value < 0 {
        value.to_string()
    } else {
        format!("+{}", value)
    }
}

/// Every boon source feeding a single check, with the opt-in toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoonSources {
    /// Entered by the user for this roll only.
    pub situational: i32,
    /// Granted by active effects on the roller for this attribute.
    pub effect: i32,
    /// Baked into the source item (weapon or spell).
    pub fixed: i32,
    /// Attack pool from active effects.
    pub attack: i32,
    /// Spell pool from active effects.
    pub spell: i32,
    pub apply_attack: bool,
    pub apply_spell: bool,
}

impl BoonSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_situational(mut self, boons: i32) -> Self {
        self.situational = boons;
        self
    }

    pub fn with_effect(mut self, boons: i32) -> Self {
        self.effect = boons;
        self
    }

    pub fn with_fixed(mut self, boons: i32) -> Self {
        self.fixed = boons;
        self
    }

    pub fn with_attack(mut self, boons: i32, apply: bool) -> Self {
        self.attack = boons;
        self.apply_attack = apply;
        self
    }

    pub fn with_spell(mut self, boons: i32, apply: bool) -> Self {
        self.spell = boons;
        self.apply_spell = apply;
        self
    }

    pub fn final_boons(&self) -> i32 {
        compute_final_boons(
            self.situational,
            self.effect,
            self.fixed,
            if self.apply_attack { self.attack } else { 0 },
            if self.apply_spell { self.spell } else { 0 },
        )
    }

    /// Signed display string for the roll dialog.
    pub fn display(&self) -> String {
        plus_minus(self.final_boons())
    }
}

/// Category tags of the roll, used for category boons granted by targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollTags {
    pub is_attack: bool,
    pub is_spell: bool,
    pub is_magical: bool,
}

impl RollTags {
    pub fn attack() -> Self {
        Self {
            is_attack: true,
            ..Self::default()
        }
    }

    pub fn spell() -> Self {
        Self {
            is_spell: true,
            is_magical: true,
            ..Self::default()
        }
    }
}

/// Boons a creature grants to rolls made against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoonsAgainst {
    #[serde(default)]
    pub by_key: BTreeMap<AgainstKey, i32>,
    #[serde(default)]
    pub from_attacks: i32,
    #[serde(default)]
    pub from_spells: i32,
    #[serde(default)]
    pub from_magical: i32,
    /// Rolls against these keys succeed automatically.
    #[serde(default)]
    pub auto_success: BTreeSet<AgainstKey>,
}

impl BoonsAgainst {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: AgainstKey, boons: i32) -> Self {
        *self.by_key.entry(key).or_insert(0) += boons;
        self
    }

    pub fn get(&self, key: AgainstKey) -> i32 {
        self.by_key.get(&key).copied().unwrap_or(0)
    }

    pub fn auto_succeeds(&self, key: Option<AgainstKey>) -> bool {
        key.is_some_and(|key| self.auto_success.contains(&key))
    }
}

/// Extra boons a single target contributes on top of the roller's final boons.
///
/// The against-key boons and each category boon whose tag is set are summed;
/// categories are independent and never exclusive.
pub fn target_boons(against: Option<AgainstKey>, tags: RollTags, target: &BoonsAgainst) -> i32 {
    let mut boons = against.map(|key| target.get(key)).unwrap_or(0);
    if tags.is_attack {
        boons += target.from_attacks;
    }
    if tags.is_spell {
        boons += target.from_spells;
    }
    if tags.is_magical {
        boons += target.from_magical;
    }
    boons
}

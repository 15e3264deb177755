//! Item entity - weapons, spells and talents that can be used from a sheet

use serde::{Deserialize, Serialize};

use crate::value_objects::{AgainstKey, Attribute, RollTags};
use crate::ItemId;

use super::active_effect::ActiveEffect;
use super::instant_effect::InstantEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Weapon,
    Spell,
    Talent,
    Equipment,
}

/// Weapon traits that change how rolls are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponTraits {
    /// Damage dice reroll ones once.
    #[serde(default)]
    pub brutal: bool,
}

/// Data for an item that can be rolled.
///
/// All fields are public; there is no invalid combination of values. An item
/// without `attribute` is used without a roll and fires its `OnUse` effects
/// only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub attribute: Option<Attribute>,
    #[serde(default)]
    pub against: Option<AgainstKey>,
    /// Innate boons (positive) or banes (negative) of the item.
    #[serde(default)]
    pub fixed_boons: i32,
    /// Damage expression such as `2d6` or `1d6+1`.
    #[serde(default)]
    pub damage: Option<String>,
    #[serde(default)]
    pub healing: Option<String>,
    #[serde(default)]
    pub traits: WeaponTraits,
    #[serde(default)]
    pub magical: bool,
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,
    #[serde(default)]
    pub instant: Vec<InstantEffect>,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            attribute: None,
            against: None,
            fixed_boons: 0,
            damage: None,
            healing: None,
            traits: WeaponTraits::default(),
            magical: false,
            effects: Vec::new(),
            instant: Vec::new(),
        }
    }

    pub fn weapon(name: impl Into<String>, attribute: Attribute, damage: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute),
            against: Some(AgainstKey::Def),
            damage: Some(damage.into()),
            ..Self::new(name, ItemKind::Weapon)
        }
    }

    pub fn spell(name: impl Into<String>, attribute: Attribute, against: Option<AgainstKey>) -> Self {
        Self {
            attribute: Some(attribute),
            against,
            magical: true,
            ..Self::new(name, ItemKind::Spell)
        }
    }

    pub fn with_fixed_boons(mut self, boons: i32) -> Self {
        self.fixed_boons = boons;
        self
    }

    pub fn brutal(mut self) -> Self {
        self.traits.brutal = true;
        self
    }

    pub fn with_effect(mut self, effect: ActiveEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_instant(mut self, instant: InstantEffect) -> Self {
        self.instant.push(instant);
        self
    }

    pub fn is_attack(&self) -> bool {
        self.kind == ItemKind::Weapon
    }

    pub fn is_spell(&self) -> bool {
        self.kind == ItemKind::Spell
    }

    pub fn roll_tags(&self) -> RollTags {
        RollTags {
            is_attack: self.is_attack(),
            is_spell: self.is_spell(),
            is_magical: self.magical || self.is_spell(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_kind_and_magic() {
        let sword = Item::weapon("Sword", Attribute::Str, "2d6");
        assert_eq!(
            sword.roll_tags(),
            RollTags {
                is_attack: true,
                is_spell: false,
                is_magical: false
            }
        );

        let mut flaming = sword.clone();
        flaming.magical = true;
        assert!(flaming.roll_tags().is_magical);

        let bolt = Item::spell("Bolt", Attribute::Int, Some(AgainstKey::Agi));
        assert_eq!(bolt.roll_tags(), RollTags::spell());
    }

    #[test]
    fn weapons_default_against_defense() {
        assert_eq!(Item::weapon("Axe", Attribute::Str, "2d6").against, Some(AgainstKey::Def));
    }
}

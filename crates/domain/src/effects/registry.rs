//! Change-key registry.
//!
//! Maps every key an effect change may use (`boons.str`, `defense.override`,
//! ...) to its [`ChangeMeta`]. Built once at start-up and handed to whoever
//! needs it; nothing mutates it afterwards.

use std::collections::BTreeMap;

use crate::error::DomainError;
use crate::value_objects::{plus_minus, AgainstKey, Attribute, ChangeValue};

use super::change::{
    add_int, down_int, over_int, set_boo, up_int, ChangeMeta, EffectChange, ResolvedChange,
};

/// Marker shown in tooltips for changes whose key is not registered.
pub const BROKEN_CHANGE_MARKER: &str = "BROKEN EFFECT CHANGE, FIX IT!";

/// Document paths written by registered changes.
pub mod paths {
    use crate::value_objects::{AgainstKey, Attribute};

    pub const ATTACK_BOONS: &str = "boons.attacks";
    pub const SPELL_BOONS: &str = "boons.spells";
    pub const AGAINST_FROM_ATTACKS: &str = "boons.against.fromAttacks";
    pub const AGAINST_FROM_SPELLS: &str = "boons.against.fromSpells";
    pub const AGAINST_FROM_MAGICAL: &str = "boons.against.fromMagical";
    pub const EXTRA_DAMAGE_DICE: &str = "stats.damage.extraDice";
    pub const EXTRA_DAMAGE_MOD: &str = "stats.damage.extraMod";
    pub const DAMAGE: &str = "stats.damage.value";
    pub const BONUS_DAMAGE: &str = "stats.bonusDamage";
    pub const DEFENSE_NATURAL: &str = "stats.defense.natural";
    pub const DEFENSE_ARMORED: &str = "stats.defense.armored";
    pub const DEFENSE_BONUS: &str = "stats.defense.bonus";
    pub const DEFENSE_OVERRIDE: &str = "stats.defense.override";
    pub const HEALTH_NORMAL: &str = "stats.health.normal";
    pub const HEALTH_CURRENT: &str = "stats.health.current";
    pub const SPEED: &str = "stats.speed.current";
    pub const SPEED_HALVED: &str = "stats.speed.halved";
    pub const SIZE: &str = "stats.size";

    pub fn self_boons(attribute: Attribute) -> String {
        format!("boons.selfRolls.{}", attribute.key())
    }

    pub fn auto_fail(attribute: Attribute) -> String {
        format!("autoFail.{}", attribute.key())
    }

    pub fn boons_against(key: AgainstKey) -> String {
        format!("boons.against.{}", key.key())
    }

    pub fn auto_success_against(key: AgainstKey) -> String {
        format!("autoSuccess.against.{}", key.key())
    }

    pub fn attribute_score(attribute: Attribute) -> String {
        format!("attributes.{}.value", attribute.key())
    }
}

/// Immutable key -> metadata table.
#[derive(Debug, Clone, Default)]
pub struct EffectChangeRegistry {
    entries: BTreeMap<String, ChangeMeta>,
    /// Registration order, for grouped option lists in the config UI.
    order: Vec<String>,
}

impl EffectChangeRegistry {
    /// Registry without any keys.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The system's full set of change keys.
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        // Boons and banes on the actor's own rolls
        for attribute in Attribute::ALL {
            let path = paths::self_boons(attribute);
            registry.register(format!("boons.{}", attribute.key()), add_int(&path));
        }
        registry.register("boons.attacks", add_int(paths::ATTACK_BOONS));
        registry.register("boons.spells", add_int(paths::SPELL_BOONS));

        for attribute in Attribute::ALL {
            let path = paths::self_boons(attribute);
            registry.register(format!("banes.{}", attribute.key()), add_int(&path).negated());
        }
        registry.register("banes.attacks", add_int(paths::ATTACK_BOONS).negated());
        registry.register("banes.spells", add_int(paths::SPELL_BOONS).negated());

        for attribute in Attribute::ALL {
            let path = paths::auto_fail(attribute);
            registry.register(format!("autoFail.{}", attribute.key()), set_boo(&path));
        }

        // Rolls made against the actor
        for key in AgainstKey::ALL {
            let path = paths::boons_against(key);
            registry.register(format!("boonsAgainst.{}", key.key()), add_int(&path));
        }
        registry.register("boonsAgainst.fromAttacks", add_int(paths::AGAINST_FROM_ATTACKS));
        registry.register("boonsAgainst.fromSpells", add_int(paths::AGAINST_FROM_SPELLS));
        registry.register("boonsAgainst.fromMagical", add_int(paths::AGAINST_FROM_MAGICAL));

        for key in AgainstKey::ALL {
            let path = paths::boons_against(key);
            registry.register(format!("banesAgainst.{}", key.key()), add_int(&path).negated());
        }
        registry.register(
            "banesAgainst.fromAttacks",
            add_int(paths::AGAINST_FROM_ATTACKS).negated(),
        );
        registry.register(
            "banesAgainst.fromSpells",
            add_int(paths::AGAINST_FROM_SPELLS).negated(),
        );
        registry.register(
            "banesAgainst.fromMagical",
            add_int(paths::AGAINST_FROM_MAGICAL).negated(),
        );

        for key in AgainstKey::ALL {
            let path = paths::auto_success_against(key);
            registry.register(format!("autoSuccessAgainst.{}", key.key()), set_boo(&path));
        }

        // Damage
        registry.register("extraDamage.dice", add_int(paths::EXTRA_DAMAGE_DICE));
        registry.register("extraDamage.mod", add_int(paths::EXTRA_DAMAGE_MOD));
        registry.register("bonusDamage.increase", add_int(paths::BONUS_DAMAGE));
        registry.register("bonusDamage.override", over_int(paths::BONUS_DAMAGE));

        // Defense
        registry.register("defense.bonus", add_int(paths::DEFENSE_BONUS));
        registry.register("defense.reduce", add_int(paths::DEFENSE_BONUS).negated());
        registry.register("defense.natural", up_int(paths::DEFENSE_NATURAL));
        registry.register("defense.armored", up_int(paths::DEFENSE_ARMORED));
        registry.register("defense.override", over_int(paths::DEFENSE_OVERRIDE));

        // Health
        registry.register("health.increase", add_int(paths::HEALTH_NORMAL));
        registry.register("health.reduce", add_int(paths::HEALTH_NORMAL).negated());
        registry.register("health.override", over_int(paths::HEALTH_NORMAL));

        // Speed
        registry.register("speed.increase", add_int(paths::SPEED));
        registry.register("speed.reduce", add_int(paths::SPEED).negated());
        registry.register("speed.override", down_int(paths::SPEED));
        registry.register("speed.halved", set_boo(paths::SPEED_HALVED));

        // Size
        registry.register("size.increase", add_int(paths::SIZE));
        registry.register("size.override", over_int(paths::SIZE));

        // Attribute scores
        for attribute in Attribute::PHYSICAL_MENTAL {
            let key = attribute.key();
            let path = paths::attribute_score(attribute);
            registry.register(format!("upgrade.{}", key), up_int(&path));
            registry.register(format!("downgrade.{}", key), down_int(&path));
            registry.register(format!("override.{}", key), over_int(&path));
            registry.register(format!("increase.{}", key), add_int(&path));
            registry.register(format!("reduce.{}", key), add_int(&path).negated());
        }

        registry
    }

    /// Register (or replace) a key.
    pub fn register(&mut self, key: impl Into<String>, meta: ChangeMeta) {
        let key = key.into();
        if self.entries.insert(key.clone(), meta).is_none() {
            self.order.push(key);
        }
    }

    /// Metadata for `key`, `None` when unregistered.
    pub fn get(&self, key: &str) -> Option<&ChangeMeta> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Keys of one group (the part before the first dot), in registration order.
    pub fn group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keys()
            .filter(move |key| key.split('.').next() == Some(group))
    }

    /// Look up and parse a change.
    pub fn resolve(&self, change: &EffectChange) -> Result<ResolvedChange, DomainError> {
        let meta = self
            .get(&change.key)
            .ok_or_else(|| DomainError::unregistered_change(&change.key))?;
        ResolvedChange::from_meta(change, meta)
    }

    /// Tooltip line for a change.
    ///
    /// Unregistered keys and unparsable values produce [`BROKEN_CHANGE_MARKER`]
    /// so play continues while the content author sees the problem.
    pub fn describe(&self, change: &EffectChange) -> String {
        match self.resolve(change) {
            Ok(resolved) => {
                let value = match resolved.value {
                    // Show what the author entered, not the negated value.
                    ChangeValue::Int(_) => change
                        .value
                        .trim()
                        .parse::<i32>()
                        .map(plus_minus)
                        .unwrap_or_else(|_| change.value.clone()),
                    other => other.to_string(),
                };
                format!("WW.EffectKeys.{} {}", change.key, value)
            }
            Err(_) => BROKEN_CHANGE_MARKER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::change::{ChangeMode, ValueType};

    #[test]
    fn standard_registry_covers_all_groups() {
        let registry = EffectChangeRegistry::standard();
        for group in [
            "boons",
            "banes",
            "autoFail",
            "boonsAgainst",
            "banesAgainst",
            "autoSuccessAgainst",
            "extraDamage",
            "bonusDamage",
            "defense",
            "health",
            "speed",
            "size",
            "upgrade",
            "downgrade",
            "override",
            "increase",
            "reduce",
        ] {
            assert!(registry.group(group).count() > 0, "group {} is empty", group);
        }
        assert_eq!(registry.keys().count(), registry.len());
    }

    #[test]
    fn lookups_are_idempotent() {
        let registry = EffectChangeRegistry::standard();
        for key in registry.keys() {
            assert_eq!(registry.get(key), registry.get(key));
        }
        let first = registry.get("defense.override").cloned();
        let second = registry.get("defense.override").cloned();
        assert_eq!(first, second);
        assert_eq!(first.unwrap().mode, ChangeMode::Override);
    }

    #[test]
    fn unregistered_key_is_none() {
        let registry = EffectChangeRegistry::standard();
        assert!(registry.get("boons.charisma").is_none());
        assert!(matches!(
            registry.resolve(&EffectChange::new("boons.charisma", 1)),
            Err(DomainError::UnregisteredChange(_))
        ));
    }

    #[test]
    fn key_metadata() {
        let registry = EffectChangeRegistry::standard();

        let speed = registry.get("speed.override").unwrap();
        assert_eq!(speed.mode, ChangeMode::Downgrade);
        assert_eq!(speed.value_type, ValueType::Int);

        let auto_fail = registry.get("autoFail.str").unwrap();
        assert_eq!(auto_fail.mode, ChangeMode::Override);
        assert_eq!(auto_fail.value_type, ValueType::Bool);

        let banes = registry.get("banes.str").unwrap();
        assert!(banes.negate);
        assert_eq!(banes.path, registry.get("boons.str").unwrap().path);

        assert_eq!(registry.get("upgrade.agi").unwrap().mode, ChangeMode::Upgrade);
        assert!(registry.get("upgrade.luck").is_none());
    }

    #[test]
    fn describe_marks_broken_changes() {
        let registry = EffectChangeRegistry::standard();
        assert_eq!(
            registry.describe(&EffectChange::new("banes.str", 2)),
            "WW.EffectKeys.banes.str +2"
        );
        assert_eq!(
            registry.describe(&EffectChange::new("autoFail.agi", true)),
            "WW.EffectKeys.autoFail.agi true"
        );
        assert_eq!(
            registry.describe(&EffectChange::new("nonsense", 1)),
            BROKEN_CHANGE_MARKER
        );
        assert_eq!(
            registry.describe(&EffectChange::new("boons.str", "many")),
            BROKEN_CHANGE_MARKER
        );
    }

    #[test]
    fn register_replaces_without_duplicating_order() {
        let mut registry = EffectChangeRegistry::empty();
        registry.register("x.y", add_int("p"));
        registry.register("x.y", over_int("p"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys().count(), 1);
        assert_eq!(registry.get("x.y").unwrap().mode, ChangeMode::Override);
    }
}

//! Attribute rolls: `1d20 + modifier + boon dice`, once per target.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effects::DerivedStats;
use crate::entities::{Actor, Item};
use crate::value_objects::{
    target_boons, AgainstKey, Attribute, BoonSources, BoonsAgainst, DiceGroup, DiceParseError,
    DieRole, EvaluatedFormula, FormulaTerm, Outcome, RollFormula, RollTags, Sign, TermKind,
};
use crate::{ActorId, ItemId};

/// What started the roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum RollOrigin {
    Actor { actor: ActorId },
    Item { actor: ActorId, item: ItemId },
}

impl RollOrigin {
    pub fn actor(&self) -> ActorId {
        match self {
            RollOrigin::Actor { actor } | RollOrigin::Item { actor, .. } => *actor,
        }
    }

    pub fn item(&self) -> Option<ItemId> {
        match self {
            RollOrigin::Actor { .. } => None,
            RollOrigin::Item { item, .. } => Some(*item),
        }
    }
}

/// A target as it was when the roll was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSnapshot {
    pub id: ActorId,
    pub name: String,
    pub attributes: BTreeMap<Attribute, i32>,
    pub defense: i32,
    pub boons_against: BoonsAgainst,
}

impl TargetSnapshot {
    pub fn capture(actor: &Actor, stats: &DerivedStats) -> Self {
        let attributes = Attribute::PHYSICAL_MENTAL
            .into_iter()
            .map(|attribute| (attribute, stats.attribute_score(attribute)))
            .collect();
        Self {
            id: actor.id,
            name: actor.name.clone(),
            attributes,
            defense: stats.defense(),
            boons_against: stats.boons_against(),
        }
    }

    /// Target number for a roll opposed by `against`.
    pub fn target_number(&self, against: AgainstKey) -> i32 {
        match against.attribute() {
            Some(attribute) => self.attributes.get(&attribute).copied().unwrap_or(10),
            None => self.defense,
        }
    }
}

/// Inputs of one attribute roll. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRollContext {
    pub origin: RollOrigin,
    pub attribute: Option<Attribute>,
    /// Attribute modifier.
    pub modifier: i32,
    /// Additional flat modifier entered for this roll.
    #[serde(default)]
    pub extra_modifier: i32,
    pub boons: BoonSources,
    pub against: Option<AgainstKey>,
    pub tags: RollTags,
    /// Difficulty of an untargeted roll.
    #[serde(default)]
    pub target_number: Option<i32>,
    #[serde(default)]
    pub targets: Vec<TargetSnapshot>,
}

impl AttributeRollContext {
    /// Plain attribute or luck roll made from the sheet.
    pub fn for_actor(actor: &Actor, stats: &DerivedStats, attribute: Attribute) -> Self {
        Self {
            origin: RollOrigin::Actor { actor: actor.id },
            attribute: Some(attribute),
            modifier: stats.attribute_modifier(attribute),
            extra_modifier: 0,
            boons: BoonSources::new().with_effect(stats.self_boons(attribute)),
            against: None,
            tags: RollTags::default(),
            target_number: None,
            targets: Vec::new(),
        }
    }

    /// Roll made by using an item. Attack and spell boons default to applied
    /// for weapons and spells respectively.
    pub fn for_item(actor: &Actor, stats: &DerivedStats, item: &Item) -> Self {
        let modifier = item
            .attribute
            .map(|attribute| stats.attribute_modifier(attribute))
            .unwrap_or(0);
        let effect = item
            .attribute
            .map(|attribute| stats.self_boons(attribute))
            .unwrap_or(0);
        Self {
            origin: RollOrigin::Item {
                actor: actor.id,
                item: item.id,
            },
            attribute: item.attribute,
            modifier,
            extra_modifier: 0,
            boons: BoonSources::new()
                .with_effect(effect)
                .with_fixed(item.fixed_boons)
                .with_attack(stats.attack_boons(), item.is_attack())
                .with_spell(stats.spell_boons(), item.is_spell()),
            against: item.against,
            tags: item.roll_tags(),
            target_number: None,
            targets: Vec::new(),
        }
    }

    pub fn with_situational(mut self, boons: i32) -> Self {
        self.boons.situational = boons;
        self
    }

    pub fn with_extra_modifier(mut self, modifier: i32) -> Self {
        self.extra_modifier = modifier;
        self
    }

    pub fn with_target_number(mut self, target_number: i32) -> Self {
        self.target_number = Some(target_number);
        self
    }

    pub fn with_targets(mut self, targets: Vec<TargetSnapshot>) -> Self {
        self.targets = targets;
        self
    }

    /// The roller's boons before any per-target contribution.
    pub fn final_boons(&self) -> i32 {
        self.boons.final_boons()
    }

    /// Whether the roll is resolved per target.
    pub fn is_targeted(&self) -> bool {
        self.against.is_some() && !self.targets.is_empty()
    }

    /// `1d20`, the modifiers when nonzero, then `+Nd6kh` for boons or
    /// `-Nd6kh` for banes.
    pub fn formula(&self, boons: i32) -> Result<RollFormula, DiceParseError> {
        let mut formula = RollFormula::compact();
        formula.push(FormulaTerm::dice(TermKind::Base, Sign::Plus, DiceGroup::d20()));
        if self.modifier != 0 {
            formula.push(FormulaTerm::flat(TermKind::Modifier, self.modifier));
        }
        if self.extra_modifier != 0 {
            formula.push(FormulaTerm::flat(TermKind::Modifier, self.extra_modifier));
        }
        if boons != 0 {
            let kind = if boons > 0 { TermKind::Boons } else { TermKind::Banes };
            let pool = DiceGroup::boon_pool(boons.unsigned_abs())?;
            formula.push(FormulaTerm::dice(kind, Sign::of(boons), pool));
        }
        Ok(formula)
    }

    /// Evaluate the roll: once per target in target order when targeted,
    /// otherwise once against the optional target number.
    pub fn roll(&self, mut rng: impl FnMut(i32, i32) -> i32) -> Result<Vec<RollResult>, DiceParseError> {
        let base = self.final_boons();

        let Some(against) = self.against.filter(|_| !self.targets.is_empty()) else {
            let evaluated = self.formula(base)?.evaluate(&mut rng);
            let outcome = Outcome::classify(evaluated.total, self.target_number);
            return Ok(vec![RollResult {
                evaluated,
                boons: base,
                target_number: self.target_number,
                outcome,
                roll_order: 0,
                target: None,
            }]);
        };

        let mut results = Vec::with_capacity(self.targets.len());
        for (roll_order, target) in self.targets.iter().enumerate() {
            let boons = base + target_boons(Some(against), self.tags, &target.boons_against);
            let evaluated = self.formula(boons)?.evaluate(&mut rng);
            let target_number = target.target_number(against);
            let mut outcome = Outcome::classify(evaluated.total, Some(target_number));
            if outcome == Outcome::Failure && target.boons_against.auto_succeeds(Some(against)) {
                outcome = Outcome::Success;
            }
            results.push(RollResult {
                evaluated,
                boons,
                target_number: Some(target_number),
                outcome,
                roll_order,
                target: Some(TargetRef {
                    id: target.id,
                    name: target.name.clone(),
                }),
            });
        }
        Ok(results)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub id: ActorId,
    pub name: String,
}

/// An evaluated attribute roll. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    #[serde(flatten)]
    pub evaluated: EvaluatedFormula,
    /// Final boons used for this evaluation, target contribution included.
    pub boons: i32,
    pub target_number: Option<i32>,
    pub outcome: Outcome,
    /// Position of the target in the request, for grouping in the chat card.
    pub roll_order: usize,
    pub target: Option<TargetRef>,
}

impl RollResult {
    pub fn formula(&self) -> &str {
        &self.evaluated.formula
    }

    pub fn total(&self) -> i32 {
        self.evaluated.total
    }

    /// Every die with its presentation role, in formula order.
    pub fn die_roles(&self) -> Vec<(DieRole, i32, bool)> {
        self.evaluated
            .terms
            .iter()
            .filter_map(|term| term.role.map(|role| (role, &term.dice)))
            .flat_map(|(role, dice)| dice.iter().map(move |d| (role, d.result, d.active)))
            .collect()
    }
}

//! Attribute roll use case.
//!
//! Rolls an attribute or uses an item: checks the auto-fail gate, builds the
//! roll context, evaluates it once per target and posts the roll card with
//! the buttons the outcomes unlock.

use std::sync::Arc;

use serde_json::json;
use weirdwizard_domain::{
    fired_by, Actor, ActorId, Attribute, AttributeRollContext, DerivedStats,
    EffectChangeRegistry, Item, ItemId, MessageId, Outcome, RollResult, TargetSnapshot,
};

use crate::infrastructure::ports::{ActorRepo, NotificationPort, RandomPort, Speaker};
use crate::use_cases::afflictions::{AfflictionOps, BlockedAction};
use crate::use_cases::chat_actions::ChatAction;

use super::card::{Card, CardPoster};
use super::RollError;

/// What is being rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollSource {
    Attribute(Attribute),
    Item(ItemId),
}

/// Input of the roll dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRollRequest {
    pub actor: ActorId,
    pub source: RollSource,
    pub situational_boons: i32,
    pub extra_modifier: i32,
    /// Difficulty of an untargeted roll.
    pub target_number: Option<i32>,
    /// Targeted actors, in targeting order.
    pub targets: Vec<ActorId>,
    /// Carried onto the damage buttons of a hit.
    pub apply_bonus_damage: bool,
}

impl AttributeRollRequest {
    pub fn attribute(actor: ActorId, attribute: Attribute) -> Self {
        Self::new(actor, RollSource::Attribute(attribute))
    }

    pub fn item(actor: ActorId, item: ItemId) -> Self {
        Self::new(actor, RollSource::Item(item))
    }

    fn new(actor: ActorId, source: RollSource) -> Self {
        Self {
            actor,
            source,
            situational_boons: 0,
            extra_modifier: 0,
            target_number: None,
            targets: Vec::new(),
            apply_bonus_damage: false,
        }
    }

    pub fn with_boons(mut self, boons: i32) -> Self {
        self.situational_boons = boons;
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

    pub fn with_targets(mut self, targets: Vec<ActorId>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_bonus_damage(mut self) -> Self {
        self.apply_bonus_damage = true;
        self
    }
}

/// A posted attribute roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRollOutcome {
    pub message: MessageId,
    /// One per target in targeting order; empty for items used without a roll.
    pub results: Vec<RollResult>,
    pub actions: Vec<ChatAction>,
}

/// Attribute roll use case.
///
/// Orchestrates: auto-fail gate, target lookup, per-target evaluation,
/// effect selection by outcome, card posting.
pub struct RollAttribute {
    actors: Arc<dyn ActorRepo>,
    random: Arc<dyn RandomPort>,
    notifier: Arc<dyn NotificationPort>,
    afflictions: Arc<AfflictionOps>,
    registry: Arc<EffectChangeRegistry>,
    cards: Arc<CardPoster>,
}

impl RollAttribute {
    pub(super) fn new(
        actors: Arc<dyn ActorRepo>,
        random: Arc<dyn RandomPort>,
        notifier: Arc<dyn NotificationPort>,
        afflictions: Arc<AfflictionOps>,
        registry: Arc<EffectChangeRegistry>,
        cards: Arc<CardPoster>,
    ) -> Self {
        Self {
            actors,
            random,
            notifier,
            afflictions,
            registry,
            cards,
        }
    }

    /// Execute the roll.
    ///
    /// # Returns
    /// * `Ok(Some(_))` - Roll evaluated and posted
    /// * `Ok(None)` - Roll refused (auto-fail, weapon without a defense to
    ///   roll against); the user has been warned
    /// * `Err(RollError)` - Missing actor or item, or a host failure
    pub async fn execute(
        &self,
        request: AttributeRollRequest,
    ) -> Result<Option<AttributeRollOutcome>, RollError> {
        tracing::debug!(
            actor_id = %request.actor,
            source = ?request.source,
            boons = request.situational_boons,
            targets = request.targets.len(),
            "Attribute roll requested"
        );

        let actor = self
            .actors
            .get(request.actor)
            .await?
            .ok_or(RollError::ActorNotFound(request.actor))?;
        let stats = DerivedStats::prepare(&actor, &self.registry);

        let (item, context, action) = match request.source {
            RollSource::Attribute(attribute) => (
                None,
                AttributeRollContext::for_actor(&actor, &stats, attribute),
                BlockedAction::Attribute,
            ),
            RollSource::Item(item_id) => {
                let item = actor
                    .item(item_id)
                    .cloned()
                    .ok_or(RollError::ItemNotFound {
                        actor: actor.id,
                        item: item_id,
                    })?;
                let action = if item.is_attack() {
                    BlockedAction::Attack
                } else if item.is_spell() {
                    BlockedAction::Spell
                } else {
                    BlockedAction::Attribute
                };
                let context = AttributeRollContext::for_item(&actor, &stats, &item);
                (Some(item), context, action)
            }
        };

        if self
            .afflictions
            .is_actor_blocked(&actor, action, context.attribute)
        {
            return Ok(None);
        }

        if let Some(item) = item.as_ref().filter(|item| item.is_attack()) {
            if item.against.is_none() {
                tracing::warn!(item_id = %item.id, "Weapon has no defense to roll against");
                self.notifier.warn(&format!(
                    "{} has nothing to roll against. Set the weapon's target defense.",
                    item.name
                ));
                return Ok(None);
            }
        }

        let targets = self.target_snapshots(&request.targets).await?;
        let context = context
            .with_situational(request.situational_boons)
            .with_extra_modifier(request.extra_modifier)
            .with_targets(targets.clone());
        let context = match request.target_number {
            Some(tn) => context.with_target_number(tn),
            None => context,
        };

        let results = match (&item, context.attribute) {
            (Some(_), None) => Vec::new(),
            _ => context.roll(|min, max| self.random.gen_range(min, max))?,
        };

        let actions = match &item {
            Some(item) => item_actions(
                &actor,
                item,
                &results,
                &targets,
                request.apply_bonus_damage,
            ),
            None => Vec::new(),
        };

        let flavor = match &item {
            Some(item) => item.name.clone(),
            None => context
                .attribute
                .map(|attribute| attribute.label_key().to_string())
                .unwrap_or_default(),
        };

        let card = Card {
            speaker: Speaker::actor(actor.id, actor.name.clone()),
            flavor: flavor.clone(),
            template: None,
            context: json!({
                "actor": actor.name,
                "label": flavor,
                "item": item.as_ref().map(|item| &item.name),
                "boons": context.boons.display(),
                "results": results.iter().map(result_view).collect::<Vec<_>>(),
                "actions": actions,
            }),
            rolls: results
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
            outcomes: json!(results
                .iter()
                .map(|r| json!({
                    "target": r.target.as_ref().map(|t| t.id),
                    "outcome": r.outcome,
                    "rollOrder": r.roll_order,
                }))
                .collect::<Vec<_>>()),
            actions: actions.clone(),
        };
        let message = self.cards.post(card).await?;

        tracing::info!(
            actor_id = %actor.id,
            message_id = %message,
            outcomes = ?results.iter().map(|r| r.outcome).collect::<Vec<_>>(),
            "Attribute roll posted"
        );
        Ok(Some(AttributeRollOutcome {
            message,
            results,
            actions,
        }))
    }

    /// Snapshot each targeted actor. Targets that no longer exist are skipped.
    async fn target_snapshots(&self, ids: &[ActorId]) -> Result<Vec<TargetSnapshot>, RollError> {
        let mut targets = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.actors.get(id).await? {
                Some(target) => {
                    let stats = DerivedStats::prepare(&target, &self.registry);
                    targets.push(TargetSnapshot::capture(&target, &stats));
                }
                None => tracing::warn!(actor_id = %id, "Roll target not found, skipping"),
            }
        }
        Ok(targets)
    }
}

/// Buttons unlocked by an item roll, per target in targeting order.
///
/// Items used without a roll fire their `OnUse` effects on every target.
fn item_actions(
    actor: &Actor,
    item: &Item,
    results: &[RollResult],
    targets: &[TargetSnapshot],
    apply_bonus_damage: bool,
) -> Vec<ChatAction> {
    let per_target: Vec<(Option<ActorId>, Outcome)> = if results.is_empty() {
        targets.iter().map(|t| (Some(t.id), Outcome::None)).collect()
    } else {
        results
            .iter()
            .map(|r| (r.target.as_ref().map(|t| t.id), r.outcome))
            .collect()
    };

    let mut actions = Vec::new();
    for (target, outcome) in per_target {
        if item.damage.is_some() && outcome != Outcome::Failure && !results.is_empty() {
            actions.push(ChatAction::RollDamage {
                actor: actor.id,
                item: item.id,
                targets: target.into_iter().collect(),
                apply_bonus_damage,
            });
        }

        // Untargeted rolls leave instant effects to the host's selection.
        let Some(target) = target else {
            continue;
        };
        for instant in fired_by(&item.instant, outcome) {
            actions.push(ChatAction::FireInstant {
                target,
                instant: instant.kind.clone(),
            });
        }
        let effects: Vec<_> = item
            .effects
            .iter()
            .filter(|effect| !effect.disabled && effect.trigger.fires_on(outcome))
            .cloned()
            .collect();
        if !effects.is_empty() {
            actions.push(ChatAction::ApplyEffects { target, effects });
        }
    }
    actions
}

fn result_view(result: &RollResult) -> serde_json::Value {
    json!({
        "formula": result.formula(),
        "total": result.total(),
        "boons": result.boons,
        "targetNumber": result.target_number,
        "target": result.target.as_ref().map(|t| &t.name),
        "outcome": result.outcome,
        "outcomeLabel": result.outcome.label_key(),
        "cssClass": result.outcome.css_class(),
        "dice": result
            .die_roles()
            .into_iter()
            .map(|(role, value, active)| json!({ "role": role, "result": value, "active": active }))
            .collect::<Vec<_>>(),
    })
}

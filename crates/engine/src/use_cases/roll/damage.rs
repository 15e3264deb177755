//! Damage and healing roll use cases.

use std::sync::Arc;

use serde_json::json;
use weirdwizard_domain::rolls::{healing_formula, healing_from_expression};
use weirdwizard_domain::value_objects::EvaluatedFormula;
use weirdwizard_domain::{
    Actor, ActorId, DamageRollContext, DerivedStats, EffectChangeRegistry, ItemId, MessageId,
};

use crate::infrastructure::ports::{ActorRepo, NotificationPort, RandomPort, Speaker};
use crate::use_cases::chat_actions::ChatAction;

use super::card::{Card, CardPoster, DAMAGE_TEMPLATE, HEALING_TEMPLATE};
use super::RollError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageRollRequest {
    pub actor: ActorId,
    pub item: ItemId,
    pub targets: Vec<ActorId>,
    /// Add the actor's bonus damage dice (attacks that met the bonus condition).
    pub apply_bonus_damage: bool,
    pub extra_dice: i32,
    pub modifier: i32,
}

impl DamageRollRequest {
    pub fn new(actor: ActorId, item: ItemId) -> Self {
        Self {
            actor,
            item,
            targets: Vec::new(),
            apply_bonus_damage: false,
            extra_dice: 0,
            modifier: 0,
        }
    }

    pub fn with_targets(mut self, targets: Vec<ActorId>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_bonus_damage(mut self) -> Self {
        self.apply_bonus_damage = true;
        self
    }

    pub fn with_extra_dice(mut self, dice: i32) -> Self {
        self.extra_dice = dice;
        self
    }

    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }
}

/// Where a healing roll comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealingSource {
    Item(ItemId),
    /// A stored expression such as `1d6+2`.
    Formula(String),
    Dice { dice: u32, modifier: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealingRollRequest {
    pub actor: ActorId,
    pub source: HealingSource,
    pub targets: Vec<ActorId>,
}

/// A posted damage or healing roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRollOutcome {
    pub message: MessageId,
    pub rolled: EvaluatedFormula,
    /// One apply button per target.
    pub actions: Vec<ChatAction>,
}

async fn roller(actors: &dyn ActorRepo, id: ActorId) -> Result<Actor, RollError> {
    actors.get(id).await?.ok_or(RollError::ActorNotFound(id))
}

fn card(
    actor: &Actor,
    flavor: String,
    template: &'static str,
    rolled: &EvaluatedFormula,
    actions: &[ChatAction],
) -> Result<Card, RollError> {
    Ok(Card {
        speaker: Speaker::actor(actor.id, actor.name.clone()),
        flavor: flavor.clone(),
        template: Some(template),
        context: json!({
            "actor": actor.name,
            "label": flavor,
            "formula": rolled.formula,
            "total": rolled.total,
            "terms": rolled.terms,
            "actions": actions,
        }),
        rolls: vec![serde_json::to_value(rolled)?],
        outcomes: serde_json::Value::Null,
        actions: actions.to_vec(),
    })
}

/// Damage roll use case.
pub struct RollDamage {
    actors: Arc<dyn ActorRepo>,
    random: Arc<dyn RandomPort>,
    notifier: Arc<dyn NotificationPort>,
    registry: Arc<EffectChangeRegistry>,
    cards: Arc<CardPoster>,
}

impl RollDamage {
    pub(super) fn new(
        actors: Arc<dyn ActorRepo>,
        random: Arc<dyn RandomPort>,
        notifier: Arc<dyn NotificationPort>,
        registry: Arc<EffectChangeRegistry>,
        cards: Arc<CardPoster>,
    ) -> Self {
        Self {
            actors,
            random,
            notifier,
            registry,
            cards,
        }
    }

    /// Roll an item's damage and post it with an apply button per target.
    ///
    /// `Ok(None)` when the item deals no damage.
    pub async fn execute(
        &self,
        request: DamageRollRequest,
    ) -> Result<Option<HealthRollOutcome>, RollError> {
        tracing::debug!(actor_id = %request.actor, item_id = %request.item, "Damage roll requested");

        let actor = roller(self.actors.as_ref(), request.actor).await?;
        let item = actor.item(request.item).ok_or(RollError::ItemNotFound {
            actor: actor.id,
            item: request.item,
        })?;
        let stats = DerivedStats::prepare(&actor, &self.registry);

        let Some(context) = DamageRollContext::for_item(item, &stats, request.apply_bonus_damage)
        else {
            self.notifier
                .warn(&format!("{} does not deal damage.", item.name));
            return Ok(None);
        };
        let context = DamageRollContext {
            extra_dice: context.extra_dice + request.extra_dice,
            modifier: context.modifier + request.modifier,
            ..context
        };

        let rolled = context.roll(|min, max| self.random.gen_range(min, max))?;
        let actions: Vec<ChatAction> = request
            .targets
            .iter()
            .map(|&target| ChatAction::ApplyDamage {
                target,
                amount: rolled.total,
            })
            .collect();

        let card = card(&actor, item.name.clone(), DAMAGE_TEMPLATE, &rolled, &actions)?;
        let message = self.cards.post(card).await?;

        tracing::info!(
            actor_id = %actor.id,
            message_id = %message,
            formula = %rolled.formula,
            total = rolled.total,
            "Damage roll posted"
        );
        Ok(Some(HealthRollOutcome {
            message,
            rolled,
            actions,
        }))
    }
}

/// Healing roll use case.
pub struct RollHealing {
    actors: Arc<dyn ActorRepo>,
    random: Arc<dyn RandomPort>,
    notifier: Arc<dyn NotificationPort>,
    cards: Arc<CardPoster>,
}

impl RollHealing {
    pub(super) fn new(
        actors: Arc<dyn ActorRepo>,
        random: Arc<dyn RandomPort>,
        notifier: Arc<dyn NotificationPort>,
        cards: Arc<CardPoster>,
    ) -> Self {
        Self {
            actors,
            random,
            notifier,
            cards,
        }
    }

    /// Roll healing and post it with an apply button per target.
    ///
    /// `Ok(None)` when the item heals nothing.
    pub async fn execute(
        &self,
        request: HealingRollRequest,
    ) -> Result<Option<HealthRollOutcome>, RollError> {
        tracing::debug!(actor_id = %request.actor, source = ?request.source, "Healing roll requested");

        let actor = roller(self.actors.as_ref(), request.actor).await?;
        let (flavor, formula) = match &request.source {
            HealingSource::Item(item_id) => {
                let item = actor.item(*item_id).ok_or(RollError::ItemNotFound {
                    actor: actor.id,
                    item: *item_id,
                })?;
                let Some(expression) = item.healing.as_deref() else {
                    self.notifier.warn(&format!("{} does not heal.", item.name));
                    return Ok(None);
                };
                (item.name.clone(), healing_from_expression(expression)?)
            }
            HealingSource::Formula(expression) => (
                "Healing".to_string(),
                healing_from_expression(expression)?,
            ),
            HealingSource::Dice { dice, modifier } => (
                "Healing".to_string(),
                healing_formula(*dice, *modifier)?,
            ),
        };

        let mut rolled = formula.evaluate(|min, max| self.random.gen_range(min, max));
        rolled.total = rolled.total.max(0);
        let actions: Vec<ChatAction> = request
            .targets
            .iter()
            .map(|&target| ChatAction::ApplyHealing {
                target,
                amount: rolled.total,
            })
            .collect();

        let card = card(&actor, flavor, HEALING_TEMPLATE, &rolled, &actions)?;
        let message = self.cards.post(card).await?;

        tracing::info!(
            actor_id = %actor.id,
            message_id = %message,
            formula = %rolled.formula,
            total = rolled.total,
            "Healing roll posted"
        );
        Ok(Some(HealthRollOutcome {
            message,
            rolled,
            actions,
        }))
    }
}

//! Chat card buttons.
//!
//! Roll cards store their follow-up actions in the message flags. Clicking a
//! button hands the stored [`ChatAction`] back to [`ChatActions::execute`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use weirdwizard_domain::{ActiveEffect, ActorId, AfflictionId, InstantKind, ItemId};

use crate::infrastructure::formula_scan::{tag_stored_dice, TaggedDie};
use crate::use_cases::afflictions::{AfflictionError, AfflictionOps};
use crate::use_cases::effects::{EffectError, EffectOps, HealthChange, InstantOutcome};
use crate::use_cases::roll::{
    DamageRollRequest, HealingRollRequest, HealingSource, HealthRollOutcome, RollDamage,
    RollError, RollHealing, FLAGS_SCOPE,
};

/// A button on a chat card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action")]
pub enum ChatAction {
    ApplyDamage {
        target: ActorId,
        amount: i32,
    },
    ApplyHealing {
        target: ActorId,
        amount: i32,
    },
    FireInstant {
        target: ActorId,
        instant: InstantKind,
    },
    ApplyEffects {
        target: ActorId,
        effects: Vec<ActiveEffect>,
    },
    ApplyAffliction {
        target: ActorId,
        affliction: AfflictionId,
    },
    ClearAfflictions {
        target: ActorId,
    },
    RollDamage {
        actor: ActorId,
        item: ItemId,
        targets: Vec<ActorId>,
        #[serde(default, rename = "applyBonusDamage")]
        apply_bonus_damage: bool,
    },
    RollHealing {
        actor: ActorId,
        formula: String,
        targets: Vec<ActorId>,
    },
}

/// What a button did. `None` payloads mean the target was gone or the user
/// declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatActionResult {
    Health(Option<HealthChange>),
    Instant(Option<InstantOutcome>),
    EffectsApplied(Option<usize>),
    AfflictionApplied(bool),
    AfflictionsCleared(Option<usize>),
    Rolled(Option<HealthRollOutcome>),
}

#[derive(Debug, thiserror::Error)]
pub enum ChatActionError {
    #[error("Message has no action at index {0}")]
    MissingAction(usize),
    #[error("Malformed action: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),
    #[error("Affliction error: {0}")]
    Affliction(#[from] AfflictionError),
    #[error("Roll error: {0}")]
    Roll(#[from] RollError),
}

/// Chat button dispatcher.
pub struct ChatActions {
    effects: Arc<EffectOps>,
    afflictions: Arc<AfflictionOps>,
    damage: Arc<RollDamage>,
    healing: Arc<RollHealing>,
}

impl ChatActions {
    pub fn new(
        effects: Arc<EffectOps>,
        afflictions: Arc<AfflictionOps>,
        damage: Arc<RollDamage>,
        healing: Arc<RollHealing>,
    ) -> Self {
        Self {
            effects,
            afflictions,
            damage,
            healing,
        }
    }

    pub async fn execute(&self, action: ChatAction) -> Result<ChatActionResult, ChatActionError> {
        tracing::debug!(?action, "Chat action");

        let result = match action {
            ChatAction::ApplyDamage { target, amount } => {
                ChatActionResult::Health(self.effects.apply_damage(target, amount).await?)
            }
            ChatAction::ApplyHealing { target, amount } => {
                ChatActionResult::Health(self.effects.apply_healing(target, amount).await?)
            }
            ChatAction::FireInstant { target, instant } => {
                ChatActionResult::Instant(self.effects.fire_instant(target, &instant).await?)
            }
            ChatAction::ApplyEffects { target, effects } => {
                ChatActionResult::EffectsApplied(self.effects.apply_effects(target, &effects).await?)
            }
            ChatAction::ApplyAffliction { target, affliction } => ChatActionResult::AfflictionApplied(
                self.afflictions.apply_affliction(target, affliction).await?,
            ),
            ChatAction::ClearAfflictions { target } => ChatActionResult::AfflictionsCleared(
                self.afflictions.clear_afflictions(target, true).await?,
            ),
            ChatAction::RollDamage {
                actor,
                item,
                targets,
                apply_bonus_damage,
            } => {
                let request = DamageRollRequest::new(actor, item).with_targets(targets);
                let request = if apply_bonus_damage {
                    request.with_bonus_damage()
                } else {
                    request
                };
                ChatActionResult::Rolled(self.damage.execute(request).await?)
            }
            ChatAction::RollHealing {
                actor,
                formula,
                targets,
            } => {
                let request = HealingRollRequest {
                    actor,
                    source: HealingSource::Formula(formula),
                    targets,
                };
                ChatActionResult::Rolled(self.healing.execute(request).await?)
            }
        };
        Ok(result)
    }

    /// Run the button at `index` of a stored message's flags.
    pub async fn execute_from_flags(
        &self,
        flags: &serde_json::Value,
        index: usize,
    ) -> Result<ChatActionResult, ChatActionError> {
        let action = action_at(flags, index)?;
        self.execute(action).await
    }
}

/// The stored button at `index`.
pub fn action_at(flags: &serde_json::Value, index: usize) -> Result<ChatAction, ChatActionError> {
    let raw = flags
        .get(FLAGS_SCOPE)
        .and_then(|scope| scope.get("actions"))
        .and_then(|actions| actions.get(index))
        .ok_or(ChatActionError::MissingAction(index))?;
    Ok(serde_json::from_value(raw.clone())?)
}

/// Die roles of a stored roll (`{ formula, terms: [{ dice | results }] }`).
///
/// Only active dice are kept. `None` when the roll has no formula.
pub fn annotate_stored_roll(roll: &serde_json::Value) -> Option<Vec<TaggedDie>> {
    let formula = roll.get("formula")?.as_str()?;
    let groups: Vec<Vec<i32>> = roll
        .get("terms")
        .and_then(|terms| terms.as_array())
        .map(|terms| {
            terms
                .iter()
                .filter_map(|term| term.get("dice").or_else(|| term.get("results")))
                .filter_map(|dice| dice.as_array())
                .filter(|dice| !dice.is_empty())
                .map(|dice| {
                    dice.iter()
                        .filter(|die| die.get("active").and_then(|a| a.as_bool()) != Some(false))
                        .filter_map(|die| die.get("result").and_then(|r| r.as_i64()))
                        .filter_map(|result| i32::try_from(result).ok())
                        .collect()
                })
                .collect()
        })
        .unwrap_or_default();
    Some(tag_stored_dice(formula, &groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, ScriptedRandom};
    use crate::infrastructure::memory::InMemoryActorRepo;
    use crate::infrastructure::ports::{
        ActorRepo, MockChatLogPort, MockDialogPort, MockNotificationPort, MockSettingsRepo,
        MockTemplatePort, RandomPort,
    };
    use crate::infrastructure::settings::SystemSettings;
    use crate::use_cases::roll::RollUseCases;
    use chrono::Utc;
    use serde_json::json;
    use weirdwizard_domain::effects::paths;
    use weirdwizard_domain::{
        Actor, ActorKind, AfflictionCatalog, Attribute, DieRole, EffectChangeRegistry, Item,
        MessageId,
    };

    struct Fixture {
        actors: Arc<InMemoryActorRepo>,
        actions: ChatActions,
    }

    fn fixture(dice: Vec<i32>, dialog: MockDialogPort) -> Fixture {
        fixture_with_chat(dice, dialog, MockChatLogPort::new())
    }

    fn fixture_with_chat(
        dice: Vec<i32>,
        dialog: MockDialogPort,
        chat: MockChatLogPort,
    ) -> Fixture {
        let actors = Arc::new(InMemoryActorRepo::new());
        let repo: Arc<dyn ActorRepo> = actors.clone();
        let random: Arc<dyn RandomPort> = Arc::new(ScriptedRandom::new(dice));
        let registry = Arc::new(EffectChangeRegistry::standard());
        let afflictions = Arc::new(AfflictionOps::new(
            repo.clone(),
            Arc::new(dialog),
            Arc::new(MockNotificationPort::new()),
            Arc::new(AfflictionCatalog::build_all()),
            registry.clone(),
        ));
        let effects = Arc::new(EffectOps::new(
            repo.clone(),
            random.clone(),
            afflictions.clone(),
            registry.clone(),
        ));
        let mut templates = MockTemplatePort::new();
        templates
            .expect_render()
            .returning(|path, _| Ok(path.to_string()));
        let mut settings = MockSettingsRepo::new();
        settings
            .expect_get()
            .returning(|| Ok(SystemSettings::default()));
        let rolls = RollUseCases::new(
            repo,
            Arc::new(templates),
            Arc::new(chat),
            Arc::new(MockNotificationPort::new()),
            Arc::new(settings),
            Arc::new(FixedClock(Utc::now())),
            random,
            afflictions.clone(),
            registry,
        );

        Fixture {
            actors,
            actions: ChatActions::new(effects, afflictions, rolls.damage, rolls.healing),
        }
    }

    fn fighter() -> Actor {
        Actor::new("Ada", ActorKind::Character)
            .with_stat(paths::HEALTH_NORMAL, 20)
            .with_stat(paths::HEALTH_CURRENT, 20)
    }

    #[tokio::test]
    async fn apply_damage_button_adds_damage() {
        let fixture = fixture(Vec::new(), MockDialogPort::new());
        let actor = fighter();
        let id = actor.id;
        fixture.actors.insert(actor).await;

        let result = fixture
            .actions
            .execute(ChatAction::ApplyDamage {
                target: id,
                amount: 7,
            })
            .await
            .unwrap();

        assert!(matches!(
            result,
            ChatActionResult::Health(Some(HealthChange { after: 7, .. }))
        ));
        assert_eq!(fixture.actors.get(id).await.unwrap().unwrap().damage, 7);
    }

    #[tokio::test]
    async fn damage_button_on_a_deleted_actor_does_nothing() {
        let fixture = fixture(Vec::new(), MockDialogPort::new());

        let result = fixture
            .actions
            .execute(ChatAction::ApplyDamage {
                target: ActorId::new(),
                amount: 3,
            })
            .await
            .unwrap();
        assert_eq!(result, ChatActionResult::Health(None));
    }

    #[tokio::test]
    async fn instant_damage_rolls_the_formula() {
        let fixture = fixture(vec![4, 5], MockDialogPort::new());
        let actor = fighter();
        let id = actor.id;
        fixture.actors.insert(actor).await;

        let result = fixture
            .actions
            .execute(ChatAction::FireInstant {
                target: id,
                instant: InstantKind::Damage {
                    formula: "2d6".into(),
                },
            })
            .await
            .unwrap();

        let ChatActionResult::Instant(Some(InstantOutcome::Health { rolled, change })) = result
        else {
            panic!("expected a health change, got {:?}", result);
        };
        assert_eq!(rolled.map(|r| r.total), Some(9));
        assert_eq!(change.after, 9);
    }

    #[tokio::test]
    async fn clear_afflictions_button_asks_first() {
        let mut dialog = MockDialogPort::new();
        dialog.expect_confirm().times(1).returning(|_, _| Ok(false));
        let fixture = fixture(Vec::new(), dialog);
        let actor = fighter().with_effect(
            AfflictionCatalog::build_all()
                .get(AfflictionId::Prone)
                .unwrap()
                .to_effect(),
        );
        let id = actor.id;
        fixture.actors.insert(actor).await;

        let result = fixture
            .actions
            .execute(ChatAction::ClearAfflictions { target: id })
            .await
            .unwrap();
        assert_eq!(result, ChatActionResult::AfflictionsCleared(None));
        assert!(fixture
            .actors
            .get(id)
            .await
            .unwrap()
            .unwrap()
            .has_affliction(AfflictionId::Prone));
    }

    #[tokio::test]
    async fn stored_flags_dispatch_by_index() {
        let fixture = fixture(Vec::new(), MockDialogPort::new());
        let actor = fighter();
        let id = actor.id;
        fixture.actors.insert(actor).await;

        let flags = json!({
            FLAGS_SCOPE: {
                "outcomes": null,
                "actions": [
                    ChatAction::ApplyDamage { target: id, amount: 2 },
                    ChatAction::ApplyAffliction { target: id, affliction: AfflictionId::Dazed },
                ],
            }
        });

        let result = fixture.actions.execute_from_flags(&flags, 1).await.unwrap();
        assert_eq!(result, ChatActionResult::AfflictionApplied(true));

        let err = fixture.actions.execute_from_flags(&flags, 5).await.unwrap_err();
        assert!(matches!(err, ChatActionError::MissingAction(5)));
    }

    #[tokio::test]
    async fn damage_button_carries_bonus_damage() {
        let mut chat = MockChatLogPort::new();
        chat.expect_post()
            .times(1)
            .returning(|_| Ok(MessageId::new()));
        // First die shows a 1 and is rerolled.
        let fixture = fixture_with_chat(vec![1, 4, 6, 3], MockDialogPort::new(), chat);
        let axe = Item::weapon("Axe", Attribute::Str, "2d6").brutal();
        let axe_id = axe.id;
        let actor = fighter()
            .with_stat(paths::BONUS_DAMAGE, 1)
            .with_item(axe);
        let actor_id = actor.id;
        fixture.actors.insert(actor).await;

        let result = fixture
            .actions
            .execute(ChatAction::RollDamage {
                actor: actor_id,
                item: axe_id,
                targets: Vec::new(),
                apply_bonus_damage: true,
            })
            .await
            .unwrap();

        let ChatActionResult::Rolled(Some(outcome)) = result else {
            panic!("expected a damage roll, got {:?}", result);
        };
        assert_eq!(outcome.rolled.formula, "2d6r1 + 1d6r1");
        assert_eq!(outcome.rolled.total, 13);
    }

    #[test]
    fn stored_damage_buttons_default_to_no_bonus() {
        let actor = ActorId::new();
        let item = ItemId::new();
        let stored = json!({
            "action": "rollDamage",
            "actor": actor,
            "item": item,
            "targets": [],
        });

        let action: ChatAction = serde_json::from_value(stored).unwrap();
        assert_eq!(
            action,
            ChatAction::RollDamage {
                actor,
                item,
                targets: Vec::new(),
                apply_bonus_damage: false,
            }
        );

        let value = serde_json::to_value(ChatAction::RollDamage {
            actor,
            item,
            targets: Vec::new(),
            apply_bonus_damage: true,
        })
        .unwrap();
        assert_eq!(value["applyBonusDamage"], true);
    }

    #[test]
    fn actions_serialize_with_a_tag() {
        let target = ActorId::new();
        let value = serde_json::to_value(ChatAction::ApplyHealing { target, amount: 4 }).unwrap();
        assert_eq!(value["action"], "applyHealing");
        assert_eq!(value["amount"], 4);
    }

    #[test]
    fn stored_roll_dice_get_roles_from_the_formula() {
        let roll = json!({
            "formula": "1d20+1-2d6kh",
            "terms": [
                { "results": [{ "result": 12, "active": true }] },
                { "number": 1 },
                { "results": [{ "result": 2, "active": false }, { "result": 5, "active": true }] },
            ],
        });

        let tagged = annotate_stored_roll(&roll).unwrap();
        assert_eq!(tagged.len(), 2);
        assert_eq!(tagged[0].role, DieRole::Base);
        assert_eq!(tagged[0].result, 12);
        assert_eq!(tagged[1].role, DieRole::Bane);
        assert_eq!(tagged[1].result, 5);

        assert!(annotate_stored_roll(&json!({ "terms": [] })).is_none());
    }
}

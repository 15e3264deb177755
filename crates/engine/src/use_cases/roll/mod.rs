//! Roll use cases.
//!
//! Attribute rolls, damage rolls and healing rolls. All of them post a chat
//! card carrying the buttons for the follow-up actions.

mod attribute;
mod card;
mod damage;
mod error;

use std::sync::Arc;

use weirdwizard_domain::EffectChangeRegistry;

use crate::infrastructure::ports::{
    ActorRepo, ChatLogPort, ClockPort, NotificationPort, RandomPort, SettingsRepo, TemplatePort,
};
use crate::use_cases::afflictions::AfflictionOps;

pub use attribute::{AttributeRollOutcome, AttributeRollRequest, RollAttribute, RollSource};
pub use card::{DAMAGE_TEMPLATE, FLAGS_SCOPE, HEALING_TEMPLATE};
pub use damage::{
    DamageRollRequest, HealingRollRequest, HealingSource, HealthRollOutcome, RollDamage,
    RollHealing,
};
pub use error::RollError;

/// Container for roll use cases.
pub struct RollUseCases {
    pub attribute: Arc<RollAttribute>,
    pub damage: Arc<RollDamage>,
    pub healing: Arc<RollHealing>,
}

impl RollUseCases {
    pub fn new(
        actors: Arc<dyn ActorRepo>,
        templates: Arc<dyn TemplatePort>,
        chat: Arc<dyn ChatLogPort>,
        notifier: Arc<dyn NotificationPort>,
        settings: Arc<dyn SettingsRepo>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        afflictions: Arc<AfflictionOps>,
        registry: Arc<EffectChangeRegistry>,
    ) -> Self {
        let cards = Arc::new(card::CardPoster::new(templates, chat, settings, clock));
        let attribute = Arc::new(RollAttribute::new(
            actors.clone(),
            random.clone(),
            notifier.clone(),
            afflictions,
            registry.clone(),
            cards.clone(),
        ));
        let damage = Arc::new(RollDamage::new(
            actors.clone(),
            random.clone(),
            notifier.clone(),
            registry,
            cards.clone(),
        ));
        let healing = Arc::new(RollHealing::new(actors, random, notifier, cards));

        Self {
            attribute,
            damage,
            healing,
        }
    }
}

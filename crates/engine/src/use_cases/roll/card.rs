//! Roll cards: render a template and post it to the chat log.

use std::sync::Arc;

use serde_json::json;
use weirdwizard_domain::MessageId;

use crate::infrastructure::ports::{
    ChatLogPort, ChatMessage, ClockPort, SettingsRepo, Speaker, TemplatePort,
};
use crate::use_cases::chat_actions::ChatAction;

use super::RollError;

pub const DAMAGE_TEMPLATE: &str = "systems/weirdwizard/templates/chat/damage.hbs";
pub const HEALING_TEMPLATE: &str = "systems/weirdwizard/templates/chat/healing.hbs";

/// Key under which roll data is stored in message flags.
pub const FLAGS_SCOPE: &str = "weirdwizard";

/// A chat card about to be posted.
pub(super) struct Card {
    pub speaker: Speaker,
    pub flavor: String,
    /// `None` uses the configured attribute roll template.
    pub template: Option<&'static str>,
    pub context: serde_json::Value,
    pub rolls: Vec<serde_json::Value>,
    pub outcomes: serde_json::Value,
    pub actions: Vec<ChatAction>,
}

pub(super) struct CardPoster {
    templates: Arc<dyn TemplatePort>,
    chat: Arc<dyn ChatLogPort>,
    settings: Arc<dyn SettingsRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CardPoster {
    pub fn new(
        templates: Arc<dyn TemplatePort>,
        chat: Arc<dyn ChatLogPort>,
        settings: Arc<dyn SettingsRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            templates,
            chat,
            settings,
            clock,
        }
    }

    /// Render the card and post it with the configured roll mode.
    ///
    /// Object contexts also get `reverseDamageBar` for the health bar colors.
    pub async fn post(&self, card: Card) -> Result<MessageId, RollError> {
        let settings = self.settings.get().await?;
        let template = card.template.unwrap_or(settings.roll_template.as_str());
        let mut context = card.context;
        if let Some(fields) = context.as_object_mut() {
            fields.insert(
                "reverseDamageBar".to_string(),
                settings.reverse_damage_bar.into(),
            );
        }
        let content = self.templates.render(template, context).await?;

        let flags = json!({
            FLAGS_SCOPE: {
                "outcomes": card.outcomes,
                "actions": card.actions,
            }
        });
        let message = ChatMessage::new(card.speaker, card.flavor, content)
            .with_rolls(card.rolls)
            .with_flags(flags)
            .with_roll_mode(settings.default_roll_mode)
            .at(self.clock.now());

        let id = self.chat.post(message).await?;
        tracing::debug!(message_id = %id, template, "Roll card posted");
        Ok(id)
    }
}

//! Console host services for the dev binary.
//!
//! Chat messages and notifications go to the log; templates render as JSON.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use weirdwizard_domain::MessageId;

use crate::infrastructure::ports::{
    ChatLogPort, ChatMessage, DialogPort, HostError, NotificationPort, TemplatePort,
};

/// Chat log that records posted messages and logs them.
#[derive(Default, Clone)]
pub struct ConsoleChatLog {
    messages: Arc<RwLock<Vec<(MessageId, ChatMessage)>>>,
}

impl ConsoleChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<(MessageId, ChatMessage)> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl ChatLogPort for ConsoleChatLog {
    async fn post(&self, message: ChatMessage) -> Result<MessageId, HostError> {
        let id = MessageId::new();
        tracing::info!(
            message_id = %id,
            speaker = %message.speaker.alias,
            roll_mode = %message.roll_mode,
            flavor = %message.flavor,
            "Chat message posted"
        );
        println!("{}", message.content);
        self.messages.write().await.push((id, message));
        Ok(id)
    }
}

/// Renders the template context as pretty JSON.
#[derive(Default)]
pub struct JsonTemplateRenderer;

#[async_trait]
impl TemplatePort for JsonTemplateRenderer {
    async fn render(&self, path: &str, context: serde_json::Value) -> Result<String, HostError> {
        let body =
            serde_json::to_string_pretty(&context).map_err(|e| HostError::template(path, e))?;
        Ok(format!("[{}]\n{}", path, body))
    }
}

/// Answers every confirmation with a fixed choice.
pub struct FixedDialog {
    answer: bool,
}

impl FixedDialog {
    pub fn new(answer: bool) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl DialogPort for FixedDialog {
    async fn confirm(&self, title: &str, _content: &str) -> Result<bool, HostError> {
        tracing::debug!(title, answer = self.answer, "Confirmation answered");
        Ok(self.answer)
    }
}

/// Notifications as log lines.
#[derive(Default)]
pub struct LogNotifier;

impl NotificationPort for LogNotifier {
    fn info(&self, message: &str) {
        tracing::info!(notification = message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(notification = message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::Speaker;

    #[tokio::test]
    async fn chat_log_keeps_posted_messages() {
        let chat = ConsoleChatLog::new();
        let message = ChatMessage::new(
            Speaker {
                actor: None,
                alias: "GM".into(),
            },
            "Flavor",
            "<p>Hi</p>",
        );
        let id = chat.post(message.clone()).await.unwrap();

        let messages = chat.messages().await;
        assert_eq!(messages, vec![(id, message)]);
    }

    #[tokio::test]
    async fn json_renderer_includes_path_and_context() {
        let html = JsonTemplateRenderer
            .render("card.hbs", serde_json::json!({ "total": 14 }))
            .await
            .unwrap();
        assert!(html.starts_with("[card.hbs]"));
        assert!(html.contains("\"total\": 14"));
    }
}

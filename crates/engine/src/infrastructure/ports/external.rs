//! Host service port traits (chat log, templates, dialogs, notifications).

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weirdwizard_domain::{ActorId, MessageId};

use super::error::HostError;

// =============================================================================
// Chat Log
// =============================================================================

/// Who a message is displayed as coming from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub actor: Option<ActorId>,
    pub alias: String,
}

impl Speaker {
    pub fn actor(actor: ActorId, alias: impl Into<String>) -> Self {
        Self {
            actor: Some(actor),
            alias: alias.into(),
        }
    }
}

/// Who can see a posted roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollMode {
    #[default]
    Public,
    /// GM and roller
    Private,
    /// GM only, hidden from the roller
    Blind,
    /// Roller only
    SelfRoll,
}

impl RollMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollMode::Public => "publicroll",
            RollMode::Private => "gmroll",
            RollMode::Blind => "blindroll",
            RollMode::SelfRoll => "selfroll",
        }
    }
}

impl fmt::Display for RollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RollMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "publicroll" | "public" => Ok(RollMode::Public),
            "gmroll" | "private" => Ok(RollMode::Private),
            "blindroll" | "blind" => Ok(RollMode::Blind),
            "selfroll" | "self" => Ok(RollMode::SelfRoll),
            other => Err(format!("Unknown roll mode: {}", other)),
        }
    }
}

/// A message for the shared log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub flavor: String,
    /// Rendered HTML.
    pub content: String,
    /// Serialized evaluated rolls.
    #[serde(default)]
    pub rolls: Vec<serde_json::Value>,
    /// System data attached to the message (buttons, outcomes).
    #[serde(default)]
    pub flags: serde_json::Value,
    pub roll_mode: RollMode,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(speaker: Speaker, flavor: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker,
            flavor: flavor.into(),
            content: content.into(),
            rolls: Vec::new(),
            flags: serde_json::Value::Null,
            roll_mode: RollMode::Public,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_rolls(mut self, rolls: Vec<serde_json::Value>) -> Self {
        self.rolls = rolls;
        self
    }

    pub fn with_flags(mut self, flags: serde_json::Value) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_roll_mode(mut self, roll_mode: RollMode) -> Self {
        self.roll_mode = roll_mode;
        self
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatLogPort: Send + Sync {
    /// Apply the message's roll mode and post it.
    async fn post(&self, message: ChatMessage) -> Result<MessageId, HostError>;
}

// =============================================================================
// Templates
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplatePort: Send + Sync {
    async fn render(&self, path: &str, context: serde_json::Value) -> Result<String, HostError>;
}

// =============================================================================
// Dialogs and notifications
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DialogPort: Send + Sync {
    /// Ask the user to confirm. `false` means declined.
    async fn confirm(&self, title: &str, content: &str) -> Result<bool, HostError>;
}

/// Transient, non-modal user notifications.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationPort: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

//! System settings and their environment-backed storage.
//!
//! Settings live in the host's world settings; the dev binary serves them
//! from environment variables instead.
//!
//! Supported environment variables:
//! - `WW_SKIP_ACTED`: skip combatants that already acted when advancing turns
//! - `WW_REVERSE_DAMAGE_BAR`: health bar fills as damage is taken
//! - `WW_ROLL_MODE`: default roll mode (`publicroll`, `gmroll`, `blindroll`, `selfroll`)
//! - `WW_ROLL_TEMPLATE`: template path for attribute roll cards

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{RepoError, RollMode, SettingsRepo};

pub const DEFAULT_ROLL_TEMPLATE: &str = "systems/weirdwizard/templates/chat/roll.hbs";

/// World-scoped system settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    #[serde(default)]
    pub skip_acted: bool,
    #[serde(default)]
    pub reverse_damage_bar: bool,
    #[serde(default)]
    pub default_roll_mode: RollMode,
    #[serde(default = "default_roll_template")]
    pub roll_template: String,
}

fn default_roll_template() -> String {
    DEFAULT_ROLL_TEMPLATE.to_string()
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            skip_acted: false,
            reverse_damage_bar: false,
            default_roll_mode: RollMode::Public,
            roll_template: default_roll_template(),
        }
    }
}

/// Engine configuration read once at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub settings: SystemSettings,
}

impl EngineConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut settings = SystemSettings::default();

        if let Some(val) = lookup("WW_SKIP_ACTED") {
            settings.skip_acted = parse_flag(&val).context("WW_SKIP_ACTED")?;
        }
        if let Some(val) = lookup("WW_REVERSE_DAMAGE_BAR") {
            settings.reverse_damage_bar = parse_flag(&val).context("WW_REVERSE_DAMAGE_BAR")?;
        }
        if let Some(val) = lookup("WW_ROLL_MODE") {
            settings.default_roll_mode = val
                .parse::<RollMode>()
                .map_err(anyhow::Error::msg)
                .context("WW_ROLL_MODE")?;
        }
        if let Some(val) = lookup("WW_ROLL_TEMPLATE") {
            let val = val.trim();
            if val.is_empty() {
                tracing::warn!("WW_ROLL_TEMPLATE is empty, keeping default");
            } else {
                settings.roll_template = val.to_string();
            }
        }

        tracing::debug!(?settings, "Loaded system settings");
        Ok(Self { settings })
    }
}

fn parse_flag(val: &str) -> anyhow::Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

/// Serves fixed settings loaded from the environment.
pub struct EnvSettingsRepo {
    settings: SystemSettings,
}

impl EnvSettingsRepo {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            settings: config.settings.clone(),
        }
    }
}

#[async_trait]
impl SettingsRepo for EnvSettingsRepo {
    async fn get(&self) -> Result<SystemSettings, RepoError> {
        Ok(self.settings.clone())
    }
}

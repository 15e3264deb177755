//! Effect change types: modes, value types and the per-key metadata triple.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::ChangeValue;

/// How a change merges into the current value of its target path.
///
/// Discriminants match the host's numeric mode codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeMode {
    /// Left to host-side handlers; the rules core does not touch the value.
    Custom = 0,
    Multiply = 1,
    Add = 2,
    /// Keep the minimum of the current value and the change.
    Downgrade = 3,
    /// Keep the maximum of the current value and the change.
    Upgrade = 4,
    Override = 5,
}

impl ChangeMode {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ChangeMode::Custom),
            1 => Some(ChangeMode::Multiply),
            2 => Some(ChangeMode::Add),
            3 => Some(ChangeMode::Downgrade),
            4 => Some(ChangeMode::Upgrade),
            5 => Some(ChangeMode::Override),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeMode::Custom => "custom",
            ChangeMode::Multiply => "multiply",
            ChangeMode::Add => "add",
            ChangeMode::Downgrade => "downgrade",
            ChangeMode::Upgrade => "upgrade",
            ChangeMode::Override => "override",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    Int,
    Bool,
    Str,
}

impl ValueType {
    /// Parse the raw value entered in the effect config.
    pub fn parse(&self, raw: &str) -> Option<ChangeValue> {
        let raw = raw.trim();
        match self {
            ValueType::Int => raw
                .strip_prefix('+')
                .unwrap_or(raw)
                .parse::<i32>()
                .ok()
                .map(ChangeValue::Int),
            ValueType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(ChangeValue::Bool(true)),
                "false" | "0" => Some(ChangeValue::Bool(false)),
                _ => None,
            },
            ValueType::Str => Some(ChangeValue::Str(raw.to_string())),
        }
    }
}

/// Registered metadata for a change key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMeta {
    pub mode: ChangeMode,
    pub value_type: ValueType,
    /// `None` keeps the host's insertion order; see [`crate::effects::sort_by_priority`].
    pub priority: Option<i32>,
    /// Document path the change writes to.
    pub path: String,
    /// The entered value is subtracted (banes, reductions).
    #[serde(default)]
    pub negate: bool,
}

impl ChangeMeta {
    fn new(mode: ChangeMode, value_type: ValueType, path: &str) -> Self {
        Self {
            mode,
            value_type,
            priority: None,
            path: path.to_string(),
            negate: false,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }
}

pub fn add_int(path: &str) -> ChangeMeta {
    ChangeMeta::new(ChangeMode::Add, ValueType::Int, path)
}

pub fn over_int(path: &str) -> ChangeMeta {
    ChangeMeta::new(ChangeMode::Override, ValueType::Int, path)
}

pub fn up_int(path: &str) -> ChangeMeta {
    ChangeMeta::new(ChangeMode::Upgrade, ValueType::Int, path)
}

pub fn down_int(path: &str) -> ChangeMeta {
    ChangeMeta::new(ChangeMode::Downgrade, ValueType::Int, path)
}

pub fn set_boo(path: &str) -> ChangeMeta {
    ChangeMeta::new(ChangeMode::Override, ValueType::Bool, path)
}

/// A change as stored on an active effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectChange {
    /// Registry key such as `boons.str` or `defense.override`.
    pub key: String,
    /// Raw value as entered; interpreted through the key's value type.
    pub value: String,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl EffectChange {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// A change after registry lookup and value parsing, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChange {
    pub key: String,
    pub path: String,
    pub mode: ChangeMode,
    pub value: ChangeValue,
    pub priority: Option<i32>,
}

impl ResolvedChange {
    pub(crate) fn from_meta(change: &EffectChange, meta: &ChangeMeta) -> Result<Self, DomainError> {
        let value = meta
            .value_type
            .parse(&change.value)
            .ok_or_else(|| DomainError::invalid_change_value(&change.key, &change.value))?;
        let value = match value {
            ChangeValue::Int(v) if meta.negate => ChangeValue::Int(v.saturating_neg()),
            other => other,
        };
        Ok(Self {
            key: change.key.clone(),
            path: meta.path.clone(),
            mode: meta.mode,
            value,
            // The change's own priority wins over the registry's.
            priority: change.priority.or(meta.priority),
        })
    }
}

//! Dotted-path property storage.
//!
//! Host documents are addressed by dotted paths (`stats.speed.current`).
//! Only the leaves that the rules touch are modelled.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    Int(i32),
    Bool(bool),
    Str(String),
}

impl ChangeValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            ChangeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ChangeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ChangeValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeValue::Int(v) => write!(f, "{}", v),
            ChangeValue::Bool(v) => write!(f, "{}", v),
            ChangeValue::Str(v) => f.write_str(v),
        }
    }
}

/// Flat map of dotted paths to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    values: BTreeMap<String, ChangeValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, value: ChangeValue) -> Self {
        self.set(path, value);
        self
    }

    pub fn with_int(self, path: impl Into<String>, value: i32) -> Self {
        self.with(path, ChangeValue::Int(value))
    }

    pub fn get(&self, path: &str) -> Option<&ChangeValue> {
        self.values.get(path)
    }

    pub fn set(&mut self, path: impl Into<String>, value: ChangeValue) {
        self.values.insert(path.into(), value);
    }

    /// Integer at `path`, zero when unset or not an integer.
    pub fn int(&self, path: &str) -> i32 {
        self.get(path).and_then(ChangeValue::as_int).unwrap_or(0)
    }

    /// Boolean at `path`, false when unset.
    pub fn flag(&self, path: &str) -> bool {
        self.get(path).and_then(ChangeValue::as_bool).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ChangeValue)> {
        self.values.iter()
    }
}

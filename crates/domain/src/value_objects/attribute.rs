//! Attribute and opposed-attribute keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A rollable attribute.
///
/// Luck is rolled like an attribute but has no score of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Str,
    Agi,
    Int,
    Wil,
    Luck,
}

impl Attribute {
    /// The four attributes that carry a score. Used by "all attributes" helpers.
    pub const PHYSICAL_MENTAL: [Attribute; 4] =
        [Attribute::Str, Attribute::Agi, Attribute::Int, Attribute::Wil];

    pub const ALL: [Attribute; 5] = [
        Attribute::Str,
        Attribute::Agi,
        Attribute::Int,
        Attribute::Wil,
        Attribute::Luck,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Attribute::Str => "str",
            Attribute::Agi => "agi",
            Attribute::Int => "int",
            Attribute::Wil => "wil",
            Attribute::Luck => "luck",
        }
    }

    /// Localization key for the attribute's display name.
    pub fn label_key(&self) -> &'static str {
        match self {
            Attribute::Str => "WW.Attributes.Strength",
            Attribute::Agi => "WW.Attributes.Agility",
            Attribute::Int => "WW.Attributes.Intellect",
            Attribute::Wil => "WW.Attributes.Will",
            Attribute::Luck => "WW.Attributes.Luck",
        }
    }

    /// The matching opposed key, if the attribute can be rolled against.
    pub fn as_against(&self) -> Option<AgainstKey> {
        match self {
            Attribute::Str => Some(AgainstKey::Str),
            Attribute::Agi => Some(AgainstKey::Agi),
            Attribute::Int => Some(AgainstKey::Int),
            Attribute::Wil => Some(AgainstKey::Wil),
            Attribute::Luck => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Attribute {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "str" | "strength" => Ok(Attribute::Str),
            "agi" | "agility" => Ok(Attribute::Agi),
            "int" | "intellect" => Ok(Attribute::Int),
            "wil" | "will" => Ok(Attribute::Wil),
            "luck" => Ok(Attribute::Luck),
            _ => Err(DomainError::parse(format!("Unknown attribute: {}", s))),
        }
    }
}

/// What an attribute roll is opposed by when rolled against targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgainstKey {
    Def,
    Str,
    Agi,
    Int,
    Wil,
}

impl AgainstKey {
    pub const ALL: [AgainstKey; 5] = [
        AgainstKey::Def,
        AgainstKey::Str,
        AgainstKey::Agi,
        AgainstKey::Int,
        AgainstKey::Wil,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AgainstKey::Def => "def",
            AgainstKey::Str => "str",
            AgainstKey::Agi => "agi",
            AgainstKey::Int => "int",
            AgainstKey::Wil => "wil",
        }
    }

    /// The attribute whose score is the target number, `None` for Defense.
    pub fn attribute(&self) -> Option<Attribute> {
        match self {
            AgainstKey::Def => None,
            AgainstKey::Str => Some(Attribute::Str),
            AgainstKey::Agi => Some(Attribute::Agi),
            AgainstKey::Int => Some(Attribute::Int),
            AgainstKey::Wil => Some(Attribute::Wil),
        }
    }
}

impl fmt::Display for AgainstKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AgainstKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "def" | "defense" => Ok(AgainstKey::Def),
            other => other
                .parse::<Attribute>()
                .ok()
                .and_then(|a| a.as_against())
                .ok_or_else(|| DomainError::parse(format!("Unknown against key: {}", s))),
        }
    }
}

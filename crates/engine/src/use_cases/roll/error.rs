//! Roll operation errors.

use weirdwizard_domain::value_objects::DiceParseError;
use weirdwizard_domain::{ActorId, ItemId};

use crate::infrastructure::ports::{HostError, RepoError};

/// Errors that can occur while rolling.
#[derive(Debug, thiserror::Error)]
pub enum RollError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("Item {item} not found on actor {actor}")]
    ItemNotFound { actor: ActorId, item: ItemId },
    #[error("Invalid formula: {0}")]
    Formula(#[from] DiceParseError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

//! Error types for port operations.

/// Document store errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Document not found - includes document type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Host document operation failed - includes operation name for tracing.
    #[error("Document store error in {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a NotFound error with document type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Store error with operation context.
    pub fn store(operation: &'static str, message: impl ToString) -> Self {
        Self::Store {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failures of host services other than the document store
/// (chat log, template renderer, dialogs).
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    #[error("Template {path} failed to render: {message}")]
    Template { path: String, message: String },
    #[error("Chat log rejected message: {0}")]
    Chat(String),
    #[error("Dialog failed: {0}")]
    Dialog(String),
}

impl HostError {
    pub fn template(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Template {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

//! Error types for editing sessions

use nodeparam_fields::{FieldsError, NodeId};
use thiserror::Error;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by the draft session, commit controller and template store.
///
/// Every error leaves the session and the store as they were before the call.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Open requested with a missing or malformed source record
    #[error("invalid source record: {reason}")]
    InvalidSource { reason: String },

    /// Mutation targets a key the draft template does not contain
    #[error("unknown field '{key}' on node {node_id}")]
    UnknownField { node_id: NodeId, key: String },

    /// Value cannot be stored as JSON (a NaN or infinite float)
    #[error("value for field '{key}' on node {node_id} is not a finite number")]
    NonFiniteValue { node_id: NodeId, key: String },

    /// Mutation, commit or discard requested while idle
    #[error("no active editing session")]
    NoActiveSession,

    /// Open requested while a session is already editing
    #[error("an editing session is already active for node {node_id}")]
    SessionAlreadyActive { node_id: NodeId },

    /// Commit target is no longer in the template store
    #[error("node not found in template store: {node_id}")]
    NodeNotFound { node_id: NodeId },

    /// A writer panicked while holding the store lock
    #[error("template store lock poisoned")]
    StorePoisoned,
}

impl SessionError {
    pub fn invalid_source(reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            reason: reason.into(),
        }
    }
}

impl From<FieldsError> for SessionError {
    fn from(error: FieldsError) -> Self {
        match error {
            FieldsError::InvalidSource { reason } => Self::InvalidSource { reason },
            other => Self::InvalidSource {
                reason: other.to_string(),
            },
        }
    }
}

//! Errors raised by the reconciliation engine.

use thiserror::Error;

use crate::record::Origin;

/// Result type alias using `ReconcileError`.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Data-integrity failures. Both variants abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The same identity key appears twice within one origin.
    #[error("duplicate identity key '{key}' in {origin} records")]
    DuplicateKey { origin: Origin, key: String },

    /// A record cannot take part in matching.
    #[error("invalid {origin} record at position {index}: {reason}")]
    InvalidRecord {
        origin: Origin,
        index: usize,
        reason: String,
    },
}

impl ReconcileError {
    /// Origin whose input triggered the error.
    #[must_use]
    pub fn origin(&self) -> Origin {
        match self {
            ReconcileError::DuplicateKey { origin, .. }
            | ReconcileError::InvalidRecord { origin, .. } => *origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_message_names_origin_and_key() {
        let err = ReconcileError::DuplicateKey {
            origin: Origin::Source,
            key: "jane@example.com".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("SOURCE"));
        assert!(message.contains("jane@example.com"));
        assert_eq!(err.origin(), Origin::Source);
    }

    #[test]
    fn test_invalid_record_message() {
        let err = ReconcileError::InvalidRecord {
            origin: Origin::Okta,
            index: 3,
            reason: "empty identity key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid OKTA record at position 3: empty identity key"
        );
    }
}

//! Error types for item transactions.

use ironvale_state::StateError;

/// Failure modes of an item transaction.
///
/// `Validation`, `Conflict`, and `Capacity` are rejections: the operation
/// was refused before any state changed. `Infrastructure` means a store
/// call failed mid-operation and the caller should retry.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    /// The request violates a game rule (bad slot, unmet requirement,
    /// wrong tile).
    #[error("validation: {0}")]
    Validation(String),

    /// The target no longer exists or belongs to someone else (a race
    /// lost to another actor).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The inventory cannot absorb the result of the operation.
    #[error("capacity: {0}")]
    Capacity(String),

    /// A cache or durable store call failed.
    #[error("infrastructure: {0}")]
    Infrastructure(#[from] StateError),
}

impl OpError {
    /// Stable machine-readable code for wire protocols and logs.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Capacity(_) => "capacity",
            Self::Infrastructure(_) => "infrastructure",
        }
    }
}

impl From<ironvale_db::DbError> for OpError {
    fn from(err: ironvale_db::DbError) -> Self {
        Self::Infrastructure(StateError::from(err))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(OpError::Validation(String::new()).code(), "validation");
        assert_eq!(OpError::Conflict(String::new()).code(), "conflict");
        assert_eq!(OpError::Capacity(String::new()).code(), "capacity");
    }
}

//! Error types for the state layer.

use ironvale_types::PlayerId;

/// Errors that can occur while routing or syncing state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A store operation failed.
    #[error("store error: {0}")]
    Db(#[from] ironvale_db::DbError),

    /// A player has no durable record.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// A cached value could not be interpreted.
    #[error("corrupt cached value: {0}")]
    Corrupt(String),
}

//! Domain error types.

use thiserror::Error;

/// Failure reported by a storage backend. Backends map their native error
/// (e.g. a database error) into this; the coordinator never inspects the
/// message.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);

/// Error taxonomy of the reservation coordinator.
///
/// Every variant is terminal for the requested operation — the coordinator
/// never retries internally; the caller decides whether to re-fetch and
/// re-attempt.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The referenced listing or reservation does not exist.
    #[error("listing or reservation not found")]
    NotFound,

    /// The listing was no longer available at reservation time — the race
    /// was lost.
    #[error("listing is no longer available")]
    Conflict,

    /// The transition was attempted from a state that does not permit it.
    #[error("transition not permitted from the current status")]
    InvalidState,

    /// The actor lacks the role or ownership relationship the operation
    /// requires.
    #[error("actor is not permitted to perform this operation")]
    Forbidden,

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;

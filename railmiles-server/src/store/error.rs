//! Journey store error types.

use crate::domain::JourneyId;

/// Errors from the journey store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database rejected an operation
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be turned back into a journey
    #[error("corrupt row for journey {id}: {message}")]
    Corrupt { id: String, message: String },

    /// No journey with that id
    #[error("journey {0} not found")]
    NotFound(JourneyId),

    /// The journey already has a return leg
    #[error("return journey already exists for {0}")]
    ReturnAlreadyExists(JourneyId),
}

impl StoreError {
    /// Whether the error was caused by the request rather than the store.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound(_) | StoreError::ReturnAlreadyExists(_)
        )
    }
}

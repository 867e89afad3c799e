//! Error types for the social domain layer.

use gamelink_database::{ConnectionError, DatabaseError, GroupError, LibraryError, SessionError};
use thiserror::Error;

/// Result type alias for social-domain operations
pub type SocialResult<T> = Result<T, SocialError>;

/// Main error type for the social domain.
///
/// Business-rule violations carry the short human-readable reason shown to
/// the user; they are expected outcomes, not exceptions.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("You cannot compare with yourself.")]
    SelfComparison,

    #[error("Game search is currently unavailable.")]
    CatalogUnavailable,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl SocialError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

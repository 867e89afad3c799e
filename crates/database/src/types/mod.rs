//! Shared types for the database layer.

pub mod errors;

pub use errors::{ConnectionError, DatabaseError, GroupError, LibraryError, SessionError};

/// Result type alias for general database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Result type alias for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for group operations
pub type GroupResult<T> = Result<T, GroupError>;

/// Result type alias for connection operations
pub type ConnectionResult<T> = Result<T, ConnectionError>;

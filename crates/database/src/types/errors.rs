//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Library-specific database errors (game records and gamertags)
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Game not found")]
    GameNotFound,

    #[error("This game is already in your library.")]
    DuplicateGame,

    #[error("Gamertag not found")]
    GamertagNotFound,

    #[error("You already have a gamertag for this platform.")]
    GamertagAlreadyRegistered,

    #[error("Rating must be between 0 and 10.")]
    InvalidRating,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Session-specific database errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Participant not found")]
    ParticipantNotFound,

    #[error("Invite not found")]
    InviteNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("You are already in this session.")]
    AlreadyParticipant,

    #[error("This session is full.")]
    SessionFull,

    #[error("This session has been cancelled.")]
    SessionCancelled,

    #[error("This session has already started.")]
    SessionInPast,

    #[error("This invitation has already been responded to.")]
    InviteAlreadyResponded,

    #[error("The host cannot leave their own session.")]
    HostCannotLeave,

    #[error("A session cannot go from {from} to {to}.")]
    InvalidTransition { from: String, to: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied")]
    AccessDenied,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Group-specific database errors
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Group not found")]
    GroupNotFound,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Invite not found")]
    InviteNotFound,

    #[error("This group is full.")]
    GroupFull,

    #[error("You are already a member of this group.")]
    AlreadyMember,

    #[error("This invitation has already been responded to.")]
    InviteAlreadyResponded,

    #[error("The owner cannot leave their own group.")]
    OwnerCannotLeave,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Connection-specific database errors
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("You are already connected with this user.")]
    AlreadyConnected,

    #[error("You cannot connect with yourself.")]
    SelfConnection,

    #[error("This request has already been responded to.")]
    NotPending,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

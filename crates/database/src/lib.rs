//! GameLink Database Crate
//!
//! This crate provides database functionality for the GameLink application,
//! including connection management, migrations, and repository implementations
//! for game libraries, gamertags, gaming sessions, groups, and the friend graph.

use gamelink_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{
    ConnectionRepository, GameRepository, GamertagRepository, GroupRepository, InviteRepository,
    MessageRepository, ParticipantRepository, SessionRepository,
};

// Re-export entities
pub use entities::{
    connection::{Connection, ConnectionStatus},
    game::{CreateGameRequest, GameRecord, OwnershipStatus, UpdateGameRequest},
    gamertag::{CreateGamertagRequest, Gamertag},
    group::{
        CreateGroupRequest, GamingGroup, GroupInvite, GroupInviteStatus, GroupMember, GroupPrivacy,
        GroupRole,
    },
    invite::{CreateInviteRequest, InviteStatus, SessionInvite},
    message::{CreateMessageRequest, MessageKind, SessionMessage},
    participant::{ParticipantStatus, SessionParticipant},
    platform::Platform,
    session::{CreateSessionRequest, GamingSession, SessionPrivacy, SessionStatus, UpdateSessionRequest},
};

// Re-export types
pub use types::{
    errors::{ConnectionError, DatabaseError, GroupError, LibraryError, SessionError},
    ConnectionResult, DatabaseResult, GroupResult, LibraryResult, SessionResult,
};

/// Re-export commonly used types for convenience
pub use sqlx::Pool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}

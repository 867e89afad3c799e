use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// Represents a scheduled or ad hoc multiplayer event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamingSession {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible ID
    pub public_id: String,
    /// User hosting the session. The host is conceptually a participant but
    /// is represented by this column, not by a participant row.
    pub host_id: i64,
    /// Session title
    pub title: String,
    /// Free-text name of the game being played
    pub game_name: String,
    /// Platform the session runs on (optional)
    pub platform: Option<Platform>,
    /// When the session is scheduled to start
    pub scheduled_at: String,
    /// Maximum number of joined participants
    pub max_participants: i64,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Who may join
    pub privacy: SessionPrivacy,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// Session lifecycle status enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl From<&str> for SessionStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => SessionStatus::Active,
            "completed" => SessionStatus::Completed,
            "cancelled" => SessionStatus::Cancelled,
            _ => SessionStatus::Scheduled,
        }
    }
}

impl From<SessionStatus> for String {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Scheduled => "scheduled".to_string(),
            SessionStatus::Active => "active".to_string(),
            SessionStatus::Completed => "completed".to_string(),
            SessionStatus::Cancelled => "cancelled".to_string(),
        }
    }
}

impl SessionStatus {
    /// Whether a manual transition to `next` is permitted. Transitions are
    /// explicit host actions; nothing moves with the clock.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Scheduled, SessionStatus::Active)
                | (SessionStatus::Active, SessionStatus::Completed)
                | (SessionStatus::Scheduled, SessionStatus::Cancelled)
        )
    }

    /// Check if status is final (cannot be changed)
    pub fn is_final(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

/// Session privacy enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPrivacy {
    Public,
    FriendsOnly,
    InviteOnly,
}

impl From<&str> for SessionPrivacy {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "friends_only" => SessionPrivacy::FriendsOnly,
            "invite_only" => SessionPrivacy::InviteOnly,
            _ => SessionPrivacy::Public,
        }
    }
}

impl From<SessionPrivacy> for String {
    fn from(privacy: SessionPrivacy) -> Self {
        match privacy {
            SessionPrivacy::Public => "public".to_string(),
            SessionPrivacy::FriendsOnly => "friends_only".to_string(),
            SessionPrivacy::InviteOnly => "invite_only".to_string(),
        }
    }
}

/// Request to create a new session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub game_name: String,
    pub platform: Option<String>,
    pub scheduled_at: String,
    pub max_participants: Option<i64>,
    pub privacy: Option<String>,
    /// Users to invite as part of session creation
    #[serde(default)]
    pub invited_user_ids: Vec<i64>,
}

/// Request to update a session; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub game_name: Option<String>,
    pub platform: Option<String>,
    pub scheduled_at: Option<String>,
    pub max_participants: Option<i64>,
    pub privacy: Option<String>,
}

impl GamingSession {
    /// Create a new session instance
    pub fn new(host_id: i64, request: &CreateSessionRequest, default_max_participants: i64) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: 0, // Will be set by database
            public_id: cuid2::cuid(),
            host_id,
            title: request.title.clone(),
            game_name: request.game_name.clone(),
            platform: request.platform.as_deref().map(Platform::from),
            scheduled_at: request.scheduled_at.clone(),
            max_participants: request.max_participants.unwrap_or(default_max_participants),
            status: SessionStatus::Scheduled,
            privacy: request
                .privacy
                .as_deref()
                .map(SessionPrivacy::from)
                .unwrap_or(SessionPrivacy::Public),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether the joined-participant count has reached capacity
    pub fn is_full(&self, joined_count: i64) -> bool {
        joined_count >= self.max_participants
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, SessionStatus::Cancelled)
    }

    pub fn is_host(&self, user_id: i64) -> bool {
        self.host_id == user_id
    }

    /// Whether the scheduled start time has passed as of `now`.
    /// An unparseable timestamp is treated as past.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc3339(&self.scheduled_at) {
            Ok(scheduled) => scheduled.with_timezone(&Utc) < now,
            Err(_) => true,
        }
    }

    /// Validate session data
    pub fn validate(&self) -> Result<(), String> {
        if self.host_id <= 0 {
            return Err("Invalid host ID".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Session title cannot be empty".to_string());
        }

        if self.title.len() > 255 {
            return Err("Session title too long (max 255 characters)".to_string());
        }

        if self.game_name.trim().is_empty() {
            return Err("Game name cannot be empty".to_string());
        }

        if self.max_participants < 2 {
            return Err("A session needs at least 2 participants".to_string());
        }

        if DateTime::parse_from_rfc3339(&self.scheduled_at).is_err() {
            return Err("Invalid scheduled_at timestamp format".to_string());
        }

        Ok(())
    }
}

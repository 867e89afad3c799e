//! Repository for gaming-session data access operations.

use crate::entities::{
    CreateSessionRequest, GamingSession, Platform, SessionPrivacy, SessionStatus,
    UpdateSessionRequest,
};
use crate::types::{SessionError, SessionResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for gaming-session database operations
pub struct SessionRepository {
    pool: SqlitePool,
}

const SESSION_COLUMNS: &str = "id, public_id, host_id, title, game_name, platform, scheduled_at, max_participants, status, privacy, created_at, updated_at";

fn map_session_row(row: &SqliteRow) -> SessionResult<GamingSession> {
    let status_str: String = row
        .try_get("status")
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;
    let privacy_str: String = row
        .try_get("privacy")
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;
    let platform_str: Option<String> = row
        .try_get("platform")
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

    Ok(GamingSession {
        id: row
            .try_get("id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        public_id: row
            .try_get("public_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        host_id: row
            .try_get("host_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        title: row
            .try_get("title")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        game_name: row
            .try_get("game_name")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        platform: platform_str.as_deref().map(Platform::from),
        scheduled_at: row
            .try_get("scheduled_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        max_participants: row
            .try_get("max_participants")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        status: SessionStatus::from(status_str.as_str()),
        privacy: SessionPrivacy::from(privacy_str.as_str()),
        created_at: row
            .try_get("created_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
    })
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a session by ID
    pub async fn find_by_id(&self, id: i64) -> SessionResult<Option<GamingSession>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM gaming_sessions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_session_row).transpose()
    }

    /// Find a session by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> SessionResult<Option<GamingSession>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM gaming_sessions WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_session_row).transpose()
    }

    /// Find all sessions hosted by a user
    pub async fn find_by_host(&self, host_id: i64) -> SessionResult<Vec<GamingSession>> {
        let rows = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM gaming_sessions WHERE host_id = ? ORDER BY scheduled_at DESC"
        ))
        .bind(host_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_session_row).collect()
    }

    /// Find public sessions that are still scheduled, soonest first
    pub async fn find_upcoming_public(&self, limit: i64) -> SessionResult<Vec<GamingSession>> {
        let rows = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM gaming_sessions
             WHERE privacy = 'public' AND status = 'scheduled'
             ORDER BY scheduled_at ASC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_session_row).collect()
    }

    /// Create a new session
    pub async fn create(
        &self,
        host_id: i64,
        request: &CreateSessionRequest,
        default_max_participants: i64,
    ) -> SessionResult<GamingSession> {
        let session = GamingSession::new(host_id, request, default_max_participants);
        session.validate().map_err(SessionError::ValidationError)?;

        let result = sqlx::query(
            "INSERT INTO gaming_sessions (public_id, host_id, title, game_name, platform, scheduled_at, max_participants, status, privacy, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&session.public_id)
        .bind(session.host_id)
        .bind(&session.title)
        .bind(&session.game_name)
        .bind(session.platform.map(String::from))
        .bind(&session.scheduled_at)
        .bind(session.max_participants)
        .bind(String::from(session.status))
        .bind(String::from(session.privacy))
        .bind(&session.created_at)
        .bind(&session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        let session_id = result.last_insert_rowid();

        info!(
            session_id = session_id,
            public_id = %session.public_id,
            host_id = host_id,
            title = %session.title,
            "created gaming session"
        );

        Ok(GamingSession { id: session_id, ..session })
    }

    /// Edit session details. Absent request fields are left untouched.
    pub async fn update(&self, id: i64, request: &UpdateSessionRequest) -> SessionResult<GamingSession> {
        let existing = self.find_by_id(id).await?.ok_or(SessionError::SessionNotFound)?;

        let mut updated = existing;
        if let Some(ref title) = request.title {
            updated.title = title.clone();
        }
        if let Some(ref game_name) = request.game_name {
            updated.game_name = game_name.clone();
        }
        if let Some(ref platform) = request.platform {
            updated.platform = Some(Platform::from(platform.as_str()));
        }
        if let Some(ref scheduled_at) = request.scheduled_at {
            updated.scheduled_at = scheduled_at.clone();
        }
        if let Some(max_participants) = request.max_participants {
            updated.max_participants = max_participants;
        }
        if let Some(ref privacy) = request.privacy {
            updated.privacy = SessionPrivacy::from(privacy.as_str());
        }
        updated.updated_at = chrono::Utc::now().to_rfc3339();

        updated.validate().map_err(SessionError::ValidationError)?;

        sqlx::query(
            "UPDATE gaming_sessions
             SET title = ?, game_name = ?, platform = ?, scheduled_at = ?, max_participants = ?, privacy = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&updated.title)
        .bind(&updated.game_name)
        .bind(updated.platform.map(String::from))
        .bind(&updated.scheduled_at)
        .bind(updated.max_participants)
        .bind(String::from(updated.privacy))
        .bind(&updated.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        info!(session_id = id, "updated gaming session");

        Ok(updated)
    }

    /// Transition the session status. The transition must be legal per
    /// `SessionStatus::can_transition_to`.
    pub async fn update_status(&self, id: i64, next: SessionStatus) -> SessionResult<GamingSession> {
        let session = self.find_by_id(id).await?.ok_or(SessionError::SessionNotFound)?;

        if !session.status.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: String::from(session.status),
                to: String::from(next),
            });
        }

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE gaming_sessions SET status = ?, updated_at = ? WHERE id = ?")
            .bind(String::from(next))
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        info!(
            session_id = id,
            from = %String::from(session.status),
            to = %String::from(next),
            "session status changed"
        );

        let mut updated = session;
        updated.status = next;
        updated.updated_at = now;
        Ok(updated)
    }
}

//! Repository for session-participant data access operations.

use crate::entities::{ParticipantStatus, SessionParticipant};
use crate::types::{SessionError, SessionResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for session-participant database operations
pub struct ParticipantRepository {
    pool: SqlitePool,
}

const PARTICIPANT_COLUMNS: &str = "id, session_id, user_id, status, joined_at, left_at";

fn map_participant_row(row: &SqliteRow) -> SessionResult<SessionParticipant> {
    let status_str: String = row
        .try_get("status")
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

    Ok(SessionParticipant {
        id: row
            .try_get("id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        session_id: row
            .try_get("session_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        status: ParticipantStatus::from(status_str.as_str()),
        joined_at: row
            .try_get("joined_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        left_at: row
            .try_get("left_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
    })
}

impl ParticipantRepository {
    /// Create a new participant repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find all participant rows for a session, including left and kicked
    pub async fn find_by_session(&self, session_id: i64) -> SessionResult<Vec<SessionParticipant>> {
        let rows = sqlx::query(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM session_participants
             WHERE session_id = ? ORDER BY joined_at ASC"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_participant_row).collect()
    }

    /// Find currently joined participants for a session
    pub async fn find_joined_by_session(&self, session_id: i64) -> SessionResult<Vec<SessionParticipant>> {
        let rows = sqlx::query(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM session_participants
             WHERE session_id = ? AND status = 'joined' ORDER BY joined_at ASC"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_participant_row).collect()
    }

    /// Find the live membership row for a user in a session, if any
    pub async fn find_active(&self, session_id: i64, user_id: i64) -> SessionResult<Option<SessionParticipant>> {
        let row = sqlx::query(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM session_participants
             WHERE session_id = ? AND user_id = ? AND status = 'joined'"
        ))
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_participant_row).transpose()
    }

    /// Count currently joined participants
    pub async fn count_joined(&self, session_id: i64) -> SessionResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM session_participants
             WHERE session_id = ? AND status = 'joined'",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.try_get("count")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))
    }

    /// Insert a joined membership row. Re-joining after leaving inserts a new
    /// row; the partial unique index refuses a second live row per user.
    pub async fn create(&self, session_id: i64, user_id: i64) -> SessionResult<SessionParticipant> {
        let participant = SessionParticipant::new(session_id, user_id);

        let result = sqlx::query(
            "INSERT INTO session_participants (session_id, user_id, status, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(participant.session_id)
        .bind(participant.user_id)
        .bind(String::from(participant.status))
        .bind(&participant.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => SessionError::AlreadyParticipant,
            _ => SessionError::DatabaseError(e.to_string()),
        })?;

        let participant_id = result.last_insert_rowid();

        info!(
            participant_id = participant_id,
            session_id = session_id,
            user_id = user_id,
            "participant joined session"
        );

        Ok(SessionParticipant { id: participant_id, ..participant })
    }

    /// Mark a live membership as left
    pub async fn mark_left(&self, session_id: i64, user_id: i64) -> SessionResult<SessionParticipant> {
        self.close_membership(session_id, user_id, ParticipantStatus::Left).await
    }

    /// Mark a live membership as kicked
    pub async fn mark_kicked(&self, session_id: i64, user_id: i64) -> SessionResult<SessionParticipant> {
        self.close_membership(session_id, user_id, ParticipantStatus::Kicked).await
    }

    async fn close_membership(
        &self,
        session_id: i64,
        user_id: i64,
        status: ParticipantStatus,
    ) -> SessionResult<SessionParticipant> {
        let mut participant = self
            .find_active(session_id, user_id)
            .await?
            .ok_or(SessionError::ParticipantNotFound)?;

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE session_participants SET status = ?, left_at = ? WHERE id = ?")
            .bind(String::from(status))
            .bind(&now)
            .bind(participant.id)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        info!(
            session_id = session_id,
            user_id = user_id,
            status = %String::from(status),
            "participant membership closed"
        );

        participant.status = status;
        participant.left_at = Some(now);
        Ok(participant)
    }
}

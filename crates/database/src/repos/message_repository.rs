//! Repository for session-message data access operations.

use crate::entities::{MessageKind, SessionMessage};
use crate::types::{SessionError, SessionResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for session-message database operations
pub struct MessageRepository {
    pool: SqlitePool,
}

const MESSAGE_COLUMNS: &str = "id, public_id, session_id, sender_id, body, kind, created_at, edited_at";

fn map_message_row(row: &SqliteRow) -> SessionResult<SessionMessage> {
    let kind_str: String = row
        .try_get("kind")
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

    Ok(SessionMessage {
        id: row
            .try_get("id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        public_id: row
            .try_get("public_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        session_id: row
            .try_get("session_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        sender_id: row
            .try_get("sender_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        body: row
            .try_get("body")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        kind: MessageKind::from(kind_str.as_str()),
        created_at: row
            .try_get("created_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        edited_at: row
            .try_get("edited_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
    })
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a message by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> SessionResult<Option<SessionMessage>> {
        let row = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM session_messages WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_message_row).transpose()
    }

    /// Fetch a session's messages oldest-first, the order a chat renders in
    pub async fn find_by_session(&self, session_id: i64, limit: i64) -> SessionResult<Vec<SessionMessage>> {
        let rows = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM session_messages
             WHERE session_id = ? ORDER BY created_at ASC, id ASC LIMIT ?"
        ))
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_message_row).collect()
    }

    /// Append a message to a session's chat
    pub async fn create(
        &self,
        session_id: i64,
        sender_id: i64,
        body: &str,
        kind: MessageKind,
    ) -> SessionResult<SessionMessage> {
        let message = SessionMessage::new(session_id, sender_id, body.to_string(), kind);
        message.validate().map_err(SessionError::ValidationError)?;

        let result = sqlx::query(
            "INSERT INTO session_messages (public_id, session_id, sender_id, body, kind, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.public_id)
        .bind(message.session_id)
        .bind(message.sender_id)
        .bind(&message.body)
        .bind(String::from(message.kind))
        .bind(&message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id = message_id,
            session_id = session_id,
            sender_id = sender_id,
            kind = %String::from(kind),
            "posted session message"
        );

        Ok(SessionMessage { id: message_id, ..message })
    }

    /// Replace a message body and stamp the edit marker. The previous body
    /// is not kept anywhere.
    pub async fn update_body(&self, id: i64, new_body: &str) -> SessionResult<SessionMessage> {
        let mut message = self.require(id).await?;

        message.edit(new_body.to_string());
        message.validate().map_err(SessionError::ValidationError)?;

        sqlx::query("UPDATE session_messages SET body = ?, edited_at = ? WHERE id = ?")
            .bind(&message.body)
            .bind(&message.edited_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        info!(message_id = id, session_id = message.session_id, "edited session message");
        Ok(message)
    }

    /// Hard-delete a message
    pub async fn delete(&self, id: i64) -> SessionResult<()> {
        let result = sqlx::query("DELETE FROM session_messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SessionError::MessageNotFound);
        }

        info!(message_id = id, "deleted session message");
        Ok(())
    }

    async fn require(&self, id: i64) -> SessionResult<SessionMessage> {
        let row = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM session_messages WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.as_ref()
            .map(map_message_row)
            .transpose()?
            .ok_or(SessionError::MessageNotFound)
    }
}

//! Repository for friend-graph data access operations.

use crate::entities::{Connection, ConnectionStatus};
use crate::types::{ConnectionError, ConnectionResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for connection database operations
pub struct ConnectionRepository {
    pool: SqlitePool,
}

const CONNECTION_COLUMNS: &str =
    "id, requester_id, recipient_id, status, message, created_at, accepted_at";

fn map_connection_row(row: &SqliteRow) -> ConnectionResult<Connection> {
    let status_str: String = row
        .try_get("status")
        .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

    Ok(Connection {
        id: row
            .try_get("id")
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?,
        requester_id: row
            .try_get("requester_id")
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?,
        recipient_id: row
            .try_get("recipient_id")
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?,
        status: ConnectionStatus::from(status_str.as_str()),
        message: row
            .try_get("message")
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?,
        accepted_at: row
            .try_get("accepted_at")
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?,
    })
}

impl ConnectionRepository {
    /// Create a new connection repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the edge between two users regardless of which side requested it
    pub async fn find_between(&self, user_a: i64, user_b: i64) -> ConnectionResult<Option<Connection>> {
        let row = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections
             WHERE (requester_id = ? AND recipient_id = ?) OR (requester_id = ? AND recipient_id = ?)"
        ))
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_connection_row).transpose()
    }

    /// Find pending requests addressed to a user
    pub async fn find_pending_for_recipient(&self, recipient_id: i64) -> ConnectionResult<Vec<Connection>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections
             WHERE recipient_id = ? AND status = 'pending' ORDER BY created_at DESC"
        ))
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_connection_row).collect()
    }

    /// Find a user's accepted connections (their friends)
    pub async fn find_accepted_for_user(&self, user_id: i64) -> ConnectionResult<Vec<Connection>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections
             WHERE (requester_id = ? OR recipient_id = ?) AND status = 'accepted'
             ORDER BY accepted_at DESC"
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_connection_row).collect()
    }

    /// Create a pending connection request. The unique index over the sorted
    /// endpoint pair is the duplicate guard, so a concurrent double-request
    /// resolves to exactly one row rather than two.
    pub async fn create(
        &self,
        requester_id: i64,
        recipient_id: i64,
        message: Option<String>,
    ) -> ConnectionResult<Connection> {
        if requester_id == recipient_id {
            return Err(ConnectionError::SelfConnection);
        }

        let connection = Connection::new(requester_id, recipient_id, message);

        let result = sqlx::query(
            "INSERT INTO connections (requester_id, recipient_id, status, message, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(connection.requester_id)
        .bind(connection.recipient_id)
        .bind(String::from(connection.status))
        .bind(&connection.message)
        .bind(&connection.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => ConnectionError::AlreadyConnected,
            _ => ConnectionError::DatabaseError(e.to_string()),
        })?;

        let connection_id = result.last_insert_rowid();

        info!(
            connection_id = connection_id,
            requester_id = requester_id,
            recipient_id = recipient_id,
            "created connection request"
        );

        Ok(Connection { id: connection_id, ..connection })
    }

    /// Accept a pending request. Only the recipient may accept.
    pub async fn accept(&self, id: i64, acting_user_id: i64) -> ConnectionResult<Connection> {
        let mut connection = self.require(id).await?;

        if connection.recipient_id != acting_user_id {
            return Err(ConnectionError::Unauthorized);
        }

        connection.accept().map_err(|_| ConnectionError::NotPending)?;

        sqlx::query("UPDATE connections SET status = 'accepted', accepted_at = ? WHERE id = ?")
            .bind(&connection.accepted_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        info!(connection_id = id, accepted_by = acting_user_id, "connection accepted");
        Ok(connection)
    }

    /// Decline a pending request. Only the recipient may decline.
    pub async fn decline(&self, id: i64, acting_user_id: i64) -> ConnectionResult<Connection> {
        let mut connection = self.require(id).await?;

        if connection.recipient_id != acting_user_id {
            return Err(ConnectionError::Unauthorized);
        }

        connection.decline().map_err(|_| ConnectionError::NotPending)?;

        sqlx::query("UPDATE connections SET status = 'declined' WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        info!(connection_id = id, declined_by = acting_user_id, "connection declined");
        Ok(connection)
    }

    /// Block the other party. Either endpoint may block, from any state.
    pub async fn block(&self, id: i64, acting_user_id: i64) -> ConnectionResult<Connection> {
        let mut connection = self.require(id).await?;

        if !connection.involves(acting_user_id) {
            return Err(ConnectionError::Unauthorized);
        }

        connection.block();

        sqlx::query("UPDATE connections SET status = 'blocked' WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        info!(connection_id = id, blocked_by = acting_user_id, "connection blocked");
        Ok(connection)
    }

    /// Delete the edge entirely: unfriend, or cancel an outstanding request.
    /// Either endpoint may delete.
    pub async fn delete(&self, id: i64, acting_user_id: i64) -> ConnectionResult<()> {
        let connection = self.require(id).await?;

        if !connection.involves(acting_user_id) {
            return Err(ConnectionError::Unauthorized);
        }

        sqlx::query("DELETE FROM connections WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        info!(connection_id = id, deleted_by = acting_user_id, "connection removed");
        Ok(())
    }

    async fn require(&self, id: i64) -> ConnectionResult<Connection> {
        let row = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ConnectionError::DatabaseError(e.to_string()))?;

        row.as_ref()
            .map(map_connection_row)
            .transpose()?
            .ok_or(ConnectionError::ConnectionNotFound)
    }
}

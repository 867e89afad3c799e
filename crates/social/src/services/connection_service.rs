//! Connection service for the friend graph.

use std::sync::Arc;

use gamelink_database::{Connection, ConnectionRepository};
use sqlx::SqlitePool;

use crate::types::{NotificationSink, NullSink, SocialEvent, SocialResult};

/// Service for managing friend connections
pub struct ConnectionService {
    connections: ConnectionRepository,
    sink: Arc<dyn NotificationSink>,
}

impl ConnectionService {
    /// Create a new connection service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_sink(pool, Arc::new(NullSink))
    }

    /// Create a connection service with a notification sink
    pub fn with_sink(pool: SqlitePool, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            connections: ConnectionRepository::new(pool),
            sink,
        }
    }

    /// Send a connection request. Self-requests and duplicate edges are
    /// rejected; the duplicate check is the storage-layer unique index, so
    /// racing requests cannot produce two rows.
    pub async fn request(
        &self,
        requester_id: i64,
        recipient_id: i64,
        message: Option<String>,
    ) -> SocialResult<Connection> {
        let connection = self.connections.create(requester_id, recipient_id, message).await?;

        self.sink.deliver(&SocialEvent::ConnectionRequested {
            connection: connection.clone(),
        });

        Ok(connection)
    }

    /// Accept a pending request. Recipient only.
    pub async fn accept(&self, connection_id: i64, actor_id: i64) -> SocialResult<Connection> {
        let connection = self.connections.accept(connection_id, actor_id).await?;

        self.sink.deliver(&SocialEvent::ConnectionAccepted {
            connection: connection.clone(),
        });

        Ok(connection)
    }

    /// Decline a pending request. Recipient only.
    pub async fn decline(&self, connection_id: i64, actor_id: i64) -> SocialResult<Connection> {
        Ok(self.connections.decline(connection_id, actor_id).await?)
    }

    /// Block the other party, from any state
    pub async fn block(&self, connection_id: i64, actor_id: i64) -> SocialResult<Connection> {
        Ok(self.connections.block(connection_id, actor_id).await?)
    }

    /// Remove the edge: unfriend, or withdraw a request. Either party.
    pub async fn remove(&self, connection_id: i64, actor_id: i64) -> SocialResult<()> {
        Ok(self.connections.delete(connection_id, actor_id).await?)
    }

    /// The user IDs a user is connected with
    pub async fn friend_ids(&self, user_id: i64) -> SocialResult<Vec<i64>> {
        let friends = self
            .connections
            .find_accepted_for_user(user_id)
            .await?
            .iter()
            .filter_map(|c| c.other_party(user_id))
            .collect();
        Ok(friends)
    }

    /// Pending requests awaiting a user's response
    pub async fn pending_for(&self, user_id: i64) -> SocialResult<Vec<Connection>> {
        Ok(self.connections.find_pending_for_recipient(user_id).await?)
    }

    /// The edge between two users, if any
    pub async fn between(&self, user_a: i64, user_b: i64) -> SocialResult<Option<Connection>> {
        Ok(self.connections.find_between(user_a, user_b).await?)
    }
}

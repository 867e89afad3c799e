use chrono::Utc;
use serde::{Deserialize, Serialize};

/// An undirected friendship edge, stored from the requester's side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Database primary key
    pub id: i64,
    /// User who sent the request
    pub requester_id: i64,
    /// User who received the request
    pub recipient_id: i64,
    /// Connection status
    pub status: ConnectionStatus,
    /// Personal message from requester
    pub message: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// When the request was accepted
    pub accepted_at: Option<String>,
}

/// Connection status enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Declined,
    Blocked,
}

impl From<&str> for ConnectionStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => ConnectionStatus::Accepted,
            "declined" => ConnectionStatus::Declined,
            "blocked" => ConnectionStatus::Blocked,
            _ => ConnectionStatus::Pending,
        }
    }
}

impl From<ConnectionStatus> for String {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Pending => "pending".to_string(),
            ConnectionStatus::Accepted => "accepted".to_string(),
            ConnectionStatus::Declined => "declined".to_string(),
            ConnectionStatus::Blocked => "blocked".to_string(),
        }
    }
}

impl Connection {
    /// Create a new pending connection request
    pub fn new(requester_id: i64, recipient_id: i64, message: Option<String>) -> Self {
        Self {
            id: 0, // Will be set by database
            requester_id,
            recipient_id,
            status: ConnectionStatus::Pending,
            message,
            created_at: Utc::now().to_rfc3339(),
            accepted_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, ConnectionStatus::Pending)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.status, ConnectionStatus::Accepted)
    }

    /// Whether the given user is one of the two endpoints
    pub fn involves(&self, user_id: i64) -> bool {
        self.requester_id == user_id || self.recipient_id == user_id
    }

    /// The endpoint that is not `user_id`
    pub fn other_party(&self, user_id: i64) -> Option<i64> {
        if self.requester_id == user_id {
            Some(self.recipient_id)
        } else if self.recipient_id == user_id {
            Some(self.requester_id)
        } else {
            None
        }
    }

    /// Sorted endpoint pair; mirrors the unique index on the table
    pub fn pair_key(&self) -> (i64, i64) {
        if self.requester_id <= self.recipient_id {
            (self.requester_id, self.recipient_id)
        } else {
            (self.recipient_id, self.requester_id)
        }
    }

    /// Accept the request (recipient only, checked by the caller)
    pub fn accept(&mut self) -> Result<(), String> {
        if !self.is_pending() {
            return Err("Connection request is not pending".to_string());
        }
        self.status = ConnectionStatus::Accepted;
        self.accepted_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    /// Decline the request
    pub fn decline(&mut self) -> Result<(), String> {
        if !self.is_pending() {
            return Err("Connection request is not pending".to_string());
        }
        self.status = ConnectionStatus::Declined;
        Ok(())
    }

    /// Block the other party. Allowed from any state.
    pub fn block(&mut self) {
        self.status = ConnectionStatus::Blocked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_creation() {
        let connection = Connection::new(1, 2, Some("GG last night, add me".to_string()));

        assert_eq!(connection.requester_id, 1);
        assert_eq!(connection.recipient_id, 2);
        assert!(connection.is_pending());
        assert!(connection.involves(1));
        assert!(connection.involves(2));
        assert!(!connection.involves(3));
    }

    #[test]
    fn test_other_party() {
        let connection = Connection::new(1, 2, None);

        assert_eq!(connection.other_party(1), Some(2));
        assert_eq!(connection.other_party(2), Some(1));
        assert_eq!(connection.other_party(3), None);
    }

    #[test]
    fn test_pair_key_is_sorted() {
        assert_eq!(Connection::new(5, 2, None).pair_key(), (2, 5));
        assert_eq!(Connection::new(2, 5, None).pair_key(), (2, 5));
    }

    #[test]
    fn test_accept() {
        let mut connection = Connection::new(1, 2, None);

        assert!(connection.accept().is_ok());
        assert!(connection.is_accepted());
        assert!(connection.accepted_at.is_some());

        // Status is settled; a second response fails
        assert!(connection.accept().is_err());
        assert!(connection.decline().is_err());
    }

    #[test]
    fn test_decline_leaves_accepted_at_empty() {
        let mut connection = Connection::new(1, 2, None);

        assert!(connection.decline().is_ok());
        assert_eq!(connection.status, ConnectionStatus::Declined);
        assert!(connection.accepted_at.is_none());
    }

    #[test]
    fn test_block_from_any_state() {
        let mut connection = Connection::new(1, 2, None);
        connection.accept().unwrap();

        connection.block();
        assert_eq!(connection.status, ConnectionStatus::Blocked);
    }
}

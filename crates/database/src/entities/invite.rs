use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Represents a session invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInvite {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible ID
    pub public_id: String,
    /// Session this invitation is for
    pub session_id: i64,
    /// User who created the invitation
    pub inviter_id: i64,
    /// User who is invited
    pub invited_user_id: i64,
    /// Invitation status
    pub status: InviteStatus,
    /// Personal message from inviter
    pub message: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// When the invitation was responded to
    pub responded_at: Option<String>,
}

/// Invitation status enumeration.
///
/// Status is monotonic: once non-pending, no further transition is permitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

impl From<&str> for InviteStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => InviteStatus::Accepted,
            "declined" => InviteStatus::Declined,
            _ => InviteStatus::Pending,
        }
    }
}

impl From<InviteStatus> for String {
    fn from(status: InviteStatus) -> Self {
        match status {
            InviteStatus::Pending => "pending".to_string(),
            InviteStatus::Accepted => "accepted".to_string(),
            InviteStatus::Declined => "declined".to_string(),
        }
    }
}

/// Request to invite a user to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInviteRequest {
    pub invited_user_id: i64,
    pub message: Option<String>,
}

impl SessionInvite {
    /// Create a new invitation instance
    pub fn new(session_id: i64, inviter_id: i64, invited_user_id: i64, message: Option<String>) -> Self {
        Self {
            id: 0, // Will be set by database
            public_id: cuid2::cuid(),
            session_id,
            inviter_id,
            invited_user_id,
            status: InviteStatus::Pending,
            message,
            created_at: Utc::now().to_rfc3339(),
            responded_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, InviteStatus::Pending)
    }

    /// Accept the invitation
    pub fn accept(&mut self) -> Result<(), String> {
        if !self.is_pending() {
            return Err("Invitation is not pending".to_string());
        }

        self.status = InviteStatus::Accepted;
        self.responded_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    /// Decline the invitation
    pub fn decline(&mut self) -> Result<(), String> {
        if !self.is_pending() {
            return Err("Invitation is not pending".to_string());
        }

        self.status = InviteStatus::Declined;
        self.responded_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    /// Check if a user can respond to this invitation
    pub fn can_user_respond(&self, user_id: i64) -> bool {
        self.is_pending() && self.invited_user_id == user_id
    }
}

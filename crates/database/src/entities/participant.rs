use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Join record of a user in a gaming session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionParticipant {
    /// Database primary key
    pub id: i64,
    /// Session this membership belongs to
    pub session_id: i64,
    /// User ID of the participant
    pub user_id: i64,
    /// Membership status
    pub status: ParticipantStatus,
    /// When the user joined
    pub joined_at: String,
    /// When the user left or was kicked (if ever)
    pub left_at: Option<String>,
}

/// Participant status enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Joined,
    Left,
    Kicked,
}

impl From<&str> for ParticipantStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "left" => ParticipantStatus::Left,
            "kicked" => ParticipantStatus::Kicked,
            _ => ParticipantStatus::Joined,
        }
    }
}

impl From<ParticipantStatus> for String {
    fn from(status: ParticipantStatus) -> Self {
        match status {
            ParticipantStatus::Joined => "joined".to_string(),
            ParticipantStatus::Left => "left".to_string(),
            ParticipantStatus::Kicked => "kicked".to_string(),
        }
    }
}

impl SessionParticipant {
    /// Create a new joined participant instance
    pub fn new(session_id: i64, user_id: i64) -> Self {
        Self {
            id: 0, // Will be set by database
            session_id,
            user_id,
            status: ParticipantStatus::Joined,
            joined_at: Utc::now().to_rfc3339(),
            left_at: None,
        }
    }

    /// Whether this row counts toward the session's joined count
    pub fn is_active(&self) -> bool {
        matches!(self.status, ParticipantStatus::Joined)
    }

    /// Leave the session
    pub fn leave(&mut self) -> Result<(), String> {
        if !self.is_active() {
            return Err("Participant is not in the session".to_string());
        }
        self.status = ParticipantStatus::Left;
        self.left_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    /// Remove the participant by host action
    pub fn kick(&mut self) -> Result<(), String> {
        if !self.is_active() {
            return Err("Participant is not in the session".to_string());
        }
        self.status = ParticipantStatus::Kicked;
        self.left_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }
}

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message within a gaming session's chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible UUID
    pub public_id: String,
    /// Session this message belongs to
    pub session_id: i64,
    /// User who sent the message
    pub sender_id: i64,
    /// Message body
    pub body: String,
    /// Type of message
    pub kind: MessageKind,
    /// Creation timestamp
    pub created_at: String,
    /// Set when the body has been edited. The previous body is not kept.
    pub edited_at: Option<String>,
}

/// Message kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    System,
    Announcement,
}

impl From<&str> for MessageKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "system" => MessageKind::System,
            "announcement" => MessageKind::Announcement,
            _ => MessageKind::Text,
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Text => "text".to_string(),
            MessageKind::System => "system".to_string(),
            MessageKind::Announcement => "announcement".to_string(),
        }
    }
}

/// Request to post a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub body: String,
    pub kind: Option<String>,
}

impl SessionMessage {
    /// Create a new message instance
    pub fn new(session_id: i64, sender_id: i64, body: String, kind: MessageKind) -> Self {
        Self {
            id: 0, // Will be set by database
            public_id: Uuid::new_v4().to_string(),
            session_id,
            sender_id,
            body,
            kind,
            created_at: Utc::now().to_rfc3339(),
            edited_at: None,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self.kind, MessageKind::System)
    }

    /// Replace the body and stamp the edit marker
    pub fn edit(&mut self, new_body: String) {
        self.body = new_body;
        self.edited_at = Some(Utc::now().to_rfc3339());
    }

    /// Validate message data
    pub fn validate(&self) -> Result<(), String> {
        if self.session_id <= 0 {
            return Err("Invalid session ID".to_string());
        }

        if self.body.trim().is_empty() {
            return Err("Message body cannot be empty".to_string());
        }

        if self.body.len() > 4000 {
            return Err("Message body too long (max 4,000 characters)".to_string());
        }

        Ok(())
    }
}

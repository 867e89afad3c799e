//! Validation utilities.
//!
//! Request-shaped checks run before any state mutation; each failure carries
//! the message shown to the user.

use crate::types::SocialError;
use chrono::{DateTime, Utc};

/// Validation utilities
pub struct Validator;

impl Validator {
    /// Validate a session or group title
    pub fn title(title: &str) -> Result<(), SocialError> {
        if title.trim().is_empty() {
            return Err(SocialError::validation("Title cannot be empty"));
        }

        if title.len() > 255 {
            return Err(SocialError::validation("Title too long (max 255 characters)"));
        }

        Ok(())
    }

    /// Validate a game name
    pub fn game_name(name: &str) -> Result<(), SocialError> {
        if name.trim().is_empty() {
            return Err(SocialError::validation("Game name cannot be empty"));
        }

        if name.len() > 255 {
            return Err(SocialError::validation("Game name too long (max 255 characters)"));
        }

        Ok(())
    }

    /// Validate a gamertag: 2-64 characters, letters, digits, spaces, and
    /// a few common separators
    pub fn gamertag(tag: &str) -> Result<(), SocialError> {
        let tag = tag.trim();
        if tag.len() < 2 {
            return Err(SocialError::validation("Gamertag must be at least 2 characters"));
        }

        if tag.len() > 64 {
            return Err(SocialError::validation("Gamertag too long (max 64 characters)"));
        }

        let tag_regex = regex::Regex::new(r"^[A-Za-z0-9 _\-\.]+$")
            .map_err(|e| SocialError::validation(format!("Failed to compile gamertag regex: {}", e)))?;

        if !tag_regex.is_match(tag) {
            return Err(SocialError::validation(
                "Gamertag may only contain letters, digits, spaces, '_', '-' and '.'",
            ));
        }

        Ok(())
    }

    /// Validate a user rating
    pub fn rating(rating: i64) -> Result<(), SocialError> {
        if !(0..=10).contains(&rating) {
            return Err(SocialError::validation("Rating must be between 0 and 10"));
        }
        Ok(())
    }

    /// Validate a chat message body
    pub fn message_body(body: &str) -> Result<(), SocialError> {
        if body.trim().is_empty() {
            return Err(SocialError::validation("Message body cannot be empty"));
        }

        if body.len() > 4000 {
            return Err(SocialError::validation("Message body too long (max 4,000 characters)"));
        }

        Ok(())
    }

    /// Validate a participant cap against the configured ceiling
    pub fn max_participants(value: i64, ceiling: i64) -> Result<(), SocialError> {
        if value < 2 {
            return Err(SocialError::validation("A session needs at least 2 participants"));
        }

        if value > ceiling {
            return Err(SocialError::validation(format!(
                "Participant cap cannot exceed {ceiling}"
            )));
        }

        Ok(())
    }

    /// Validate a schedule timestamp for a new session: parseable and not
    /// already in the past
    pub fn schedule(scheduled_at: &str, now: DateTime<Utc>) -> Result<(), SocialError> {
        let parsed = DateTime::parse_from_rfc3339(scheduled_at)
            .map_err(|_| SocialError::validation("Invalid scheduled_at timestamp format"))?;

        if parsed.with_timezone(&Utc) < now {
            return Err(SocialError::validation("Sessions cannot be scheduled in the past"));
        }

        Ok(())
    }
}

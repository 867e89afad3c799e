use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// A user's per-platform identifier in a networked gaming service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gamertag {
    /// Database primary key
    pub id: i64,
    /// User this gamertag belongs to
    pub owner_id: i64,
    /// Platform the tag is registered on
    pub platform: Platform,
    /// The tag itself
    pub tag: String,
    /// Creation timestamp
    pub created_at: String,
}

/// Request to register a gamertag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGamertagRequest {
    pub platform: String,
    pub tag: String,
}

impl Gamertag {
    pub fn new(owner_id: i64, platform: Platform, tag: String) -> Self {
        Self {
            id: 0, // Will be set by database
            owner_id,
            platform,
            tag,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Validate gamertag data
    pub fn validate(&self) -> Result<(), String> {
        if self.owner_id <= 0 {
            return Err("Invalid owner ID".to_string());
        }

        let tag = self.tag.trim();
        if tag.is_empty() {
            return Err("Gamertag cannot be empty".to_string());
        }

        if tag.len() > 64 {
            return Err("Gamertag too long (max 64 characters)".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamertag_creation() {
        let tag = Gamertag::new(1, Platform::Xbox, "MasterChief117".to_string());

        assert_eq!(tag.owner_id, 1);
        assert_eq!(tag.platform, Platform::Xbox);
        assert_eq!(tag.tag, "MasterChief117");
        assert!(tag.validate().is_ok());
    }

    #[test]
    fn test_gamertag_validation() {
        let mut tag = Gamertag::new(1, Platform::Pc, "valid".to_string());
        assert!(tag.validate().is_ok());

        tag.tag = "".to_string();
        assert!(tag.validate().is_err());

        tag.tag = "x".repeat(65);
        assert!(tag.validate().is_err());
    }
}

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// Represents one user's relationship to a game title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// Database primary key
    pub id: i64,
    /// User who owns this library entry
    pub owner_id: i64,
    /// External catalog identifier (absent for manual entries)
    pub external_id: Option<i64>,
    /// Game title, used as a fallback match key when no catalog id exists
    pub name: String,
    /// Platform the game is held on
    pub platform: Platform,
    /// Genre tags, possibly empty
    pub genres: Vec<String>,
    /// Relationship to the title
    pub ownership: OwnershipStatus,
    /// User rating from 0 to 10
    pub rating: Option<i64>,
    /// Favorite flag
    pub favorite: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// Ownership status enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipStatus {
    Owned,
    Wishlist,
    Playing,
    Completed,
}

impl From<&str> for OwnershipStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "wishlist" => OwnershipStatus::Wishlist,
            "playing" => OwnershipStatus::Playing,
            "completed" => OwnershipStatus::Completed,
            _ => OwnershipStatus::Owned,
        }
    }
}

impl From<OwnershipStatus> for String {
    fn from(status: OwnershipStatus) -> Self {
        match status {
            OwnershipStatus::Owned => "owned".to_string(),
            OwnershipStatus::Wishlist => "wishlist".to_string(),
            OwnershipStatus::Playing => "playing".to_string(),
            OwnershipStatus::Completed => "completed".to_string(),
        }
    }
}

/// Request to add a game to a library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub external_id: Option<i64>,
    pub name: String,
    pub platform: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub ownership: Option<String>,
    pub rating: Option<i64>,
    #[serde(default)]
    pub favorite: bool,
}

/// Request to edit a library entry; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGameRequest {
    pub name: Option<String>,
    pub platform: Option<String>,
    pub genres: Option<Vec<String>>,
    pub ownership: Option<String>,
    pub rating: Option<Option<i64>>,
    pub favorite: Option<bool>,
}

impl GameRecord {
    /// Create a new library entry instance
    pub fn new(owner_id: i64, request: &CreateGameRequest) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: 0, // Will be set by database
            owner_id,
            external_id: request.external_id,
            name: request.name.clone(),
            platform: Platform::from(request.platform.as_str()),
            genres: request.genres.clone(),
            ownership: request
                .ownership
                .as_deref()
                .map(OwnershipStatus::from)
                .unwrap_or(OwnershipStatus::Owned),
            rating: request.rating,
            favorite: request.favorite,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Check whether this entry counts as an owned game
    pub fn is_owned(&self) -> bool {
        matches!(self.ownership, OwnershipStatus::Owned)
    }

    /// Soft duplicate key for UI warnings: lowercased name plus platform.
    /// Not enforced as uniqueness.
    pub fn duplicate_key(&self) -> (String, Platform) {
        (self.name.to_lowercase(), self.platform)
    }

    /// Validate library entry data
    pub fn validate(&self) -> Result<(), String> {
        if self.owner_id <= 0 {
            return Err("Invalid owner ID".to_string());
        }

        if self.name.trim().is_empty() {
            return Err("Game name cannot be empty".to_string());
        }

        if self.name.len() > 255 {
            return Err("Game name too long (max 255 characters)".to_string());
        }

        if let Some(rating) = self.rating {
            if !(0..=10).contains(&rating) {
                return Err("Rating must be between 0 and 10".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CreateGameRequest {
        CreateGameRequest {
            external_id: Some(42),
            name: "Halo Infinite".to_string(),
            platform: "xbox".to_string(),
            genres: vec!["Shooter".to_string()],
            ownership: None,
            rating: Some(8),
            favorite: true,
        }
    }

    #[test]
    fn test_game_creation() {
        let game = GameRecord::new(1, &sample_request());

        assert_eq!(game.owner_id, 1);
        assert_eq!(game.external_id, Some(42));
        assert_eq!(game.platform, Platform::Xbox);
        assert_eq!(game.ownership, OwnershipStatus::Owned);
        assert!(game.is_owned());
        assert!(game.favorite);
        assert!(game.validate().is_ok());
    }

    #[test]
    fn test_ownership_conversion() {
        assert_eq!(OwnershipStatus::from("owned"), OwnershipStatus::Owned);
        assert_eq!(OwnershipStatus::from("wishlist"), OwnershipStatus::Wishlist);
        assert_eq!(OwnershipStatus::from("playing"), OwnershipStatus::Playing);
        assert_eq!(OwnershipStatus::from("completed"), OwnershipStatus::Completed);
        assert_eq!(OwnershipStatus::from("unknown"), OwnershipStatus::Owned);

        assert_eq!(String::from(OwnershipStatus::Wishlist), "wishlist");
    }

    #[test]
    fn test_wishlist_entry_is_not_owned() {
        let mut request = sample_request();
        request.ownership = Some("wishlist".to_string());
        let game = GameRecord::new(1, &request);
        assert!(!game.is_owned());
    }

    #[test]
    fn test_duplicate_key_lowercases_name() {
        let game = GameRecord::new(1, &sample_request());
        let (name, platform) = game.duplicate_key();
        assert_eq!(name, "halo infinite");
        assert_eq!(platform, Platform::Xbox);
    }

    #[test]
    fn test_game_validation() {
        let mut game = GameRecord::new(1, &sample_request());
        assert!(game.validate().is_ok());

        game.rating = Some(11);
        assert!(game.validate().is_err());

        game.rating = Some(10);
        game.name = "  ".to_string();
        assert!(game.validate().is_err());
    }
}

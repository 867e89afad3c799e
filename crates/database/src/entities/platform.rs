use serde::{Deserialize, Serialize};

/// Gaming platform enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Pc,
    Playstation,
    Xbox,
    Switch,
    Mobile,
    Other,
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pc" | "steam" => Platform::Pc,
            "playstation" | "psn" | "ps4" | "ps5" => Platform::Playstation,
            "xbox" | "xbox_live" => Platform::Xbox,
            "switch" | "nintendo" => Platform::Switch,
            "mobile" | "ios" | "android" => Platform::Mobile,
            _ => Platform::Other,
        }
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Pc => "pc".to_string(),
            Platform::Playstation => "playstation".to_string(),
            Platform::Xbox => "xbox".to_string(),
            Platform::Switch => "switch".to_string(),
            Platform::Mobile => "mobile".to_string(),
            Platform::Other => "other".to_string(),
        }
    }
}

impl Platform {
    /// Human-readable name for UI surfaces
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Pc => "PC",
            Platform::Playstation => "PlayStation",
            Platform::Xbox => "Xbox",
            Platform::Switch => "Nintendo Switch",
            Platform::Mobile => "Mobile",
            Platform::Other => "Other",
        }
    }

    /// Get all known platforms
    pub fn all() -> Vec<Platform> {
        vec![
            Platform::Pc,
            Platform::Playstation,
            Platform::Xbox,
            Platform::Switch,
            Platform::Mobile,
            Platform::Other,
        ]
    }
}

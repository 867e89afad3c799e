use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "gamelink.toml",
    "config/gamelink.toml",
    "crates/config/gamelink.toml",
    "../gamelink.toml",
    "../config/gamelink.toml",
    "../crates/config/gamelink.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
    pub sessions: SessionsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            catalog: CatalogConfig::default(),
            sessions: SessionsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://gamelink.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Configuration options for the external game-catalog search API.
///
/// ```
/// use gamelink_config::CatalogConfig;
///
/// let catalog = CatalogConfig::default();
/// assert_eq!(catalog.base_url, "https://api.rawg.io/api");
/// assert_eq!(catalog.request_timeout_seconds, 15);
/// assert!(catalog.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "CatalogConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "CatalogConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "CatalogConfig::default_page_size")]
    pub page_size: u32,
}

impl CatalogConfig {
    fn default_base_url() -> String {
        "https://api.rawg.io/api".to_string()
    }

    const fn default_request_timeout() -> u64 {
        15
    }

    const fn default_page_size() -> u32 {
        20
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
            page_size: Self::default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    #[serde(default = "SessionsConfig::default_max_participants")]
    pub default_max_participants: u32,
    #[serde(default = "SessionsConfig::default_participant_ceiling")]
    pub participant_ceiling: u32,
}

impl SessionsConfig {
    const fn default_max_participants() -> u32 {
        4
    }

    const fn default_participant_ceiling() -> u32 {
        64
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            default_max_participants: Self::default_max_participants(),
            participant_ceiling: Self::default_participant_ceiling(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use gamelink_config::load;
///
/// std::env::remove_var("GAMELINK_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default("catalog.base_url", defaults.catalog.base_url.clone())
        .unwrap()
        .set_default(
            "catalog.request_timeout_seconds",
            i64::try_from(defaults.catalog.request_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default("catalog.page_size", i64::from(defaults.catalog.page_size))
        .unwrap()
        .set_default(
            "sessions.default_max_participants",
            i64::from(defaults.sessions.default_max_participants),
        )
        .unwrap()
        .set_default(
            "sessions.participant_ceiling",
            i64::from(defaults.sessions.participant_ceiling),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("GAMELINK").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("GAMELINK_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via GAMELINK_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

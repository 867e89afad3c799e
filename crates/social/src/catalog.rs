//! External game-catalog search client.
//!
//! The core only consumes the returned shape; any transport or decode
//! failure is collapsed into the single user-visible "search unavailable"
//! error.

use std::time::Duration;

use gamelink_config::CatalogConfig;
use serde::Deserialize;
use tracing::warn;

use crate::types::{SocialError, SocialResult};

/// One ranked result from the external catalog
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub external_id: i64,
    pub name: String,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub release_date: Option<String>,
    pub rating: Option<f64>,
}

/// Search seam so tests and alternative backends can stand in for the
/// HTTP client.
pub trait CatalogSearch {
    fn search(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = SocialResult<Vec<CatalogEntry>>> + Send;
}

/// HTTP client for a RAWG-style game catalog API
pub struct CatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
}

// Wire shape of the catalog's search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: i64,
    name: String,
    background_image: Option<String>,
    #[serde(default)]
    genres: Vec<Named>,
    #[serde(default)]
    platforms: Vec<PlatformWrapper>,
    released: Option<String>,
    rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlatformWrapper {
    platform: Named,
}

impl From<SearchResult> for CatalogEntry {
    fn from(result: SearchResult) -> Self {
        Self {
            external_id: result.id,
            name: result.name,
            cover_url: result.background_image,
            genres: result.genres.into_iter().map(|g| g.name).collect(),
            platforms: result.platforms.into_iter().map(|p| p.platform.name).collect(),
            release_date: result.released,
            rating: result.rating,
        }
    }
}

impl CatalogClient {
    /// Create a client from configuration
    pub fn new(config: CatalogConfig) -> SocialResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                warn!(error = %e, "failed to build catalog http client");
                SocialError::CatalogUnavailable
            })?;

        Ok(Self { http, config })
    }
}

impl CatalogSearch for CatalogClient {
    /// Search the catalog for games matching a free-text query
    async fn search(&self, query: &str) -> SocialResult<Vec<CatalogEntry>> {
        let url = format!("{}/games", self.config.base_url);

        let mut request = self
            .http
            .get(&url)
            .query(&[("search", query)])
            .query(&[("page_size", self.config.page_size)]);

        if let Some(ref key) = self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, query = query, "catalog search request failed");
            SocialError::CatalogUnavailable
        })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), query = query, "catalog search returned an error status");
            return Err(SocialError::CatalogUnavailable);
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            warn!(error = %e, query = query, "catalog search response did not decode");
            SocialError::CatalogUnavailable
        })?;

        Ok(body.results.into_iter().map(CatalogEntry::from).collect())
    }
}

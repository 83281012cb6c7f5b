//! Wikidata HTTP client
//!
//! Provides the entity search used by the explorer:
//! - `wbsearchentities` for the ranked hit list
//! - `wbgetclaims` (P18) per hit for an image, resolved concurrently
//!
//! Image lookups are best-effort. A failure on one hit leaves that entity
//! without an image and never fails the batch.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client as HttpClient, Url};
use tracing::{debug, info};

use crate::config::WikidataConfig;
use crate::domain::Entity;
use crate::error::{Error, Result};

use super::types::{ClaimsResponse, SearchResponse};
use super::{EntityRepository, IMAGE_PROPERTY, ImageLookup, SEARCH_LIMIT};

const USER_AGENT: &str = concat!("wikilens/", env!("CARGO_PKG_VERSION"));

/// Wikidata entity repository client
#[derive(Clone)]
pub struct WikidataClient {
    http_client: HttpClient,
    config: WikidataConfig,
}

impl std::fmt::Debug for WikidataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikidataClient")
            .field("base_url", &self.config.base_url)
            .field("language", &self.config.language)
            .finish()
    }
}

/// Builder for creating a WikidataClient
#[derive(Default)]
pub struct WikidataClientBuilder {
    config: Option<WikidataConfig>,
    base_url: Option<String>,
    commons_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl WikidataClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Wikidata configuration
    pub fn config(mut self, config: WikidataConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the Wikidata base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the Commons base URL used for image links
    pub fn commons_url(mut self, url: impl Into<String>) -> Self {
        self.commons_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the WikidataClient
    pub fn build(self) -> Result<WikidataClient> {
        let mut config = self.config.unwrap_or_default();
        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(url) = self.commons_url {
            config.commons_url = url;
        }

        let timeout_secs = self.timeout_secs.unwrap_or(config.timeout_secs);
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(WikidataClient {
            http_client,
            config,
        })
    }
}

impl WikidataClient {
    /// Create a new client with the given configuration
    pub fn new(config: WikidataConfig) -> Result<Self> {
        WikidataClientBuilder::new().config(config).build()
    }

    /// Create a new builder for WikidataClient
    pub fn builder() -> WikidataClientBuilder {
        WikidataClientBuilder::new()
    }

    fn api_url(&self) -> String {
        format!("{}/w/api.php", self.config.base_url.trim_end_matches('/'))
    }

    /// Resolve the image of a single entity, mapping any failure to `Absent`
    pub async fn resolve_image(&self, id: &str) -> ImageLookup {
        match self.lookup_image(id).await {
            Ok(Some(url)) => ImageLookup::Resolved(url),
            Ok(None) => ImageLookup::Absent,
            Err(e) => {
                let failure = Error::EnrichmentFailed(id.to_string(), e.to_string());
                debug!(
                    entity = %id,
                    error = %failure,
                    "Image lookup failed, continuing without image"
                );
                ImageLookup::Absent
            }
        }
    }

    async fn lookup_image(&self, id: &str) -> Result<Option<String>> {
        let response = self
            .http_client
            .get(self.api_url())
            .query(&[
                ("action", "wbgetclaims"),
                ("entity", id),
                ("property", IMAGE_PROPERTY),
                ("format", "json"),
                ("origin", "*"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ServiceUnavailable(format!(
                "image lookup returned HTTP {}",
                status
            )));
        }

        let claims: ClaimsResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("claims payload: {}", e)))?;

        claims
            .first_string(IMAGE_PROPERTY)
            .map(|file_name| self.media_url(file_name))
            .transpose()
    }

    /// Fixed-width Commons URL for a media file name
    pub fn media_url(&self, file_name: &str) -> Result<String> {
        let mut url = Url::parse(&format!(
            "{}/wiki/Special:FilePath",
            self.config.commons_url.trim_end_matches('/')
        ))
        .map_err(|e| Error::ConfigError(format!("invalid commons URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| Error::ConfigError("commons URL cannot be a base".to_string()))?
            .push(file_name);
        url.query_pairs_mut()
            .append_pair("width", &self.config.image_width.to_string());

        Ok(url.into())
    }
}

#[async_trait]
impl EntityRepository for WikidataClient {
    async fn search(&self, query: &str) -> Result<Vec<Entity>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("search query must not be empty".to_string()));
        }

        let limit = SEARCH_LIMIT.to_string();
        debug!(query = %query, limit = %limit, "Sending entity search request");

        let response = self
            .http_client
            .get(self.api_url())
            .query(&[
                ("action", "wbsearchentities"),
                ("search", query),
                ("language", self.config.language.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("origin", "*"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ServiceUnavailable(format!(
                "entity search returned HTTP {}",
                status
            )));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("unreadable search payload: {}", e)))?;

        let mut hits = payload.search;
        hits.truncate(SEARCH_LIMIT);

        let lookups = join_all(hits.iter().map(|hit| self.resolve_image(&hit.id))).await;

        let entities: Vec<Entity> = hits
            .into_iter()
            .zip(lookups)
            .map(|(hit, image)| image.apply(hit.into_entity()))
            .collect();

        let with_images = entities.iter().filter(|e| e.has_image()).count();
        info!(
            query = %query,
            results = entities.len(),
            with_images,
            "Entity search completed"
        );

        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WikidataClient {
        WikidataClient::builder()
            .base_url("https://wd.example")
            .commons_url("https://commons.example/")
            .timeout_secs(5)
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_builder_defaults() {
        let client = WikidataClient::new(WikidataConfig::default()).unwrap();
        assert_eq!(client.api_url(), "https://www.wikidata.org/w/api.php");
    }

    #[test]
    fn test_client_debug() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("WikidataClient"));
        assert!(debug.contains("wd.example"));
    }

    #[test]
    fn test_media_url_encodes_file_name() {
        let url = client().media_url("Black hole (artist's impression).jpg").unwrap();
        assert!(url.starts_with("https://commons.example/wiki/Special:FilePath/Black%20hole"));
        assert!(url.ends_with("?width=400"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_client_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WikidataClient>();
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let err = client().search("   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}

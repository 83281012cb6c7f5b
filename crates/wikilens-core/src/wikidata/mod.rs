//! Entity repository - Wikidata action API
//!
//! This module provides:
//! - The `EntityRepository` seam the explorer depends on
//! - `WikidataClient`, the HTTP implementation
//! - Wire types for search and claims responses

mod client;
mod types;

use async_trait::async_trait;

use crate::domain::Entity;
use crate::error::Result;

pub use client::{WikidataClient, WikidataClientBuilder};
pub use types::{ClaimsResponse, SearchHit, SearchResponse};

/// Wikidata property holding an entity's main image
pub const IMAGE_PROPERTY: &str = "P18";

/// Most entities a single search returns
pub const SEARCH_LIMIT: usize = 15;

/// Source of entities for a free-text query
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Search for entities matching `query`, in upstream relevance order
    ///
    /// Fails only when the primary search request fails; per-item enrichment
    /// failures leave the affected entity without an image.
    async fn search(&self, query: &str) -> Result<Vec<Entity>>;
}

/// Outcome of a per-item image lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLookup {
    /// An image URL was found
    Resolved(String),
    /// No image, either because none exists or because the lookup failed
    Absent,
}

impl ImageLookup {
    /// Attach the resolved image (if any) to an entity
    pub fn apply(self, entity: Entity) -> Entity {
        match self {
            Self::Resolved(url) => entity.with_image_url(url),
            Self::Absent => entity,
        }
    }
}

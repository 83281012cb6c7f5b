//! Entity types surfaced to the explorer
//!
//! An `Entity` is a normalized Wikidata record. Entities are built once from a
//! repository search and never mutated; a new search replaces the whole set.

use serde::{Deserialize, Serialize};

/// Source type tag for entities coming from the Wikidata search API
pub const WIKIDATA_ITEM: &str = "Wikidata Item";

/// Placeholder shown when an entity has no description
pub const FALLBACK_DESCRIPTION: &str = "Global Knowledge Entity";

/// A normalized knowledge-base record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Stable external key (e.g. "Q42")
    pub id: String,
    /// Display label
    pub label: String,
    /// Short description (may be empty)
    pub description: String,
    /// Source type tag
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Resolved media URL, absent when the image lookup found nothing or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Relevance score reported by the repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f32>,
    /// Optional (property, value) pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<EntityProperty>>,
}

/// A single (property, value) pair attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProperty {
    pub prop: String,
    pub value: String,
}

impl Entity {
    /// Create a new entity with the Wikidata item type tag
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            entity_type: WIKIDATA_ITEM.to_string(),
            image_url: None,
            relevance: None,
            properties: None,
        }
    }

    /// Set the image URL
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the relevance score
    pub fn with_relevance(mut self, relevance: f32) -> Self {
        self.relevance = Some(relevance);
        self
    }

    /// Set the property list
    pub fn with_properties(mut self, properties: Vec<EntityProperty>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Set the source type tag
    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    /// Description, or a generic placeholder when empty
    pub fn display_description(&self) -> &str {
        if self.description.trim().is_empty() {
            FALLBACK_DESCRIPTION
        } else {
            &self.description
        }
    }

    /// Canonical Wikidata page for this entity
    pub fn wikidata_url(&self) -> String {
        format!("https://www.wikidata.org/wiki/{}", self.id)
    }

    /// Whether an image was resolved for this entity
    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }

    /// Compact `{label, desc}` summary sent to the corpus analysis prompt
    pub fn summary(&self) -> EntitySummary<'_> {
        EntitySummary {
            label: &self.label,
            desc: &self.description,
        }
    }
}

/// Borrowed compact view of an entity for prompt serialization
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntitySummary<'a> {
    pub label: &'a str,
    pub desc: &'a str,
}

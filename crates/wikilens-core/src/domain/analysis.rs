//! AI-produced artefacts: corpus analysis, entity insight, pairwise comparison

use serde::{Deserialize, Serialize};

/// Text shown in place of an insight when the insight request fails
pub const FALLBACK_INSIGHT: &str = "Contextual reasoning failed.";

/// Semantic analysis of a whole search result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorAnalysis {
    pub summary: String,
    pub semantic_clusters: Vec<SemanticCluster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparql_suggestion: Option<String>,
}

/// A named, AI-proposed grouping of entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticCluster {
    pub name: String,
    /// Member entity labels
    pub entities: Vec<String>,
    pub description: String,
}

impl VectorAnalysis {
    /// Labels that appear in at least one cluster
    pub fn clustered_labels(&self) -> impl Iterator<Item = &str> {
        self.semantic_clusters
            .iter()
            .flat_map(|c| c.entities.iter().map(String::as_str))
    }

    /// Name of the first cluster containing `label`, if any
    pub fn cluster_of(&self, label: &str) -> Option<&str> {
        self.semantic_clusters
            .iter()
            .find(|c| c.entities.iter().any(|e| e.eq_ignore_ascii_case(label)))
            .map(|c| c.name.as_str())
    }
}

/// Semantic-bridge commentary for a comparison pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub common_ground: String,
    pub divergence: String,
    /// Qualitative description of conceptual distance
    pub semantic_distance: String,
    /// How one influenced the other, or how they coexist
    pub influence: String,
}

/// A citation returned alongside grounded AI text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
}

/// Web source of a grounding chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

impl GroundingChunk {
    /// Chunk pointing at a web page
    pub fn web(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            web: Some(WebSource {
                uri: uri.into(),
                title: title.into(),
            }),
        }
    }
}

/// Free-text commentary for a single entity plus its citations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInsight {
    pub text: String,
    #[serde(default)]
    pub grounding: Vec<GroundingChunk>,
}

impl EntityInsight {
    pub fn new(text: impl Into<String>, grounding: Vec<GroundingChunk>) -> Self {
        Self {
            text: text.into(),
            grounding,
        }
    }

    /// Degraded insight used when the insight request fails
    pub fn fallback() -> Self {
        Self::new(FALLBACK_INSIGHT, Vec::new())
    }

    /// Web sources among the grounding chunks
    pub fn sources(&self) -> impl Iterator<Item = &WebSource> {
        self.grounding.iter().filter_map(|c| c.web.as_ref())
    }
}

//! Generative-AI insight service
//!
//! This module provides:
//! - The `InsightService` seam the explorer depends on
//! - `GeminiClient`, the HTTP implementation
//! - Prompt builders and wire types

mod client;
pub mod prompts;
mod types;

use async_trait::async_trait;

use crate::domain::{ComparisonResult, Entity, EntityInsight, VectorAnalysis};
use crate::error::Result;

pub use client::{GeminiClient, GeminiClientBuilder};
pub use types::{
    Candidate, Content, ContentRole, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, GroundingMetadata, Part, Tool, comparison_schema, vector_analysis_schema,
};

/// AI commentary over entities
#[async_trait]
pub trait InsightService: Send + Sync {
    /// Summarize and cluster a search result set
    async fn analyze_corpus(&self, query: &str, entities: &[Entity]) -> Result<VectorAnalysis>;

    /// Web-grounded profile of a single entity
    async fn get_insight(&self, entity: &Entity) -> Result<EntityInsight>;

    /// Semantic bridge between two entities
    async fn compare_entities(&self, a: &Entity, b: &Entity) -> Result<ComparisonResult>;
}

//! Domain types shared by the clients, the explorer and the views

mod analysis;
mod entity;

pub use analysis::{
    ComparisonResult, EntityInsight, FALLBACK_INSIGHT, GroundingChunk, SemanticCluster,
    VectorAnalysis, WebSource,
};
pub use entity::{Entity, EntityProperty, EntitySummary, FALLBACK_DESCRIPTION, WIKIDATA_ITEM};

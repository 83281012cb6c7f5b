//! Wikilens Core Library
//!
//! This crate provides the core functionality for Wikilens, including:
//! - Entity search against Wikidata (labels, descriptions, images)
//! - Generative-AI insight (corpus analysis, grounded profiles, comparison)
//! - Explorer state controller with stale-response guards
//! - Force-directed graph and card list views (ratatui)
//! - Configuration and error handling

pub mod config;
pub mod domain;
pub mod error;
pub mod explorer;
pub mod insight;
pub mod visualization;
pub mod wikidata;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::{ComparisonResult, Entity, EntityInsight, VectorAnalysis};
    pub use crate::error::{Error, Result};
    pub use crate::explorer::{Dispatcher, Effect, Explorer, ExplorerState, Outcome};
    pub use crate::insight::{GeminiClient, InsightService};
    pub use crate::wikidata::{EntityRepository, WikidataClient};
}

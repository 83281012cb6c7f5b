//! Effects requested by explorer transitions and the outcomes they produce

use std::sync::Arc;

use tracing::debug;

use crate::domain::{ComparisonResult, Entity, EntityInsight, VectorAnalysis};
use crate::error::Result;
use crate::insight::InsightService;
use crate::wikidata::EntityRepository;

/// Asynchronous work requested by a transition
///
/// Each effect carries the generation that was current when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Search {
        generation: u64,
        query: String,
    },
    Analyze {
        generation: u64,
        query: String,
        entities: Vec<Entity>,
    },
    Insight {
        generation: u64,
        entity: Entity,
    },
    Compare {
        generation: u64,
        selected: Entity,
        comparison: Entity,
    },
}

impl Effect {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Search { generation, .. }
            | Self::Analyze { generation, .. }
            | Self::Insight { generation, .. }
            | Self::Compare { generation, .. } => *generation,
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::Analyze { .. } => "analyze",
            Self::Insight { .. } => "insight",
            Self::Compare { .. } => "compare",
        }
    }
}

/// Result of running an effect, fed back through `Explorer::apply`
#[derive(Debug)]
pub enum Outcome {
    Searched {
        generation: u64,
        result: Result<Vec<Entity>>,
    },
    Analyzed {
        generation: u64,
        result: Result<VectorAnalysis>,
    },
    InsightReady {
        generation: u64,
        result: Result<EntityInsight>,
    },
    Compared {
        generation: u64,
        result: Result<ComparisonResult>,
    },
}

impl Outcome {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Searched { generation, .. }
            | Self::Analyzed { generation, .. }
            | Self::InsightReady { generation, .. }
            | Self::Compared { generation, .. } => *generation,
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Searched { .. } => "search",
            Self::Analyzed { .. } => "analyze",
            Self::InsightReady { .. } => "insight",
            Self::Compared { .. } => "compare",
        }
    }
}

/// Runs effects against the injected clients
pub struct Dispatcher<R: ?Sized, I: ?Sized> {
    repository: Arc<R>,
    insight: Arc<I>,
}

impl<R: ?Sized, I: ?Sized> Clone for Dispatcher<R, I> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            insight: Arc::clone(&self.insight),
        }
    }
}

impl<R, I> Dispatcher<R, I>
where
    R: EntityRepository + ?Sized,
    I: InsightService + ?Sized,
{
    pub fn new(repository: Arc<R>, insight: Arc<I>) -> Self {
        Self {
            repository,
            insight,
        }
    }

    /// Run one effect to completion
    pub async fn run(&self, effect: Effect) -> Outcome {
        debug!(kind = effect.kind(), generation = effect.generation(), "Running effect");

        match effect {
            Effect::Search { generation, query } => Outcome::Searched {
                generation,
                result: self.repository.search(&query).await,
            },
            Effect::Analyze {
                generation,
                query,
                entities,
            } => Outcome::Analyzed {
                generation,
                result: self.insight.analyze_corpus(&query, &entities).await,
            },
            Effect::Insight { generation, entity } => Outcome::InsightReady {
                generation,
                result: self.insight.get_insight(&entity).await,
            },
            Effect::Compare {
                generation,
                selected,
                comparison,
            } => Outcome::Compared {
                generation,
                result: self.insight.compare_entities(&selected, &comparison).await,
            },
        }
    }
}

//! Explorer controller: state transitions and outcome application

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::domain::{Entity, EntityInsight};
use crate::insight::InsightService;
use crate::wikidata::EntityRepository;

use super::effect::{Dispatcher, Effect, Outcome};
use super::state::{ANALYSIS_ERROR, ExplorerState, SEARCH_ERROR};

/// Monotonic request generations, one per kind of in-flight work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generations {
    pub search: u64,
    pub insight: u64,
    pub comparison: u64,
}

/// Owns the explorer state and validates every transition
///
/// Transitions are synchronous and return the effects to run. The caller runs
/// them (see `Dispatcher`) and hands the outcomes back to `apply`; outcomes
/// from a superseded generation are dropped.
pub struct Explorer<R: ?Sized, I: ?Sized> {
    state: ExplorerState,
    generations: Generations,
    dispatcher: Dispatcher<R, I>,
}

impl<R, I> Explorer<R, I>
where
    R: EntityRepository + ?Sized,
    I: InsightService + ?Sized,
{
    pub fn new(repository: Arc<R>, insight: Arc<I>) -> Self {
        Self {
            state: ExplorerState::default(),
            generations: Generations::default(),
            dispatcher: Dispatcher::new(repository, insight),
        }
    }

    pub fn state(&self) -> &ExplorerState {
        &self.state
    }

    pub fn generations(&self) -> Generations {
        self.generations
    }

    /// A dispatcher sharing this explorer's clients
    pub fn dispatcher(&self) -> Dispatcher<R, I> {
        self.dispatcher.clone()
    }

    /// Start a new search, superseding all in-flight work
    ///
    /// A blank query changes nothing and requests nothing.
    pub fn submit_search(&mut self, query: &str) -> Vec<Effect> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        self.generations.search += 1;
        self.generations.insight += 1;
        self.generations.comparison += 1;

        self.state.query = query.to_string();
        self.state.loading = true;
        self.state.error = None;
        self.state.clear_results();

        debug!(query = %query, generation = self.generations.search, "Search submitted");
        vec![Effect::Search {
            generation: self.generations.search,
            query: query.to_string(),
        }]
    }

    /// Select an entity and request its insight
    ///
    /// The comparison pair changes with the selection, so any comparison
    /// result is dropped and recomputed when a distinct comparison entity exists.
    pub fn select_entity(&mut self, entity: Entity) -> Vec<Effect> {
        self.generations.insight += 1;
        self.generations.comparison += 1;

        self.state.insight = None;
        self.state.comparison_result = None;
        self.state.selected_entity = Some(entity.clone());

        let mut effects = vec![Effect::Insight {
            generation: self.generations.insight,
            entity: entity.clone(),
        }];

        if let Some(comparison) = self
            .state
            .comparison_entity
            .as_ref()
            .filter(|c| c.id != entity.id)
        {
            effects.push(Effect::Compare {
                generation: self.generations.comparison,
                selected: entity,
                comparison: comparison.clone(),
            });
        }

        effects
    }

    /// Mark or unmark an entity for comparison
    pub fn toggle_comparison(&mut self, entity: Entity) -> Vec<Effect> {
        self.generations.comparison += 1;
        self.state.comparison_result = None;

        if self.state.is_compared(&entity.id) {
            self.state.comparison_entity = None;
            return Vec::new();
        }

        self.state.comparison_entity = Some(entity.clone());

        match self.state.selected_entity.as_ref() {
            Some(selected) if selected.id != entity.id => vec![Effect::Compare {
                generation: self.generations.comparison,
                selected: selected.clone(),
                comparison: entity,
            }],
            _ => Vec::new(),
        }
    }

    /// Drop the result set along with selection, insight and comparison
    pub fn clear_results(&mut self) {
        self.generations.search += 1;
        self.generations.insight += 1;
        self.generations.comparison += 1;

        self.state.loading = false;
        self.state.error = None;
        self.state.clear_results();
    }

    /// Fold an outcome into the state, returning any follow-up effects
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        if self.is_stale(&outcome) {
            debug!(
                kind = outcome.kind(),
                generation = outcome.generation(),
                "Dropping stale outcome"
            );
            return Vec::new();
        }

        match outcome {
            Outcome::Searched { result, .. } => match result {
                Ok(entities) => {
                    info!(
                        query = %self.state.query,
                        results = entities.len(),
                        "Search results received"
                    );
                    self.state.entities = entities;
                    if self.state.entities.is_empty() {
                        self.state.loading = false;
                        Vec::new()
                    } else {
                        vec![Effect::Analyze {
                            generation: self.generations.search,
                            query: self.state.query.clone(),
                            entities: self.state.entities.clone(),
                        }]
                    }
                }
                Err(e) => {
                    warn!(query = %self.state.query, error = %e, code = e.code(), "Search failed");
                    self.state.entities.clear();
                    self.state.error = Some(SEARCH_ERROR.to_string());
                    self.state.loading = false;
                    Vec::new()
                }
            },
            Outcome::Analyzed { result, .. } => {
                match result {
                    Ok(analysis) => self.state.analysis = Some(analysis),
                    Err(e) => {
                        warn!(error = %e, code = e.code(), "Corpus analysis failed");
                        self.state.error = Some(ANALYSIS_ERROR.to_string());
                    }
                }
                self.state.loading = false;
                Vec::new()
            }
            Outcome::InsightReady { result, .. } => {
                self.state.insight = Some(result.unwrap_or_else(|e| {
                    warn!(error = %e, code = e.code(), "Entity insight failed, using fallback");
                    EntityInsight::fallback()
                }));
                Vec::new()
            }
            Outcome::Compared { result, .. } => {
                match result {
                    Ok(comparison) => self.state.comparison_result = Some(comparison),
                    Err(e) => warn!(error = %e, code = e.code(), "Entity comparison failed"),
                }
                Vec::new()
            }
        }
    }

    /// Run effects and every follow-up effect until none remain
    pub async fn settle(&mut self, effects: Vec<Effect>) {
        let dispatcher = self.dispatcher();
        let mut pending = effects;

        while !pending.is_empty() {
            let outcomes = join_all(pending.into_iter().map(|e| dispatcher.run(e))).await;
            pending = outcomes
                .into_iter()
                .flat_map(|outcome| self.apply(outcome))
                .collect();
        }
    }

    fn is_stale(&self, outcome: &Outcome) -> bool {
        let current = match outcome {
            Outcome::Searched { .. } | Outcome::Analyzed { .. } => self.generations.search,
            Outcome::InsightReady { .. } => self.generations.insight,
            Outcome::Compared { .. } => self.generations.comparison,
        };
        outcome.generation() != current
    }
}

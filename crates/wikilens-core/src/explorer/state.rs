//! The explorer state record

use serde::Serialize;

use crate::domain::{ComparisonResult, Entity, EntityInsight, VectorAnalysis};

/// Banner shown when the primary search fails
pub const SEARCH_ERROR: &str = "Search service unavailable. Please check your connectivity.";

/// Banner shown when corpus analysis fails but results are available
pub const ANALYSIS_ERROR: &str =
    "Semantic analysis unavailable. Results are shown without clustering.";

/// Everything the views render
///
/// Mutated only by `Explorer` transitions and outcome application.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExplorerState {
    /// Last submitted (trimmed) query
    pub query: String,
    /// A search or its corpus analysis is in flight
    pub loading: bool,
    /// Current result set, in repository order
    pub entities: Vec<Entity>,
    pub selected_entity: Option<Entity>,
    pub comparison_entity: Option<Entity>,
    /// Insight for `selected_entity`
    pub insight: Option<EntityInsight>,
    /// Comparison for the current (selected, comparison) pair
    pub comparison_result: Option<ComparisonResult>,
    pub analysis: Option<VectorAnalysis>,
    /// User-visible error banner
    pub error: Option<String>,
}

impl ExplorerState {
    /// Whether `id` is the selected entity
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_entity.as_ref().is_some_and(|e| e.id == id)
    }

    /// Whether `id` is the comparison entity
    pub fn is_compared(&self, id: &str) -> bool {
        self.comparison_entity.as_ref().is_some_and(|e| e.id == id)
    }

    /// Whether a result set is on screen
    pub fn has_results(&self) -> bool {
        !self.entities.is_empty()
    }

    /// Whether an insight request for the selection is pending
    pub fn insight_pending(&self) -> bool {
        self.selected_entity.is_some() && self.insight.is_none()
    }

    /// Whether a comparison request for the current pair is pending
    pub fn comparison_pending(&self) -> bool {
        match (&self.selected_entity, &self.comparison_entity) {
            (Some(a), Some(b)) => a.id != b.id && self.comparison_result.is_none(),
            _ => false,
        }
    }

    pub(crate) fn clear_results(&mut self) {
        self.entities.clear();
        self.analysis = None;
        self.clear_selection();
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected_entity = None;
        self.comparison_entity = None;
        self.insight = None;
        self.comparison_result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state = ExplorerState::default();
        assert!(!state.loading);
        assert!(!state.has_results());
        assert!(!state.insight_pending());
        assert!(!state.comparison_pending());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_pending_flags() {
        let mut state = ExplorerState {
            selected_entity: Some(Entity::new("Q1", "Universe", "")),
            ..ExplorerState::default()
        };
        assert!(state.insight_pending());
        assert!(!state.comparison_pending());

        state.comparison_entity = Some(Entity::new("Q2", "Earth", ""));
        assert!(state.comparison_pending());

        state.comparison_entity = Some(Entity::new("Q1", "Universe", ""));
        assert!(!state.comparison_pending());
    }

    #[test]
    fn test_membership_checks_by_id() {
        let state = ExplorerState {
            selected_entity: Some(Entity::new("Q1", "Universe", "")),
            comparison_entity: Some(Entity::new("Q2", "Earth", "")),
            ..ExplorerState::default()
        };
        assert!(state.is_selected("Q1"));
        assert!(!state.is_selected("Q2"));
        assert!(state.is_compared("Q2"));
    }
}

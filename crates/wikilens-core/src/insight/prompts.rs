//! Prompt construction for the three insight operations

use crate::domain::{Entity, EntitySummary};
use crate::error::{Error, Result};

/// Prompt for the semantic analysis of a search result set
pub fn corpus_analysis(query: &str, entities: &[Entity]) -> Result<String> {
    let summaries: Vec<EntitySummary<'_>> = entities.iter().map(Entity::summary).collect();
    let results = serde_json::to_string(&summaries)
        .map_err(|e| Error::Other(format!("Failed to serialize entity summaries: {}", e)))?;

    Ok(format!(
        "Perform a semantic vector analysis of a knowledge-graph search.\n\
         Query: \"{query}\"\n\
         Results: {results}\n\
         \n\
         Tasks:\n\
         1. Explain the deeper semantic connections between these items.\n\
         2. Group them into distinct logical clusters, naming each cluster and listing its member labels.\n\
         3. Suggest a SPARQL query for the Wikidata Query Service that finds similar entities \
         through the shared properties identified here."
    ))
}

/// Prompt for a grounded single-entity profile
pub fn entity_insight(entity: &Entity) -> String {
    format!(
        "Write an advanced semantic profile of the entity \"{}\" ({}).\n\
         Cover its ontological role and its most significant neighbours in the global knowledge graph.\n\
         Use web search to include recent context or news.",
        entity.label,
        entity.display_description()
    )
}

/// Prompt for the semantic bridge between two entities
pub fn comparison(a: &Entity, b: &Entity) -> String {
    format!(
        "Analyze the semantic bridge between these two Wikidata entities:\n\
         Entity A: {} ({})\n\
         Entity B: {} ({})\n\
         \n\
         Determine the semantic space they share and where they diverge in the knowledge graph.",
        a.label,
        a.display_description(),
        b.label,
        b.display_description()
    )
}

//! Wire types for the Wikidata action API
//!
//! Only the fields the explorer reads are modelled; everything else in the
//! responses is ignored by serde.

use serde::Deserialize;

use crate::domain::Entity;

/// Response of `action=wbsearchentities`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

/// A single raw search hit
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display: Option<Display>,
}

/// Language-resolved display terms
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Display {
    #[serde(default)]
    pub label: Option<Term>,
    #[serde(default)]
    pub description: Option<Term>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Term {
    pub value: String,
}

impl SearchHit {
    /// Display label, falling back to the raw label and finally the id
    pub fn resolved_label(&self) -> String {
        self.display
            .as_ref()
            .and_then(|d| d.label.as_ref())
            .map(|t| t.value.clone())
            .or_else(|| self.label.clone())
            .unwrap_or_else(|| self.id.clone())
    }

    /// Display description, falling back to the raw description
    pub fn resolved_description(&self) -> String {
        self.display
            .as_ref()
            .and_then(|d| d.description.as_ref())
            .map(|t| t.value.clone())
            .or_else(|| self.description.clone())
            .unwrap_or_default()
    }

    /// Normalize into an entity without an image
    pub fn into_entity(self) -> Entity {
        let label = self.resolved_label();
        let description = self.resolved_description();
        Entity::new(self.id, label, description).with_relevance(1.0)
    }
}

/// Response of `action=wbgetclaims`
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimsResponse {
    #[serde(default)]
    pub claims: std::collections::HashMap<String, Vec<Claim>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Claim {
    pub mainsnak: Snak,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snak {
    #[serde(default)]
    pub datavalue: Option<DataValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataValue {
    pub value: serde_json::Value,
}

impl ClaimsResponse {
    /// First string value recorded for `property`
    pub fn first_string(&self, property: &str) -> Option<&str> {
        self.claims
            .get(property)?
            .first()?
            .mainsnak
            .datavalue
            .as_ref()?
            .value
            .as_str()
    }
}

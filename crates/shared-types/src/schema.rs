//! Jurisdiction legal schemas
//!
//! A schema lists the clauses a compliant lease should contain in a given
//! jurisdiction. Clause order is the order they are presented to the model.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalSchema {
    /// Governing legal framework, injected verbatim into prompts
    pub law_summary: String,
    pub required_clauses: Vec<RequiredClause>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredClause {
    pub title: String,
    pub legal_basis: String,
    /// Textual cues the model is asked to watch for
    pub risk_indicators: Vec<String>,
    pub drafting_hints: String,
}

/// Invariant violations of a [`LegalSchema`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema has no required clauses")]
    EmptyClauses,

    #[error("duplicate required clause title: {0}")]
    DuplicateTitle(String),
}

impl LegalSchema {
    /// Check that the schema is non-empty and clause titles are unique
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.required_clauses.is_empty() {
            return Err(SchemaError::EmptyClauses);
        }

        let mut seen = HashSet::new();
        for clause in &self.required_clauses {
            if !seen.insert(clause.title.as_str()) {
                return Err(SchemaError::DuplicateTitle(clause.title.clone()));
            }
        }

        Ok(())
    }

    pub fn clause_titles(&self) -> Vec<&str> {
        self.required_clauses
            .iter()
            .map(|c| c.title.as_str())
            .collect()
    }
}

//! Query context classification: configured keyword patterns decide the
//! query type and which tables a query suggests or rules out.

mod analyzer;

pub use analyzer::QueryAnalyzer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Query type reported when no configured pattern matches.
pub const GENERIC_QUERY_TYPE: &str = "generic";

/// Keyword rule mapping a kind of question to tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPattern {
    pub pattern_id: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub required_tables: Vec<String>,
    #[serde(default)]
    pub optional_tables: Vec<String>,
    #[serde(default)]
    pub excluded_tables: Vec<String>,
    /// Added to the keyword match ratio, result capped at 1.0.
    #[serde(default)]
    pub confidence_boost: f32,
}

/// Per-table keyword rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePattern {
    pub table_name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub exclusion_patterns: Vec<String>,
}

/// Per-query classification result. Built fresh for every query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryContext {
    pub query_type: String,
    /// Score of the winning pattern, 0.0 - 1.0.
    pub confidence: f32,
    pub suggested_tables: BTreeSet<String>,
    pub excluded_tables: BTreeSet<String>,
    pub keywords: Vec<String>,
}

impl QueryContext {
    /// Context that suggests and excludes nothing.
    pub fn generic(keywords: Vec<String>) -> Self {
        Self {
            query_type: GENERIC_QUERY_TYPE.to_string(),
            confidence: 0.0,
            suggested_tables: BTreeSet::new(),
            excluded_tables: BTreeSet::new(),
            keywords,
        }
    }

    pub fn is_generic(&self) -> bool {
        self.query_type == GENERIC_QUERY_TYPE
    }
}

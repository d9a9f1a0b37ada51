//! Semantic search hits handed over by the external schema search service.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::confidence::normalize_score;
use crate::error::{Result, SchemaContextError};

/// One semantic-search match against a table or one of its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub table: String,
    /// Absent for table-level hits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Unnormalized similarity; any sign, missing or null reads as 0.
    #[serde(rename = "score", default, deserialize_with = "score_or_zero")]
    pub raw_score: f32,
    /// Matched source text, kept for diagnostics.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

fn score_or_zero<'de, D>(deserializer: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl SearchHit {
    /// Table-level hit.
    pub fn table(table: impl Into<String>, raw_score: f32) -> Self {
        Self {
            table: table.into(),
            column: None,
            raw_score,
            text: String::new(),
        }
    }

    /// Column-level hit.
    pub fn column(table: impl Into<String>, column: impl Into<String>, raw_score: f32) -> Self {
        Self {
            table: table.into(),
            column: Some(column.into()),
            raw_score,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Normalized 0-100 confidence of this hit.
    pub fn confidence(&self) -> f32 {
        normalize_score(self.raw_score)
    }

    /// `table.column` key for column hits.
    pub fn qualified_name(&self) -> Option<String> {
        self.column
            .as_ref()
            .map(|column| format!("{}.{}", self.table, column))
    }
}

/// Both hit lists returned for a single query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticResults {
    #[serde(default)]
    pub tables: Vec<SearchHit>,
    #[serde(default)]
    pub columns: Vec<SearchHit>,
}

impl SemanticResults {
    pub fn new(tables: Vec<SearchHit>, columns: Vec<SearchHit>) -> Self {
        Self { tables, columns }
    }

    /// Parse `{"tables": [...], "columns": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SchemaContextError::Parse(format!("Invalid search results JSON: {}", e)))
    }

    /// Load a search results JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.columns.is_empty()
    }

    /// Column hits followed by table hits.
    pub fn all_hits(&self) -> impl Iterator<Item = &SearchHit> {
        self.columns.iter().chain(self.tables.iter())
    }
}

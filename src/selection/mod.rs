//! Table and column selection over semantic-search hits.
//!
//! `SchemaSelector` holds the immutable per-process pieces (selection knobs,
//! query analyzer, shared relationship graph). Every call builds fresh
//! results, so one selector can serve concurrent queries.

mod columns;
mod tables;

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::analysis::QueryAnalyzer;
use crate::config::{Config, SelectionConfig};
use crate::error::Result;
use crate::graph::RelationshipGraph;
use crate::search::SemanticResults;

/// Confidence boost, in points, for tables the query context suggests.
pub const SUGGESTED_TABLE_BOOST: f32 = 10.0;

/// Outcome of table selection for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSelectionResult {
    /// Initial selection by confidence, followed by bridge tables.
    pub selected_tables: Vec<String>,
    /// 0-100 confidence for each selected table.
    pub confidence_scores: BTreeMap<String, f32>,
    /// Directly related pairs among the selected tables.
    pub relationships: Vec<(String, String)>,
    /// Tables the query context ruled out.
    pub excluded_tables: Vec<String>,
    pub reasoning: String,
    /// Tables added only to connect the selection.
    pub bridge_tables_added: Vec<String>,
}

impl TableSelectionResult {
    /// "No relevant schema found" outcome.
    pub fn is_empty(&self) -> bool {
        self.selected_tables.is_empty()
    }
}

/// A column accepted into the context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedColumn {
    pub table: String,
    pub column: String,
    pub confidence: f32,
}

impl SelectedColumn {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

/// Outcome of column selection for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSelectionResult {
    /// Highest confidence first.
    pub selected_columns: Vec<SelectedColumn>,
    /// `table.column` to 0-100 confidence.
    pub confidence_scores: BTreeMap<String, f32>,
    /// Number of selected columns per table.
    pub table_distribution: BTreeMap<String, usize>,
    pub reasoning: String,
}

/// Table and column selections produced together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaContext {
    pub tables: TableSelectionResult,
    pub columns: ColumnSelectionResult,
}

/// Selects a small, join-connected schema context for a query.
#[derive(Debug, Clone)]
pub struct SchemaSelector {
    config: SelectionConfig,
    analyzer: QueryAnalyzer,
    graph: Arc<RelationshipGraph>,
}

impl SchemaSelector {
    pub fn new(config: SelectionConfig, analyzer: QueryAnalyzer, graph: Arc<RelationshipGraph>) -> Self {
        Self {
            config,
            analyzer,
            graph,
        }
    }

    /// Build a selector from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.selection.clone(),
            config.query_analyzer(),
            Arc::new(config.relationship_graph()?),
        ))
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &QueryAnalyzer {
        &self.analyzer
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    /// Run table selection with the configured table budget, then column
    /// selection over the chosen tables.
    pub fn select_context(
        &self,
        query: &str,
        results: &SemanticResults,
        available_tables: Option<&HashSet<String>>,
    ) -> SchemaContext {
        let tables = self.select_tables(
            query,
            results,
            available_tables,
            self.config.max_tables_per_query,
        );
        let columns = self.select_columns(query, results, &tables.selected_tables);
        SchemaContext { tables, columns }
    }
}

/// Descending by confidence; equal scores keep their incoming order.
fn sort_by_confidence_desc<T>(items: &mut [T], confidence: impl Fn(&T) -> f32) {
    items.sort_by(|a, b| {
        confidence(b)
            .partial_cmp(&confidence(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

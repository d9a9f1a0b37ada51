//! Table selection pipeline: best confidence per table, threshold, context
//! filtering, budget truncation, then bridge completion over the graph.

use std::collections::{BTreeMap, HashSet};

use super::{sort_by_confidence_desc, SchemaSelector, TableSelectionResult, SUGGESTED_TABLE_BOOST};
use crate::analysis::QueryContext;
use crate::confidence::MAX_CONFIDENCE;
use crate::search::SemanticResults;

/// A table with its current 0-100 confidence.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredTable {
    pub name: String,
    pub confidence: f32,
}

/// Table list after relationship completion.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Completion {
    pub tables: Vec<String>,
    pub bridges: Vec<String>,
}

impl SchemaSelector {
    /// Select the tables a query needs.
    ///
    /// `max_tables` bounds the initial, confidence-ranked selection. Bridge
    /// tables required to join that selection are appended afterwards, so
    /// the returned list may be longer than `max_tables`.
    pub fn select_tables(
        &self,
        query: &str,
        results: &SemanticResults,
        available_tables: Option<&HashSet<String>>,
        max_tables: usize,
    ) -> TableSelectionResult {
        let context = self.analyzer.analyze(query);

        if results.is_empty() {
            log::debug!("No semantic search results for query '{}'", query);
            return TableSelectionResult {
                selected_tables: Vec::new(),
                confidence_scores: BTreeMap::new(),
                relationships: Vec::new(),
                excluded_tables: context.excluded_tables.iter().cloned().collect(),
                reasoning: format!(
                    "Query Type: {} | Semantic Search Found: 0 tables | No relevant schema found",
                    context.query_type
                ),
                bridge_tables_added: Vec::new(),
            };
        }

        let floor = self.config.confidence_floor();
        let semantic_tables = best_table_confidences(results);
        let confident_tables = filter_by_confidence(&semantic_tables, floor);

        let mut filtered_tables = if self.config.enable_context_filtering {
            apply_context_filtering(&confident_tables, &context, available_tables, floor)
        } else {
            confident_tables.clone()
        };
        sort_by_confidence_desc(&mut filtered_tables, |table| table.confidence);

        let initial = &filtered_tables[..filtered_tables.len().min(max_tables)];
        let initial_tables: Vec<String> = initial.iter().map(|table| table.name.clone()).collect();

        let completion = self.complete_relationships(&initial_tables, &context, available_tables);

        // Bridges sit at the floor even when they had a hit of their own
        // that was cut by the table budget.
        let mut confidence_scores: BTreeMap<String, f32> = initial
            .iter()
            .map(|table| (table.name.clone(), table.confidence))
            .collect();
        for bridge in &completion.bridges {
            confidence_scores.insert(bridge.clone(), floor);
        }

        let relationships = self.direct_relationships(&completion.tables);

        let reasoning = table_selection_reasoning(
            &context,
            &semantic_tables,
            &confident_tables,
            &filtered_tables,
            &initial_tables,
            &completion,
        );
        log::debug!("Table selection: {}", reasoning);

        TableSelectionResult {
            selected_tables: completion.tables,
            confidence_scores,
            relationships,
            excluded_tables: context.excluded_tables.iter().cloned().collect(),
            reasoning,
            bridge_tables_added: completion.bridges,
        }
    }

    /// Add the interior tables of the shortest path between every pair of
    /// selected tables.
    ///
    /// Pairs are visited in selection order and bridges are appended in the
    /// order they are discovered. When several shortest paths exist the
    /// first one found by the traversal is used. With context filtering on,
    /// a path is only usable if none of its interior tables is excluded or
    /// unavailable; the shortest usable path within the hop limit is taken,
    /// and a pair with no usable path gets no bridges at all.
    pub(crate) fn complete_relationships(
        &self,
        selected: &[String],
        context: &QueryContext,
        available_tables: Option<&HashSet<String>>,
    ) -> Completion {
        let mut completion = Completion {
            tables: selected.to_vec(),
            bridges: Vec::new(),
        };

        if !self.config.enable_relationship_completion || selected.len() < 2 {
            return completion;
        }

        for (i, table_a) in selected.iter().enumerate() {
            for table_b in &selected[i + 1..] {
                let paths = self
                    .graph
                    .find_paths(table_a, table_b, self.config.max_path_depth);
                if paths.is_empty() {
                    continue;
                }

                let Some(path) = paths
                    .into_iter()
                    .find(|path| self.is_bridge_path_allowed(path, context, available_tables))
                else {
                    log::debug!(
                        "No bridge path between {} and {}: every path crosses a table filtered by query context",
                        table_a,
                        table_b
                    );
                    continue;
                };

                if path.len() < 3 {
                    continue;
                }
                for bridge in &path[1..path.len() - 1] {
                    if completion.tables.contains(bridge) {
                        continue;
                    }
                    log::debug!(
                        "Adding bridge table '{}' to connect {} -> {}",
                        bridge,
                        table_a,
                        table_b
                    );
                    completion.tables.push(bridge.clone());
                    completion.bridges.push(bridge.clone());
                }
            }
        }

        completion
    }

    fn is_bridge_path_allowed(
        &self,
        path: &[String],
        context: &QueryContext,
        available_tables: Option<&HashSet<String>>,
    ) -> bool {
        if !self.config.enable_context_filtering || path.len() < 3 {
            return true;
        }
        path[1..path.len() - 1]
            .iter()
            .all(|table| is_context_allowed(table, context, available_tables))
    }

    /// Pairs of selected tables that share a direct edge, in selection order.
    pub(crate) fn direct_relationships(&self, tables: &[String]) -> Vec<(String, String)> {
        let mut relationships = Vec::new();
        for (i, table_a) in tables.iter().enumerate() {
            for table_b in &tables[i + 1..] {
                if self.graph.is_adjacent(table_a, table_b) {
                    relationships.push((table_a.clone(), table_b.clone()));
                }
            }
        }
        relationships
    }
}

/// Best confidence per table over column hits then table hits, in first-seen
/// order. One strong column match is enough to surface its table.
pub(crate) fn best_table_confidences(results: &SemanticResults) -> Vec<ScoredTable> {
    let mut tables: Vec<ScoredTable> = Vec::new();

    for hit in results.all_hits() {
        if hit.table.is_empty() {
            continue;
        }
        let confidence = hit.confidence();
        match tables.iter_mut().find(|table| table.name == hit.table) {
            Some(existing) => existing.confidence = existing.confidence.max(confidence),
            None => tables.push(ScoredTable {
                name: hit.table.clone(),
                confidence,
            }),
        }
    }

    tables
}

pub(crate) fn filter_by_confidence(tables: &[ScoredTable], floor: f32) -> Vec<ScoredTable> {
    tables
        .iter()
        .filter(|table| table.confidence >= floor)
        .cloned()
        .collect()
}

/// Drop excluded or unavailable tables, boost suggested ones, and add
/// suggested tables missing from the confident set at the floor confidence.
pub(crate) fn apply_context_filtering(
    tables: &[ScoredTable],
    context: &QueryContext,
    available_tables: Option<&HashSet<String>>,
    floor: f32,
) -> Vec<ScoredTable> {
    let mut filtered = Vec::with_capacity(tables.len());

    for table in tables {
        if context.excluded_tables.contains(&table.name) {
            log::debug!("Excluding table {} based on query context", table.name);
            continue;
        }
        if !is_available(&table.name, available_tables) {
            log::debug!("Excluding table {} - not available in schema", table.name);
            continue;
        }

        let mut confidence = table.confidence;
        if context.suggested_tables.contains(&table.name) {
            confidence = (confidence + SUGGESTED_TABLE_BOOST).min(MAX_CONFIDENCE);
            log::debug!("Boosting confidence for suggested table {}", table.name);
        }
        filtered.push(ScoredTable {
            name: table.name.clone(),
            confidence,
        });
    }

    for suggested in &context.suggested_tables {
        if filtered.iter().any(|table| &table.name == suggested)
            || !is_context_allowed(suggested, context, available_tables)
        {
            continue;
        }
        log::debug!("Adding suggested table {} from query context", suggested);
        filtered.push(ScoredTable {
            name: suggested.clone(),
            confidence: floor,
        });
    }

    filtered
}

fn is_available(table: &str, available_tables: Option<&HashSet<String>>) -> bool {
    available_tables.map_or(true, |available| available.contains(table))
}

fn is_context_allowed(
    table: &str,
    context: &QueryContext,
    available_tables: Option<&HashSet<String>>,
) -> bool {
    !context.excluded_tables.contains(table) && is_available(table, available_tables)
}

fn table_selection_reasoning(
    context: &QueryContext,
    semantic_tables: &[ScoredTable],
    confident_tables: &[ScoredTable],
    filtered_tables: &[ScoredTable],
    initial_tables: &[String],
    completion: &Completion,
) -> String {
    let mut parts = vec![
        format!("Query Type: {}", context.query_type),
        format!("Semantic Search Found: {} tables", semantic_tables.len()),
        format!("After Confidence Filtering: {} tables", confident_tables.len()),
        format!("After Context Filtering: {} tables", filtered_tables.len()),
        format!("Context Suggested: {} tables", context.suggested_tables.len()),
        format!("Context Excluded: {} tables", context.excluded_tables.len()),
        format!("Initial Selection: {:?}", initial_tables),
        format!("Completed Selection: {:?}", completion.tables),
    ];

    if !context.excluded_tables.is_empty() {
        parts.push(format!("Excluded Tables: {:?}", context.excluded_tables));
    }
    if !completion.bridges.is_empty() {
        parts.push(format!("Bridge Tables Added: {:?}", completion.bridges));
    }

    parts.join(" | ")
}

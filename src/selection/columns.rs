//! Column selection: confidence floor, selected-table filter, per-table cap.

use std::collections::BTreeMap;

use super::{sort_by_confidence_desc, ColumnSelectionResult, SchemaSelector, SelectedColumn};
use crate::search::SemanticResults;

impl SchemaSelector {
    /// Pick the column hits to show for the selected tables.
    ///
    /// Columns are taken highest confidence first; a column is skipped once
    /// its table already holds `max_columns_per_table` columns, so no table
    /// can crowd out the others.
    pub fn select_columns(
        &self,
        query: &str,
        results: &SemanticResults,
        selected_tables: &[String],
    ) -> ColumnSelectionResult {
        let floor = self.config.confidence_floor();
        let cap = self.config.max_columns_per_table;

        let confident: Vec<SelectedColumn> = results
            .columns
            .iter()
            .filter_map(|hit| {
                let column = hit.column.as_ref()?;
                if hit.table.is_empty() || column.is_empty() {
                    return None;
                }
                Some(SelectedColumn {
                    table: hit.table.clone(),
                    column: column.clone(),
                    confidence: hit.confidence(),
                })
            })
            .filter(|column| column.confidence >= floor)
            .collect();
        let confident_count = confident.len();

        let mut relevant: Vec<SelectedColumn> = confident
            .into_iter()
            .filter(|column| selected_tables.contains(&column.table))
            .collect();
        let relevant_count = relevant.len();
        sort_by_confidence_desc(&mut relevant, |column| column.confidence);

        let mut table_distribution: BTreeMap<String, usize> = BTreeMap::new();
        let mut selected_columns = Vec::new();
        for column in relevant {
            let count = table_distribution.entry(column.table.clone()).or_insert(0);
            if *count >= cap {
                continue;
            }
            *count += 1;
            selected_columns.push(column);
        }
        table_distribution.retain(|_, count| *count > 0);

        let confidence_scores = selected_columns
            .iter()
            .map(|column| (column.qualified_name(), column.confidence))
            .collect();

        let reasoning = [
            format!("Total Columns Found: {}", results.columns.len()),
            format!("High Confidence Columns: {}", confident_count),
            format!("In Selected Tables: {}", relevant_count),
            format!("Selected Columns: {}", selected_columns.len()),
            format!("Selected Tables: {:?}", selected_tables),
            format!("Max Columns Per Table: {}", cap),
        ]
        .join(" | ");
        log::debug!("Column selection for '{}': {}", query, reasoning);

        ColumnSelectionResult {
            selected_columns,
            confidence_scores,
            table_distribution,
            reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QueryAnalyzer;
    use crate::config::SelectionConfig;
    use crate::graph::RelationshipGraph;
    use crate::search::SearchHit;
    use std::sync::Arc;

    fn selector(threshold: f32, cap: usize) -> SchemaSelector {
        SchemaSelector::new(
            SelectionConfig {
                min_confidence_threshold: threshold,
                max_columns_per_table: cap,
                ..SelectionConfig::default()
            },
            QueryAnalyzer::default(),
            Arc::new(RelationshipGraph::new()),
        )
    }

    fn tables(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn employee_columns() -> SemanticResults {
        SemanticResults::new(
            Vec::new(),
            vec![
                SearchHit::column("emp_mstr", "fnm", 0.95),
                SearchHit::column("emp_mstr", "lnm", 0.92),
                SearchHit::column("emp_mstr", "mid_nm", 0.90),
                SearchHit::column("emp_mstr", "hire_dt", 0.88),
                SearchHit::column("cust", "fnm", 0.70),
                SearchHit::column("cust", "lnm", 0.65),
                SearchHit::column("wh_mstr", "mgr_nm", 0.99),
                SearchHit::column("cust", "notes", 0.1),
            ],
        )
    }

    #[test]
    fn test_per_table_cap_respected() {
        let selector = selector(0.5, 3);
        let result = selector.select_columns("employee names", &employee_columns(), &tables(&["emp_mstr", "cust"]));

        assert_eq!(result.table_distribution.get("emp_mstr"), Some(&3));
        assert_eq!(result.table_distribution.get("cust"), Some(&2));
        for count in result.table_distribution.values() {
            assert!(*count <= 3);
        }
        assert!(!result.confidence_scores.contains_key("emp_mstr.hire_dt"));
    }

    #[test]
    fn test_cap_of_one_spreads_across_tables() {
        let selector = selector(0.5, 1);
        let result = selector.select_columns("names", &employee_columns(), &tables(&["emp_mstr", "cust"]));
        let names: Vec<String> = result.selected_columns.iter().map(|c| c.qualified_name()).collect();
        assert_eq!(names, vec!["emp_mstr.fnm", "cust.fnm"]);
    }

    #[test]
    fn test_only_selected_tables_and_confident_columns() {
        let selector = selector(0.5, 3);
        let result = selector.select_columns("names", &employee_columns(), &tables(&["cust"]));
        assert!(result.selected_columns.iter().all(|c| c.table == "cust"));
        // cust.notes normalizes to 5 points, below the 50-point floor
        assert!(!result.confidence_scores.contains_key("cust.notes"));
        assert!(!result.confidence_scores.contains_key("wh_mstr.mgr_nm"));
        assert_eq!(result.table_distribution.len(), 1);
    }

    #[test]
    fn test_sorted_by_confidence_desc() {
        let selector = selector(0.0, 10);
        let result = selector.select_columns("names", &employee_columns(), &tables(&["emp_mstr", "cust", "wh_mstr"]));
        for window in result.selected_columns.windows(2) {
            assert!(window[0].confidence >= window[1].confidence);
        }
        assert_eq!(result.selected_columns[0].qualified_name(), "wh_mstr.mgr_nm");
        assert_eq!(result.selected_columns.len(), 8);
    }

    #[test]
    fn test_table_hits_and_unnamed_columns_ignored() {
        let selector = selector(0.0, 3);
        let mut results = SemanticResults::new(vec![SearchHit::table("cust", 0.9)], Vec::new());
        results.columns.push(SearchHit::table("cust", 0.9));
        let result = selector.select_columns("customers", &results, &tables(&["cust"]));
        assert!(result.selected_columns.is_empty());
        assert!(result.table_distribution.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let selector = selector(0.5, 3);
        let result = selector.select_columns("anything", &SemanticResults::default(), &[]);
        assert!(result.selected_columns.is_empty());
        assert!(result.confidence_scores.is_empty());
        assert!(result.reasoning.contains("Total Columns Found: 0"));
    }

    #[test]
    fn test_confidence_scores_keyed_by_qualified_name() {
        let selector = selector(0.5, 3);
        let result = selector.select_columns("names", &employee_columns(), &tables(&["cust"]));
        // 0.70 raw => 80 points
        assert!((result.confidence_scores["cust.fnm"] - 80.0).abs() < 1e-3);
        assert_eq!(result.selected_columns.len(), result.confidence_scores.len());
    }
}

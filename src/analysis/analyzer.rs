use regex::Regex;

use super::{QueryContext, QueryPattern, TablePattern};

/// Keyword-driven query classifier.
///
/// Patterns are lower-cased once at construction; matching is plain
/// substring containment against the lower-cased query.
#[derive(Debug, Clone)]
pub struct QueryAnalyzer {
    query_patterns: Vec<QueryPattern>,
    table_patterns: Vec<TablePattern>,
    word_regex: Regex,
}

impl Default for QueryAnalyzer {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl QueryAnalyzer {
    pub fn new(query_patterns: Vec<QueryPattern>, table_patterns: Vec<TablePattern>) -> Self {
        let query_patterns = query_patterns
            .into_iter()
            .map(|mut pattern| {
                pattern.keywords = normalize_terms(pattern.keywords);
                pattern
            })
            .collect();
        let table_patterns = table_patterns
            .into_iter()
            .map(|mut pattern| {
                pattern.keywords = normalize_terms(pattern.keywords);
                pattern.exclusion_patterns = normalize_terms(pattern.exclusion_patterns);
                pattern
            })
            .collect();

        Self {
            query_patterns,
            table_patterns,
            word_regex: Regex::new(r"\w+").expect("Invalid regex pattern"),
        }
    }

    pub fn query_patterns(&self) -> &[QueryPattern] {
        &self.query_patterns
    }

    pub fn table_patterns(&self) -> &[TablePattern] {
        &self.table_patterns
    }

    /// Classify a query.
    ///
    /// The best query pattern (highest score, first wins ties, must score
    /// above zero) contributes its required and optional tables as
    /// suggestions and its excluded tables as exclusions. Table patterns are
    /// applied on top: a keyword hit suggests the table, otherwise a table
    /// whose exclusion terms are *all absent* from the query is excluded.
    pub fn analyze(&self, query: &str) -> QueryContext {
        let query_lower = query.to_lowercase();
        let keywords = self.extract_keywords(&query_lower);

        let mut best: Option<(&QueryPattern, f32)> = None;
        for pattern in &self.query_patterns {
            let score = pattern_confidence(&query_lower, pattern);
            if score > best.map(|(_, s)| s).unwrap_or(0.0) {
                best = Some((pattern, score));
            }
        }

        let mut context = match best {
            Some((pattern, score)) => {
                log::debug!("Query matched pattern '{}' (score {:.2})", pattern.pattern_id, score);
                QueryContext {
                    query_type: pattern.pattern_id.clone(),
                    confidence: score,
                    suggested_tables: pattern
                        .required_tables
                        .iter()
                        .chain(pattern.optional_tables.iter())
                        .cloned()
                        .collect(),
                    excluded_tables: pattern.excluded_tables.iter().cloned().collect(),
                    keywords,
                }
            }
            None => QueryContext::generic(keywords),
        };

        for pattern in &self.table_patterns {
            if matches_table_pattern(&query_lower, pattern) {
                context.suggested_tables.insert(pattern.table_name.clone());
            } else if excluded_by_pattern(&query_lower, pattern) {
                context.excluded_tables.insert(pattern.table_name.clone());
            }
        }

        context
    }

    /// Word tokens longer than two characters.
    fn extract_keywords(&self, query_lower: &str) -> Vec<String> {
        self.word_regex
            .find_iter(query_lower)
            .map(|m| m.as_str())
            .filter(|word| word.chars().count() > 2)
            .map(String::from)
            .collect()
    }
}

/// Fraction of the pattern's keywords present in the query plus its boost,
/// capped at 1.0. A pattern without keywords scores 0.
pub(crate) fn pattern_confidence(query_lower: &str, pattern: &QueryPattern) -> f32 {
    if pattern.keywords.is_empty() {
        return 0.0;
    }
    let matches = pattern
        .keywords
        .iter()
        .filter(|keyword| query_lower.contains(keyword.as_str()))
        .count();
    let ratio = matches as f32 / pattern.keywords.len() as f32;
    (ratio + pattern.confidence_boost).min(1.0)
}

fn matches_table_pattern(query_lower: &str, pattern: &TablePattern) -> bool {
    pattern
        .keywords
        .iter()
        .any(|keyword| query_lower.contains(keyword.as_str()))
}

// Triggers when none of the exclusion terms appear in the query. Kept as the
// schema rules were written; it reads inverted and is pending domain review.
fn excluded_by_pattern(query_lower: &str, pattern: &TablePattern) -> bool {
    if pattern.exclusion_patterns.is_empty() {
        return false;
    }
    pattern
        .exclusion_patterns
        .iter()
        .all(|term| !query_lower.contains(term.as_str()))
}

fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::GENERIC_QUERY_TYPE;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn query_pattern(id: &str, keywords: &[&str], boost: f32) -> QueryPattern {
        QueryPattern {
            pattern_id: id.to_string(),
            keywords: strings(keywords),
            required_tables: Vec::new(),
            optional_tables: Vec::new(),
            excluded_tables: Vec::new(),
            confidence_boost: boost,
        }
    }

    fn purchase_pattern() -> QueryPattern {
        QueryPattern {
            required_tables: strings(&["ord_hdr"]),
            optional_tables: strings(&["ord_ln"]),
            excluded_tables: strings(&["emp_mstr"]),
            ..query_pattern("purchase", &["purchase", "bought", "order"], 0.2)
        }
    }

    #[test]
    fn test_no_patterns_yields_generic_context() {
        let analyzer = QueryAnalyzer::default();
        let context = analyzer.analyze("How many products purchased by customers");
        assert_eq!(context.query_type, GENERIC_QUERY_TYPE);
        assert!(context.is_generic());
        assert_eq!(context.confidence, 0.0);
        assert!(context.suggested_tables.is_empty());
        assert!(context.excluded_tables.is_empty());
        assert_eq!(
            context.keywords,
            strings(&["how", "many", "products", "purchased", "customers"])
        );
    }

    #[test]
    fn test_best_pattern_drives_suggestions_and_exclusions() {
        let analyzer = QueryAnalyzer::new(
            vec![query_pattern("employee", &["employee", "staff"], 0.0), purchase_pattern()],
            Vec::new(),
        );
        let context = analyzer.analyze("Products PURCHASED by customers");
        assert_eq!(context.query_type, "purchase");
        // 1 of 3 keywords + 0.2 boost
        assert!((context.confidence - (1.0 / 3.0 + 0.2)).abs() < 1e-5);
        assert!(context.suggested_tables.contains("ord_hdr"));
        assert!(context.suggested_tables.contains("ord_ln"));
        assert!(context.excluded_tables.contains("emp_mstr"));
    }

    #[test]
    fn test_score_capped_at_one() {
        let pattern = query_pattern("p", &["order"], 0.5);
        assert_eq!(pattern_confidence("latest order", &pattern), 1.0);
    }

    #[test]
    fn test_empty_keyword_pattern_scores_zero() {
        let pattern = query_pattern("generic_search", &[], 0.9);
        assert_eq!(pattern_confidence("anything at all", &pattern), 0.0);

        let analyzer = QueryAnalyzer::new(vec![pattern], Vec::new());
        assert_eq!(analyzer.analyze("anything at all").query_type, GENERIC_QUERY_TYPE);
    }

    #[test]
    fn test_ties_keep_first_pattern() {
        let analyzer = QueryAnalyzer::new(
            vec![
                query_pattern("first", &["sales"], 0.0),
                query_pattern("second", &["sales"], 0.0),
            ],
            Vec::new(),
        );
        assert_eq!(analyzer.analyze("total sales").query_type, "first");
    }

    #[test]
    fn test_table_pattern_keyword_suggests_table() {
        let analyzer = QueryAnalyzer::new(
            Vec::new(),
            vec![TablePattern {
                table_name: "cust".to_string(),
                keywords: strings(&["Customer", "client"]),
                exclusion_patterns: Vec::new(),
            }],
        );
        let context = analyzer.analyze("list every customer in Ohio");
        assert!(context.suggested_tables.contains("cust"));
        assert!(context.excluded_tables.is_empty());
        // Still generic: table rules do not set the query type
        assert!(context.is_generic());
    }

    #[test]
    fn test_table_excluded_when_all_exclusion_terms_absent() {
        let analyzer = QueryAnalyzer::new(
            Vec::new(),
            vec![TablePattern {
                table_name: "wh_mstr".to_string(),
                keywords: strings(&["warehouse"]),
                exclusion_patterns: strings(&["stock", "inventory"]),
            }],
        );

        let context = analyzer.analyze("how many employees");
        assert!(context.excluded_tables.contains("wh_mstr"));

        let context = analyzer.analyze("inventory levels");
        assert!(!context.excluded_tables.contains("wh_mstr"));

        // A keyword hit suggests the table and skips the exclusion check
        let context = analyzer.analyze("warehouse managers");
        assert!(context.suggested_tables.contains("wh_mstr"));
        assert!(!context.excluded_tables.contains("wh_mstr"));
    }

    #[test]
    fn test_table_without_exclusion_terms_never_excluded() {
        let analyzer = QueryAnalyzer::new(
            Vec::new(),
            vec![TablePattern {
                table_name: "prd_mstr".to_string(),
                keywords: strings(&["product"]),
                exclusion_patterns: Vec::new(),
            }],
        );
        let context = analyzer.analyze("employees by region");
        assert!(context.excluded_tables.is_empty());
        assert!(context.suggested_tables.is_empty());
    }

    #[test]
    fn test_blank_keywords_are_ignored() {
        let analyzer = QueryAnalyzer::new(vec![query_pattern("p", &["", "  "], 0.0)], Vec::new());
        assert!(analyzer.query_patterns()[0].keywords.is_empty());
        assert!(analyzer.analyze("anything").is_generic());
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::analysis::{QueryAnalyzer, QueryPattern, TablePattern};
use crate::graph::{RelationshipDeclaration, RelationshipGraph, DEFAULT_MAX_DEPTH};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub table_patterns: Vec<TablePatternConfig>,
    #[serde(default)]
    pub query_patterns: Vec<QueryPattern>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Table and column selection knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Fraction (0.0-1.0) of the 0-100 confidence scale a hit must reach.
    #[serde(default = "default_min_confidence_threshold")]
    pub min_confidence_threshold: f32,
    #[serde(default = "default_max_tables_per_query")]
    pub max_tables_per_query: usize,
    #[serde(default = "default_max_columns_per_table")]
    pub max_columns_per_table: usize,
    #[serde(default = "default_true")]
    pub enable_context_filtering: bool,
    #[serde(default = "default_true")]
    pub enable_relationship_completion: bool,
    /// Hop limit when searching for bridge paths.
    #[serde(default = "default_max_path_depth")]
    pub max_path_depth: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_confidence_threshold: default_min_confidence_threshold(),
            max_tables_per_query: default_max_tables_per_query(),
            max_columns_per_table: default_max_columns_per_table(),
            enable_context_filtering: true,
            enable_relationship_completion: true,
            max_path_depth: default_max_path_depth(),
        }
    }
}

impl SelectionConfig {
    /// Minimum confidence on the 0-100 scale.
    pub fn confidence_floor(&self) -> f32 {
        self.min_confidence_threshold * 100.0
    }
}

/// One `[[table_patterns]]` entry: keyword rules plus relationship declarations.
#[derive(Debug, Clone, Deserialize)]
pub struct TablePatternConfig {
    pub table_name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Alternative business names for the table; matched like keywords.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<String>,
    #[serde(default)]
    pub exclusion_patterns: Vec<String>,
}

impl TablePatternConfig {
    pub fn declaration(&self) -> RelationshipDeclaration {
        RelationshipDeclaration {
            table_name: self.table_name.clone(),
            relationships: self.relationships.clone(),
        }
    }

    pub fn pattern(&self) -> TablePattern {
        TablePattern {
            table_name: self.table_name.clone(),
            keywords: self
                .keywords
                .iter()
                .chain(self.aliases.iter())
                .cloned()
                .collect(),
            exclusion_patterns: self.exclusion_patterns.clone(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_confidence_threshold() -> f32 {
    0.5
}

fn default_max_tables_per_query() -> usize {
    4
}

fn default_max_columns_per_table() -> usize {
    3
}

fn default_max_path_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in SCHEMA_CONTEXT_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("SCHEMA_CONTEXT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_path(&config_path)
    }

    /// Load and validate configuration from an explicit path
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let selection = &self.selection;

        if !(0.0..=1.0).contains(&selection.min_confidence_threshold) {
            anyhow::bail!("selection.min_confidence_threshold must be between 0.0 and 1.0");
        }

        if selection.max_tables_per_query == 0 {
            anyhow::bail!("selection.max_tables_per_query must be greater than 0");
        }

        if selection.max_columns_per_table == 0 {
            anyhow::bail!("selection.max_columns_per_table must be greater than 0");
        }

        let mut pattern_ids = HashSet::new();
        for pattern in &self.query_patterns {
            if pattern.pattern_id.trim().is_empty() {
                anyhow::bail!("query_patterns entries must have a non-empty pattern_id");
            }
            if !pattern_ids.insert(pattern.pattern_id.as_str()) {
                anyhow::bail!("Duplicate query pattern id: {}", pattern.pattern_id);
            }
            if !(0.0..=1.0).contains(&pattern.confidence_boost) {
                anyhow::bail!(
                    "query pattern '{}': confidence_boost must be between 0.0 and 1.0",
                    pattern.pattern_id
                );
            }
        }

        // Malformed relationship declarations fail at load; the graph itself
        // is built later by whoever needs it.
        for declaration in self.relationship_declarations() {
            declaration
                .parse()
                .context("Invalid relationship declarations in table_patterns")?;
        }

        Ok(())
    }

    /// Relationship declarations in configured order
    pub fn relationship_declarations(&self) -> Vec<RelationshipDeclaration> {
        self.table_patterns
            .iter()
            .map(TablePatternConfig::declaration)
            .collect()
    }

    /// Build the relationship graph from table_patterns
    pub fn relationship_graph(&self) -> crate::Result<RelationshipGraph> {
        RelationshipGraph::from_declarations(&self.relationship_declarations())
    }

    /// Build the query analyzer from the configured patterns
    pub fn query_analyzer(&self) -> QueryAnalyzer {
        QueryAnalyzer::new(
            self.query_patterns.clone(),
            self.table_patterns
                .iter()
                .map(TablePatternConfig::pattern)
                .collect(),
        )
    }
}

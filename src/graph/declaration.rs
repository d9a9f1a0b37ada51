//! Relationship declarations from configuration and graph construction.

use serde::{Deserialize, Serialize};

use super::{Relationship, RelationshipGraph, RelationshipKind};
use crate::{Result, SchemaContextError};

/// Per-table relationship list as written in configuration.
///
/// Each entry is either `"other_table.column"` (foreign key) or
/// `"other_table"` (direct). Declaring A -> B yields an undirected A <-> B edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDeclaration {
    pub table_name: String,
    #[serde(default)]
    pub relationships: Vec<String>,
}

impl RelationshipDeclaration {
    /// Parse every relationship string on this declaration.
    pub fn parse(&self) -> Result<Vec<Relationship>> {
        let table = self.table_name.trim();
        if table.is_empty() {
            return Err(SchemaContextError::Config(
                "relationship declaration has an empty table_name".to_string(),
            ));
        }
        self.relationships
            .iter()
            .map(|relationship| parse_relationship(table, relationship))
            .collect()
    }
}

/// Parse one relationship string declared on `table`.
///
/// Splits on the first `.`; both sides must be non-empty. Whitespace around
/// the string is ignored.
pub fn parse_relationship(table: &str, relationship: &str) -> Result<Relationship> {
    let invalid = |reason: &str| SchemaContextError::InvalidRelationship {
        table: table.to_string(),
        relationship: relationship.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = relationship.trim();
    if trimmed.is_empty() {
        return Err(invalid("relationship string is empty"));
    }

    let (target, column, kind) = match trimmed.split_once('.') {
        Some((target, column)) => {
            let (target, column) = (target.trim(), column.trim());
            if target.is_empty() {
                return Err(invalid("missing target table before '.'"));
            }
            if column.is_empty() {
                return Err(invalid("missing column after '.'"));
            }
            (target, Some(column.to_string()), RelationshipKind::ForeignKey)
        }
        None => (trimmed, None, RelationshipKind::Direct),
    };

    Ok(Relationship {
        source_table: table.to_string(),
        target_table: target.to_string(),
        column,
        relationship: trimmed.to_string(),
        kind,
    })
}

impl RelationshipGraph {
    /// Build the graph from declarations in their configured order.
    ///
    /// Fails on the first malformed declaration so a bad configuration is
    /// rejected once at load time instead of degrading every query.
    pub fn from_declarations(declarations: &[RelationshipDeclaration]) -> Result<Self> {
        let mut graph = RelationshipGraph::new();

        for declaration in declarations {
            let parsed = declaration.parse()?;
            let table = declaration.table_name.trim();
            graph.ensure_table(table);

            for relationship in parsed {
                let target = relationship.target_table.clone();
                graph.add_relationship(table, &target, relationship);
            }
        }

        log::info!(
            "Built relationship graph with {} tables and {} relationships",
            graph.table_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

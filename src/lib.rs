pub mod analysis;
pub mod config;
pub mod confidence;
pub mod error;
pub mod graph;
pub mod search;
pub mod selection;

pub use analysis::{QueryAnalyzer, QueryContext};
pub use config::{Config, SelectionConfig};
pub use confidence::normalize_score;
pub use error::{Result, SchemaContextError};
pub use graph::{RelationshipDeclaration, RelationshipGraph};
pub use search::{SearchHit, SemanticResults};
pub use selection::{ColumnSelectionResult, SchemaContext, SchemaSelector, TableSelectionResult};

use thiserror::Error;

/// Main error type for schema context selection
#[derive(Error, Debug)]
pub enum SchemaContextError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed relationship declaration, rejected when the graph is built
    #[error("Invalid relationship '{relationship}' declared on table '{table}': {reason}")]
    InvalidRelationship {
        table: String,
        relationship: String,
        reason: String,
    },

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenient Result type using SchemaContextError
pub type Result<T> = std::result::Result<T, SchemaContextError>;

use thiserror::Error;

/// Errors raised while reading a schema written in the schema language.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A string node is not a recognised type expression.
    #[error("invalid type expression at '{path}': {expression}")]
    InvalidTypeExpression { path: String, expression: String },
    /// The JSON value cannot stand for a schema node.
    #[error("unsupported schema value at '{path}': {found}")]
    UnsupportedValue { path: String, found: String },
    /// A list marker carries more than one element schema.
    #[error("list marker at '{path}' must hold at most one element schema, found {len}")]
    ListArity { path: String, len: usize },
    /// `$optional` was mixed with ordinary keys.
    #[error("reserved key '$optional' at '{path}' must be the only key")]
    ReservedKey { path: String },
    /// The schema root is not a mapping.
    #[error("schema root must be a mapping, found {0}")]
    InvalidRoot(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for schema language operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

//! Core contracts for shapecheck.
//!
//! Defines the schema vocabulary, its JSON encoding, and the path flattening
//! shared by the validator and the CLI.

pub mod dsl;
pub mod error;
pub mod path;
pub mod types;

pub use dsl::{parse_node, parse_schema, parse_schema_str, parse_type_expression, schema_to_json};
pub use error::{Result, SchemaError};
pub use path::{Branch, Flattened, KeyPath, flatten};
pub use types::{PrimitiveType, Schema, SchemaNode, TypeDescriptor, schema};

/// A document is a JSON object; its values are arbitrary JSON.
pub type Document = serde_json::Map<String, serde_json::Value>;

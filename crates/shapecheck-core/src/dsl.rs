//! JSON encoding of schemas.
//!
//! Strings hold type expressions (`int`, `Optional[List[str]]`, ...), JSON
//! `null` is the explicit-None marker, arrays are list markers (`[]` or a
//! single element schema), `{"$optional": node}` wraps any node, and every
//! other object is a nested sub-schema.

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::types::{Schema, SchemaNode, TypeDescriptor};

/// Key that turns an object into an `Optional` wrapper.
pub const OPTIONAL_KEY: &str = "$optional";

/// Parse a schema document. The root must be a JSON object.
pub fn parse_schema(value: &Value) -> Result<Schema> {
    match value {
        Value::Object(map) => parse_mapping(map, ""),
        other => Err(SchemaError::InvalidRoot(
            TypeDescriptor::of_value(other).to_string(),
        )),
    }
}

/// Parse a schema from JSON text.
pub fn parse_schema_str(text: &str) -> Result<Schema> {
    let value: Value = serde_json::from_str(text)?;
    parse_schema(&value)
}

/// Parse a single node; `location` is only used in error messages.
pub fn parse_node(value: &Value, location: &str) -> Result<SchemaNode> {
    match value {
        Value::Null => Ok(SchemaNode::ExplicitNone),
        Value::String(expression) => {
            parse_type_expression(expression).ok_or_else(|| SchemaError::InvalidTypeExpression {
                path: display_location(location),
                expression: expression.clone(),
            })
        }
        Value::Array(items) => match items.as_slice() {
            [] => Ok(SchemaNode::list()),
            [element] => Ok(SchemaNode::list_of(parse_node(
                element,
                &format!("{location}[]"),
            )?)),
            _ => Err(SchemaError::ListArity {
                path: display_location(location),
                len: items.len(),
            }),
        },
        Value::Object(map) => match map.get(OPTIONAL_KEY) {
            Some(_) if map.len() > 1 => Err(SchemaError::ReservedKey {
                path: display_location(location),
            }),
            Some(inner) => Ok(SchemaNode::optional(parse_node(inner, location)?)),
            None => Ok(SchemaNode::Nested(parse_mapping(map, location)?)),
        },
        Value::Bool(_) | Value::Number(_) => Err(SchemaError::UnsupportedValue {
            path: display_location(location),
            found: value.to_string(),
        }),
    }
}

/// Parse a type expression such as `Optional[List[int]]`.
///
/// Nested mappings cannot be written as expressions; use the object forms.
pub fn parse_type_expression(expression: &str) -> Option<SchemaNode> {
    let expression = expression.trim();
    match expression {
        "int" => Some(SchemaNode::int()),
        "float" => Some(SchemaNode::float()),
        "str" => Some(SchemaNode::str()),
        "bool" => Some(SchemaNode::bool()),
        "Any" => Some(SchemaNode::any()),
        "None" => Some(SchemaNode::none()),
        "List" => Some(SchemaNode::list()),
        _ => {
            if let Some(inner) = wrapped(expression, "Optional") {
                parse_type_expression(inner).map(SchemaNode::optional)
            } else if let Some(inner) = wrapped(expression, "List") {
                parse_type_expression(inner).map(SchemaNode::list_of)
            } else {
                None
            }
        }
    }
}

/// Encode a node back into its JSON form.
pub fn node_to_json(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Nested(schema) => schema_to_json(schema),
        SchemaNode::Optional(inner) if contains_mapping(inner) => {
            let mut map = Map::new();
            map.insert(OPTIONAL_KEY.to_string(), node_to_json(inner));
            Value::Object(map)
        }
        SchemaNode::List(Some(element)) if contains_mapping(element) => {
            Value::Array(vec![node_to_json(element)])
        }
        other => Value::String(other.to_string()),
    }
}

/// Encode a schema back into its JSON form.
pub fn schema_to_json(schema: &Schema) -> Value {
    Value::Object(
        schema
            .iter()
            .map(|(key, node)| (key.clone(), node_to_json(node)))
            .collect(),
    )
}

fn parse_mapping(map: &Map<String, Value>, location: &str) -> Result<Schema> {
    map.iter()
        .map(|(key, value)| {
            let child = if location.is_empty() {
                key.clone()
            } else {
                format!("{location}.{key}")
            };
            parse_node(value, &child).map(|node| (key.clone(), node))
        })
        .collect()
}

fn wrapped<'a>(expression: &'a str, name: &str) -> Option<&'a str> {
    expression
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('[')?
        .strip_suffix(']')
}

fn contains_mapping(node: &SchemaNode) -> bool {
    match node {
        SchemaNode::Nested(_) => true,
        SchemaNode::Optional(inner) => contains_mapping(inner),
        SchemaNode::List(Some(element)) => contains_mapping(element),
        _ => false,
    }
}

fn display_location(location: &str) -> String {
    if location.is_empty() {
        "<root>".to_string()
    } else {
        location.to_string()
    }
}

impl TryFrom<Value> for SchemaNode {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self> {
        parse_node(&value, "")
    }
}

impl From<SchemaNode> for Value {
    fn from(value: SchemaNode) -> Self {
        node_to_json(&value)
    }
}

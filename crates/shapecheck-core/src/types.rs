use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Top-level schema: mapping keys to the node that governs each key.
pub type Schema = BTreeMap<String, SchemaNode>;

/// Primitive runtime types a `Plain` node can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Int,
    Float,
    Str,
    Bool,
}

impl PrimitiveType {
    /// Name used by the schema language and in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Str => "str",
            PrimitiveType::Bool => "bool",
        }
    }

    /// Primitive type of a document value, if it has one.
    ///
    /// Numbers that fit an `i64`/`u64` are `int`; every other number is `float`.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(_) => Some(PrimitiveType::Bool),
            Value::Number(number) if number.is_i64() || number.is_u64() => Some(PrimitiveType::Int),
            Value::Number(_) => Some(PrimitiveType::Float),
            Value::String(_) => Some(PrimitiveType::Str),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the schema vocabulary.
///
/// Serializes to and from the JSON encoding in [`crate::dsl`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum SchemaNode {
    /// Value must have exactly this primitive type.
    Plain(PrimitiveType),
    /// Value must be null.
    ExplicitNone,
    /// Any value is accepted and never inspected.
    Any,
    /// Value may be absent or null; otherwise it must satisfy the inner node.
    Optional(Box<SchemaNode>),
    /// Value must be a list. `None` leaves elements unchecked.
    List(Option<Box<SchemaNode>>),
    /// Value must be a mapping whose children follow the sub-schema.
    Nested(Schema),
}

impl SchemaNode {
    pub fn int() -> Self {
        SchemaNode::Plain(PrimitiveType::Int)
    }

    pub fn float() -> Self {
        SchemaNode::Plain(PrimitiveType::Float)
    }

    pub fn str() -> Self {
        SchemaNode::Plain(PrimitiveType::Str)
    }

    pub fn bool() -> Self {
        SchemaNode::Plain(PrimitiveType::Bool)
    }

    pub fn any() -> Self {
        SchemaNode::Any
    }

    pub fn none() -> Self {
        SchemaNode::ExplicitNone
    }

    pub fn optional(inner: impl Into<SchemaNode>) -> Self {
        SchemaNode::Optional(Box::new(inner.into()))
    }

    /// Untyped list: elements are never inspected.
    pub fn list() -> Self {
        SchemaNode::List(None)
    }

    pub fn list_of(element: impl Into<SchemaNode>) -> Self {
        SchemaNode::List(Some(Box::new(element.into())))
    }

    pub fn nested<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaNode)>,
    {
        SchemaNode::Nested(schema(entries))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, SchemaNode::Optional(_))
    }

    /// Returns `T` for `Optional(T)`.
    ///
    /// # Panics
    ///
    /// Panics when called on a node that is not `Optional`; callers check
    /// [`SchemaNode::is_optional`] first.
    pub fn unwrap_optional(&self) -> &SchemaNode {
        match self {
            SchemaNode::Optional(inner) => inner,
            other => panic!("unwrap_optional called on non-optional node {other}"),
        }
    }

    /// Strips every `Optional` wrapper, returning the innermost node.
    pub fn peel_optional(&self) -> &SchemaNode {
        let mut node = self;
        while let SchemaNode::Optional(inner) = node {
            node = inner;
        }
        node
    }

    /// True for `Optional(Nested(_))`, including chained optionals.
    pub fn is_optional_of_nested_schema(&self) -> bool {
        self.is_optional() && matches!(self.peel_optional(), SchemaNode::Nested(_))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, SchemaNode::Any)
    }

    /// True for `Any` and for `Any` behind any number of `Optional` wrappers.
    pub fn is_any_or_optional_any(&self) -> bool {
        self.peel_optional().is_any()
    }

    /// Descriptor reported as `expected` when a value fails this node.
    pub fn descriptor(&self) -> TypeDescriptor {
        match self.peel_optional() {
            SchemaNode::Plain(primitive) => TypeDescriptor::Primitive(*primitive),
            SchemaNode::ExplicitNone => TypeDescriptor::Null,
            SchemaNode::Any => TypeDescriptor::Any,
            SchemaNode::List(_) => TypeDescriptor::List,
            SchemaNode::Nested(schema) => TypeDescriptor::Schema(schema.clone()),
            SchemaNode::Optional(_) => unreachable!("optional wrappers are peeled"),
        }
    }
}

impl From<PrimitiveType> for SchemaNode {
    fn from(value: PrimitiveType) -> Self {
        SchemaNode::Plain(value)
    }
}

impl From<Schema> for SchemaNode {
    fn from(value: Schema) -> Self {
        SchemaNode::Nested(value)
    }
}

impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Plain(primitive) => write!(f, "{primitive}"),
            SchemaNode::ExplicitNone => f.write_str("None"),
            SchemaNode::Any => f.write_str("Any"),
            SchemaNode::Optional(inner) => write!(f, "Optional[{inner}]"),
            SchemaNode::List(None) => f.write_str("List"),
            SchemaNode::List(Some(element)) => write!(f, "List[{element}]"),
            SchemaNode::Nested(schema) => write_schema(f, schema),
        }
    }
}

fn write_schema(f: &mut fmt::Formatter<'_>, schema: &Schema) -> fmt::Result {
    f.write_str("{")?;
    for (idx, (key, node)) in schema.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}: {node}")?;
    }
    f.write_str("}")
}

/// Build a [`Schema`] from `(key, node)` pairs.
pub fn schema<K, I>(entries: I) -> Schema
where
    K: Into<String>,
    I: IntoIterator<Item = (K, SchemaNode)>,
{
    entries
        .into_iter()
        .map(|(key, node)| (key.into(), node))
        .collect()
}

/// Type reported on either side of a type error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveType),
    Null,
    Any,
    List,
    Mapping,
    /// Expected shape of a nested sub-schema.
    Schema(Schema),
}

impl TypeDescriptor {
    /// Runtime type of a document value.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => TypeDescriptor::Null,
            Value::Array(_) => TypeDescriptor::List,
            Value::Object(_) => TypeDescriptor::Mapping,
            other => PrimitiveType::of(other)
                .map(TypeDescriptor::Primitive)
                .unwrap_or(TypeDescriptor::Null),
        }
    }
}

impl From<PrimitiveType> for TypeDescriptor {
    fn from(value: PrimitiveType) -> Self {
        TypeDescriptor::Primitive(value)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(primitive) => write!(f, "{primitive}"),
            TypeDescriptor::Null => f.write_str("None"),
            TypeDescriptor::Any => f.write_str("Any"),
            TypeDescriptor::List => f.write_str("list"),
            TypeDescriptor::Mapping => f.write_str("mapping"),
            TypeDescriptor::Schema(schema) => write_schema(f, schema),
        }
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::types::SchemaNode;

/// Location reached by descending through mapping keys only.
///
/// Keys are kept as separate segments so a key containing `.` stays
/// unambiguous; the dotted form is only produced for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of `key` one level below this one.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when `self` lies strictly below `ancestor`.
    pub fn is_strict_descendant_of(&self, ancestor: &KeyPath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for KeyPath {
    /// Splits a dotted path; meant for keys without `.` in them.
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::root()
        } else {
            value.split('.').collect()
        }
    }
}

impl fmt::Display for KeyPath {
    /// Joins segments with `.`. A segment that is empty or holds `.`, `"`,
    /// `[`, `]` or `\` is written quoted, so distinct paths never render alike.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments().iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            write_segment(f, segment)?;
        }
        Ok(())
    }
}

fn write_segment(f: &mut fmt::Formatter<'_>, segment: &str) -> fmt::Result {
    let plain = !segment.is_empty()
        && !segment.contains(|c: char| matches!(c, '.' | '"' | '[' | ']' | '\\'));
    if plain {
        return f.write_str(segment);
    }

    f.write_str("\"")?;
    for c in segment.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

/// A tree node that may hold named children.
///
/// Only mapping containers expose children; lists and scalars are leaves.
pub trait Branch {
    fn children(&self) -> Option<Box<dyn Iterator<Item = (&String, &Self)> + '_>>;
}

impl Branch for Value {
    fn children(&self) -> Option<Box<dyn Iterator<Item = (&String, &Self)> + '_>> {
        match self {
            Value::Object(map) => Some(Box::new(map.iter())),
            _ => None,
        }
    }
}

impl Branch for SchemaNode {
    fn children(&self) -> Option<Box<dyn Iterator<Item = (&String, &Self)> + '_>> {
        match self {
            SchemaNode::Nested(schema) => Some(Box::new(schema.iter())),
            _ => None,
        }
    }
}

/// Every reachable path mapped to the value or node found there.
pub type Flattened<'a, V> = BTreeMap<KeyPath, &'a V>;

/// Flatten a mapping into one entry per reachable key at every depth,
/// intermediate mappings included.
pub fn flatten<'a, V, I>(entries: I) -> Flattened<'a, V>
where
    V: Branch + 'a,
    I: IntoIterator<Item = (&'a String, &'a V)>,
{
    let mut paths = BTreeMap::new();
    let mut stack: Vec<(KeyPath, &'a V)> = entries
        .into_iter()
        .map(|(key, value)| (KeyPath::root().child(key.as_str()), value))
        .collect();

    while let Some((path, value)) = stack.pop() {
        if let Some(children) = value.children() {
            for (key, child) in children {
                stack.push((path.child(key.as_str()), child));
            }
        }
        paths.insert(path, value);
    }

    paths
}

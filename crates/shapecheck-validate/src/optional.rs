use std::collections::BTreeSet;

use serde_json::Value;
use shapecheck_core::{Flattened, KeyPath, Schema, SchemaNode, flatten};
use tracing::trace;

/// Schema with optional sub-schemas unwrapped, plus the paths that were optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    schema: Schema,
    optional_paths: BTreeSet<KeyPath>,
}

impl ResolvedSchema {
    /// Rewritten schema: every `Optional(Nested(_))` became `Nested(_)`.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Paths whose node carried an `Optional` wrapper.
    pub fn optional_paths(&self) -> &BTreeSet<KeyPath> {
        &self.optional_paths
    }

    /// Flattened path → node mapping of the rewritten schema.
    pub fn paths(&self) -> Flattened<'_, SchemaNode> {
        flatten(&self.schema)
    }
}

/// Unwrap optional sub-schemas so their children flatten like any other
/// nested mapping, recording every optional path on the way.
///
/// Builds a fresh schema; the caller's schema is never touched. Scalar
/// optionals (`Optional[int]`, `Optional[Any]`, ...) keep their wrapper since
/// the type checker reads it directly.
pub fn resolve(schema: &Schema) -> ResolvedSchema {
    let mut optional_paths = BTreeSet::new();
    let schema = rewrite_mapping(schema, &KeyPath::root(), &mut optional_paths);

    ResolvedSchema {
        schema,
        optional_paths,
    }
}

fn rewrite_mapping(
    schema: &Schema,
    parent: &KeyPath,
    optional_paths: &mut BTreeSet<KeyPath>,
) -> Schema {
    schema
        .iter()
        .map(|(key, node)| {
            let path = parent.child(key.as_str());
            let node = rewrite_node(node, &path, optional_paths);
            (key.clone(), node)
        })
        .collect()
}

fn rewrite_node(
    node: &SchemaNode,
    path: &KeyPath,
    optional_paths: &mut BTreeSet<KeyPath>,
) -> SchemaNode {
    if node.is_optional() {
        trace!(path = %path, node = %node, "optional path");
        optional_paths.insert(path.clone());
    }

    unwrap_schema(node, path, optional_paths)
}

fn unwrap_schema(
    node: &SchemaNode,
    path: &KeyPath,
    optional_paths: &mut BTreeSet<KeyPath>,
) -> SchemaNode {
    match node {
        SchemaNode::Nested(inner) => {
            SchemaNode::Nested(rewrite_mapping(inner, path, optional_paths))
        }
        optional if optional.is_optional_of_nested_schema() => {
            unwrap_schema(optional.unwrap_optional(), path, optional_paths)
        }
        other => other.clone(),
    }
}

/// Drop missing schema paths that sit below an optional path whose document
/// value is absent or null. The optional path itself is left alone.
pub fn suppress_absent_optional_descendants(
    missing: &mut BTreeSet<KeyPath>,
    optional_paths: &BTreeSet<KeyPath>,
    document_paths: &Flattened<'_, Value>,
) {
    for optional_path in optional_paths {
        let absent = document_paths
            .get(optional_path)
            .is_none_or(|value| value.is_null());
        if absent {
            missing.retain(|path| !path.is_strict_descendant_of(optional_path));
        }
    }
}

/// Paths whose node is `Any` or an optional `Any`.
pub fn any_exempt_paths(schema_paths: &Flattened<'_, SchemaNode>) -> BTreeSet<KeyPath> {
    schema_paths
        .iter()
        .filter(|(_, node)| node.is_any_or_optional_any())
        .map(|(path, _)| path.clone())
        .collect()
}

/// Drop document paths that sit below an any-exempt path.
pub fn suppress_any_exempt_descendants(
    paths: &mut BTreeSet<KeyPath>,
    schema_paths: &Flattened<'_, SchemaNode>,
) {
    let exempt = any_exempt_paths(schema_paths);
    if exempt.is_empty() {
        return;
    }
    paths.retain(|path| {
        !exempt
            .iter()
            .any(|exempt_path| path.is_strict_descendant_of(exempt_path))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shapecheck_core::schema;

    fn keys(paths: &[&str]) -> BTreeSet<KeyPath> {
        paths.iter().map(|path| KeyPath::from(*path)).collect()
    }

    fn deeply_optional() -> Schema {
        schema([(
            "a",
            SchemaNode::optional(SchemaNode::nested([(
                "b",
                SchemaNode::optional(SchemaNode::nested([("c", SchemaNode::int())])),
            )])),
        )])
    }

    #[test]
    fn unwraps_optional_schemas_and_records_paths() {
        let original = deeply_optional();

        let resolved = resolve(&original);

        assert_eq!(resolved.optional_paths(), &keys(&["a", "a.b"]));
        assert_eq!(
            resolved.schema(),
            &schema([(
                "a",
                SchemaNode::nested([("b", SchemaNode::nested([("c", SchemaNode::int())]))]),
            )])
        );
        let paths: Vec<String> = resolved.paths().keys().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["a", "a.b", "a.b.c"]);
        assert_eq!(original, deeply_optional());
    }

    #[test]
    fn scalar_optionals_keep_their_wrapper() {
        let resolved = resolve(&schema([
            ("a", SchemaNode::optional(SchemaNode::int())),
            ("b", SchemaNode::optional(SchemaNode::any())),
            ("c", SchemaNode::nested([("d", SchemaNode::optional(SchemaNode::list()))])),
        ]));

        assert_eq!(resolved.optional_paths(), &keys(&["a", "b", "c.d"]));
        assert_eq!(resolved.schema()["a"], SchemaNode::optional(SchemaNode::int()));
        assert_eq!(resolved.schema()["b"], SchemaNode::optional(SchemaNode::any()));
    }

    #[test]
    fn chained_optional_schema_unwraps_fully() {
        let resolved = resolve(&schema([(
            "a",
            SchemaNode::optional(SchemaNode::optional(SchemaNode::nested([(
                "b",
                SchemaNode::int(),
            )]))),
        )]));

        assert_eq!(resolved.optional_paths(), &keys(&["a"]));
        assert_eq!(
            resolved.schema()["a"],
            SchemaNode::nested([("b", SchemaNode::int())])
        );
    }

    #[test]
    fn optional_list_of_schemas_is_not_unwrapped() {
        let node = SchemaNode::optional(SchemaNode::list_of(SchemaNode::nested([(
            "id",
            SchemaNode::int(),
        )])));

        let resolved = resolve(&schema([("items", node.clone())]));

        assert_eq!(resolved.optional_paths(), &keys(&["items"]));
        assert_eq!(resolved.schema()["items"], node);
        let paths: Vec<String> = resolved.paths().keys().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["items"]);
    }

    #[test]
    fn suppresses_descendants_of_null_or_absent_optionals() {
        let document = json!({"a": {"b": null}, "x": 1});
        let document_paths = flatten(document.as_object().expect("object"));
        let optional_paths = keys(&["a", "a.b", "z"]);
        let mut missing = keys(&["a.b.c", "a.b.c.d", "z", "z.y", "q"]);

        suppress_absent_optional_descendants(&mut missing, &optional_paths, &document_paths);

        assert_eq!(missing, keys(&["q", "z"]));
    }

    #[test]
    fn present_optional_keeps_descendants_missing() {
        let document = json!({"a": {"b": 1}});
        let document_paths = flatten(document.as_object().expect("object"));
        let mut missing = keys(&["a.b.c"]);

        suppress_absent_optional_descendants(&mut missing, &keys(&["a", "a.b"]), &document_paths);

        assert_eq!(missing, keys(&["a.b.c"]));
    }

    #[test]
    fn any_subtrees_are_exempt() {
        let schema = schema([
            ("foo", SchemaNode::optional(SchemaNode::any())),
            ("bar", SchemaNode::any()),
            ("baz", SchemaNode::int()),
        ]);
        let schema_paths = flatten(&schema);
        let mut additional = keys(&["foo.x", "bar.y.z", "baz.w", "bar", "foobar"]);

        suppress_any_exempt_descendants(&mut additional, &schema_paths);

        assert_eq!(any_exempt_paths(&schema_paths), keys(&["bar", "foo"]));
        assert_eq!(additional, keys(&["bar", "baz.w", "foobar"]));
    }
}

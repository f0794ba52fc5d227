use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use shapecheck_core::{KeyPath, PrimitiveType, SchemaNode, TypeDescriptor};

use crate::validator::{ValidationResult, reconcile};

/// A value whose runtime type does not satisfy its schema node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeError {
    /// Dotted path, with `[N]` suffixes for list elements.
    pub path: String,
    pub expected: TypeDescriptor,
    pub actual: TypeDescriptor,
}

impl TypeError {
    pub fn new(
        path: impl Into<String>,
        expected: impl Into<TypeDescriptor>,
        actual: impl Into<TypeDescriptor>,
    ) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (expected {}, got {})",
            self.path, self.expected, self.actual
        )
    }
}

/// Everything a failed check found at and below one path.
///
/// Only list elements validated against a nested schema contribute
/// missing or additional keys; those are addressed as `path[N].key`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Findings {
    pub type_errors: Vec<TypeError>,
    pub missing_keys: Vec<String>,
    pub additional_keys: Vec<String>,
}

impl Findings {
    pub fn is_empty(&self) -> bool {
        self.type_errors.is_empty() && self.missing_keys.is_empty() && self.additional_keys.is_empty()
    }

    fn mismatch(&mut self, location: &str, expected: TypeDescriptor, actual: TypeDescriptor) {
        self.type_errors.push(TypeError::new(location, expected, actual));
    }
}

/// How mappings met during a check are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// A flattened document path; child keys are checked as their own paths.
    Path,
    /// A list element; a mapping is validated in full right here.
    Element,
}

/// Check the value found at `path` against its schema node.
///
/// Nested mappings pass at their own path (their children are separate
/// paths) unless the node cannot describe a mapping at all. A null value
/// passes at any path listed in `optional_paths`.
pub fn check(
    node: &SchemaNode,
    value: &Value,
    path: &KeyPath,
    optional_paths: &BTreeSet<KeyPath>,
) -> Result<(), Findings> {
    let mut findings = Findings::default();
    let optional = optional_paths.contains(path);
    check_value(
        node,
        value,
        &path.to_string(),
        optional,
        Scope::Path,
        &mut findings,
    );

    if findings.is_empty() {
        Ok(())
    } else {
        Err(findings)
    }
}

fn check_value(
    node: &SchemaNode,
    value: &Value,
    location: &str,
    optional: bool,
    scope: Scope,
    findings: &mut Findings,
) {
    if let Value::Object(map) = value {
        match node.peel_optional() {
            SchemaNode::Any => {}
            SchemaNode::Nested(schema) => {
                if scope == Scope::Element {
                    merge_element(reconcile(schema, map), location, findings);
                }
            }
            other => findings.mismatch(location, other.descriptor(), TypeDescriptor::Mapping),
        }
        return;
    }

    let mut node = node;
    loop {
        match (node, value) {
            (SchemaNode::Any, _) | (SchemaNode::ExplicitNone, Value::Null) => return,
            (SchemaNode::ExplicitNone, other) => {
                findings.mismatch(location, TypeDescriptor::Null, TypeDescriptor::of_value(other));
                return;
            }
            (SchemaNode::Optional(_), Value::Null) => return,
            (SchemaNode::Optional(inner), _) => node = inner,
            (SchemaNode::List(element), Value::Array(items)) => {
                if let Some(element) = element {
                    check_elements(element, items, location, findings);
                }
                return;
            }
            (SchemaNode::Plain(expected), other) if PrimitiveType::of(other) == Some(*expected) => {
                return;
            }
            (_, Value::Null) if optional => return,
            (_, other) => {
                findings.mismatch(location, node.descriptor(), TypeDescriptor::of_value(other));
                return;
            }
        }
    }
}

fn check_elements(element: &SchemaNode, items: &[Value], location: &str, findings: &mut Findings) {
    if element.is_any() {
        return;
    }
    for (idx, item) in items.iter().enumerate() {
        let item_location = format!("{location}[{idx}]");
        check_value(element, item, &item_location, false, Scope::Element, findings);
    }
}

fn merge_element(result: ValidationResult, location: &str, findings: &mut Findings) {
    findings.missing_keys.extend(
        result
            .missing_keys()
            .iter()
            .map(|key| format!("{location}.{key}")),
    );
    findings.additional_keys.extend(
        result
            .additional_keys()
            .iter()
            .map(|key| format!("{location}.{key}")),
    );
    findings
        .type_errors
        .extend(result.type_errors().iter().map(|error| TypeError {
            path: format!("{location}.{}", error.path),
            ..error.clone()
        }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shapecheck_core::schema;

    fn run(node: &SchemaNode, value: Value) -> Result<(), Findings> {
        check(node, &value, &KeyPath::from("foo"), &BTreeSet::new())
    }

    fn type_errors(result: Result<(), Findings>) -> Vec<TypeError> {
        result.expect_err("check fails").type_errors
    }

    #[test]
    fn mappings_pass_at_their_own_path() {
        let nested = SchemaNode::nested([("bar", SchemaNode::int())]);
        assert_eq!(run(&nested, json!({"bar": "not checked here"})), Ok(()));
        assert_eq!(run(&SchemaNode::any(), json!({"x": 1})), Ok(()));
        assert_eq!(run(&SchemaNode::optional(SchemaNode::any()), json!({"x": 1})), Ok(()));
    }

    #[test]
    fn scalar_node_rejects_mapping() {
        let errors = type_errors(run(&SchemaNode::optional(SchemaNode::int()), json!({"x": 1})));
        assert_eq!(
            errors,
            vec![TypeError::new("foo", PrimitiveType::Int, TypeDescriptor::Mapping)]
        );

        let errors = type_errors(run(&SchemaNode::list(), json!({})));
        assert_eq!(errors[0].expected, TypeDescriptor::List);
    }

    #[test]
    fn explicit_none_only_accepts_null() {
        assert_eq!(run(&SchemaNode::none(), json!(null)), Ok(()));
        assert_eq!(
            type_errors(run(&SchemaNode::none(), json!("x"))),
            vec![TypeError::new("foo", TypeDescriptor::Null, PrimitiveType::Str)]
        );
    }

    #[test]
    fn optional_accepts_null_then_checks_inner() {
        let node = SchemaNode::optional(SchemaNode::int());
        assert_eq!(run(&node, json!(null)), Ok(()));
        assert_eq!(run(&node, json!(3)), Ok(()));
        assert_eq!(
            type_errors(run(&node, json!("s"))),
            vec![TypeError::new("foo", PrimitiveType::Int, PrimitiveType::Str)]
        );

        let chained = SchemaNode::optional(SchemaNode::optional(SchemaNode::str()));
        assert_eq!(run(&chained, json!("s")), Ok(()));
        assert_eq!(
            type_errors(run(&chained, json!(1.5)))[0].actual,
            TypeDescriptor::Primitive(PrimitiveType::Float)
        );
    }

    #[test]
    fn primitive_identity_is_exact() {
        assert_eq!(run(&SchemaNode::float(), json!(1.0)), Ok(()));
        assert_eq!(
            type_errors(run(&SchemaNode::float(), json!(1))),
            vec![TypeError::new("foo", PrimitiveType::Float, PrimitiveType::Int)]
        );
        assert_eq!(
            type_errors(run(&SchemaNode::int(), json!(true))),
            vec![TypeError::new("foo", PrimitiveType::Int, PrimitiveType::Bool)]
        );
    }

    #[test]
    fn null_passes_only_on_optional_paths() {
        let nested = SchemaNode::nested([("c", SchemaNode::int())]);
        let optional_paths: BTreeSet<KeyPath> = [KeyPath::from("a.b")].into_iter().collect();

        assert_eq!(
            check(&nested, &json!(null), &KeyPath::from("a.b"), &optional_paths),
            Ok(())
        );
        let errors = type_errors(check(
            &nested,
            &json!(null),
            &KeyPath::from("a.c"),
            &optional_paths,
        ));
        assert_eq!(
            errors,
            vec![TypeError::new(
                "a.c",
                TypeDescriptor::Schema(schema([("c", SchemaNode::int())])),
                TypeDescriptor::Null,
            )]
        );
    }

    #[test]
    fn list_nodes_report_generic_list_kind() {
        assert_eq!(run(&SchemaNode::list(), json!([1, "a", null])), Ok(()));
        assert_eq!(
            type_errors(run(&SchemaNode::list_of(SchemaNode::int()), json!(1))),
            vec![TypeError::new("foo", TypeDescriptor::List, PrimitiveType::Int)]
        );
    }

    #[test]
    fn list_elements_are_checked_by_index() {
        let node = SchemaNode::list_of(SchemaNode::int());
        assert_eq!(
            type_errors(run(&node, json!([1, "a", 2, null]))),
            vec![
                TypeError::new("foo[1]", PrimitiveType::Int, PrimitiveType::Str),
                TypeError::new("foo[3]", PrimitiveType::Int, TypeDescriptor::Null),
            ]
        );

        let nested = SchemaNode::list_of(SchemaNode::list_of(SchemaNode::bool()));
        assert_eq!(
            type_errors(run(&nested, json!([[true], [false, 0]]))),
            vec![TypeError::new("foo[1][1]", PrimitiveType::Bool, PrimitiveType::Int)]
        );

        assert_eq!(run(&SchemaNode::list_of(SchemaNode::any()), json!([1, {}, []])), Ok(()));
        assert_eq!(
            run(&SchemaNode::list_of(SchemaNode::optional(SchemaNode::str())), json!(["a", null])),
            Ok(())
        );
    }

    #[test]
    fn list_of_mappings_validates_each_element() {
        let node = SchemaNode::list_of(SchemaNode::nested([
            ("title", SchemaNode::str()),
            ("urgency", SchemaNode::optional(SchemaNode::str())),
        ]));

        let findings = run(
            &node,
            json!([
                {"title": "a", "urgency": null},
                {"title": "b", "urgency": 1},
                {"urgency": "high", "extra": true},
                "not a mapping"
            ]),
        )
        .expect_err("elements fail");

        assert_eq!(
            findings.type_errors,
            vec![
                TypeError::new("foo[1].urgency", PrimitiveType::Str, PrimitiveType::Int),
                TypeError::new(
                    "foo[3]",
                    TypeDescriptor::Schema(schema([
                        ("title", SchemaNode::str()),
                        ("urgency", SchemaNode::optional(SchemaNode::str())),
                    ])),
                    PrimitiveType::Str,
                ),
            ]
        );
        assert_eq!(findings.missing_keys, vec!["foo[2].title"]);
        assert_eq!(findings.additional_keys, vec!["foo[2].extra"]);
    }
}

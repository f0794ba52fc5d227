use std::collections::BTreeSet;

use serde::Serialize;
use shapecheck_core::{Document, KeyPath, Schema, flatten};
use tracing::debug;

use crate::check::{TypeError, check};
use crate::optional::{resolve, suppress_absent_optional_descendants, suppress_any_exempt_descendants};

/// Outcome of one validation: three disjoint classes of divergence.
///
/// All lists are sorted by path. Constructed once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    missing_keys: Vec<String>,
    additional_keys: Vec<String>,
    type_errors: Vec<TypeError>,
}

impl ValidationResult {
    fn new(
        mut missing_keys: Vec<String>,
        mut additional_keys: Vec<String>,
        mut type_errors: Vec<TypeError>,
    ) -> Self {
        missing_keys.sort();
        additional_keys.sort();
        type_errors.sort_by(|left, right| left.path.cmp(&right.path));

        Self {
            valid: missing_keys.is_empty() && additional_keys.is_empty() && type_errors.is_empty(),
            missing_keys,
            additional_keys,
            type_errors,
        }
    }

    /// True when no key is missing, none is additional and no type differs.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Schema paths absent from the document.
    pub fn missing_keys(&self) -> &[String] {
        &self.missing_keys
    }

    /// Document paths absent from the schema.
    pub fn additional_keys(&self) -> &[String] {
        &self.additional_keys
    }

    pub fn type_errors(&self) -> &[TypeError] {
        &self.type_errors
    }
}

impl From<&ValidationResult> for bool {
    fn from(value: &ValidationResult) -> Self {
        value.is_valid()
    }
}

/// Validate a document against a schema, reporting every divergence in one pass.
pub fn validate(schema: &Schema, document: &Document) -> ValidationResult {
    let result = reconcile(schema, document);

    debug!(
        event = "validation_finished",
        valid = result.is_valid(),
        missing = result.missing_keys().len(),
        additional = result.additional_keys().len(),
        type_errors = result.type_errors().len(),
    );

    result
}

/// [`validate`] without the completion event. Used for list elements.
pub(crate) fn reconcile(schema: &Schema, document: &Document) -> ValidationResult {
    let resolved = resolve(schema);
    let schema_paths = resolved.paths();
    let document_paths = flatten(document);

    let mut missing: BTreeSet<KeyPath> = schema_paths
        .keys()
        .filter(|path| !document_paths.contains_key(*path))
        .cloned()
        .collect();
    suppress_absent_optional_descendants(&mut missing, resolved.optional_paths(), &document_paths);

    let mut additional: BTreeSet<KeyPath> = document_paths
        .keys()
        .filter(|path| !schema_paths.contains_key(*path))
        .cloned()
        .collect();
    suppress_any_exempt_descendants(&mut additional, &schema_paths);

    let mut missing_keys: Vec<String> = missing.iter().map(ToString::to_string).collect();
    let mut additional_keys: Vec<String> = additional.iter().map(ToString::to_string).collect();
    let mut type_errors = Vec::new();

    // Paths below an any-exempt path have no schema node and are skipped here.
    for (path, value) in &document_paths {
        let Some(node) = schema_paths.get(path) else {
            continue;
        };
        if let Err(findings) = check(node, value, path, resolved.optional_paths()) {
            type_errors.extend(findings.type_errors);
            missing_keys.extend(findings.missing_keys);
            additional_keys.extend(findings.additional_keys);
        }
    }

    ValidationResult::new(missing_keys, additional_keys, type_errors)
}

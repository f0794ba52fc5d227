//! Schema/document reconciliation.
//!
//! Flattens schema and document into path mappings, diffs their key sets,
//! suppresses the divergences that optional and `Any` nodes excuse, and
//! type-checks every path the two share.

pub mod check;
pub mod optional;
pub mod report;
pub mod validator;

pub use check::{Findings, TypeError, check};
pub use optional::{ResolvedSchema, any_exempt_paths, resolve};
pub use report::render_summary;
pub use validator::{ValidationResult, validate};

//! Field schema and header matching.
//!
//! - [`fields`]: the static [`FIELD_SCHEMA`] table (aliases, required-ness, parsers)
//! - [`header`]: header normalization, alias resolution and header validation

pub mod fields;
pub mod header;

pub use fields::{FieldDescriptor, FieldKey, FieldValue, FIELD_SCHEMA};
pub use header::{is_known_header, normalize_header, resolve_alias, validate_headers};

//! Header normalization, alias resolution and header validation.
//!
//! Two headers name the same column iff their [`normalize_header`] forms are equal. The same
//! normalization is applied to file headers and to schema aliases before every comparison.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::error::{IngestionError, IngestionResult};

use super::fields::FIELD_SCHEMA;

static KNOWN_ALIASES: LazyLock<HashSet<String>> = LazyLock::new(|| {
    FIELD_SCHEMA
        .iter()
        .flat_map(|d| d.aliases.iter())
        .map(|a| normalize_header(a))
        .filter(|a| !a.is_empty())
        .collect()
});

/// Canonicalize a column label: lower-case it and drop every character that is not an ASCII
/// letter or digit.
///
/// `"Temperature (°C)"` and `" temperature_c "` both normalize to `"temperaturec"`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Find the source column for an ordered alias list.
///
/// Aliases are tried in order; the first alias that matches any header wins. When several
/// headers normalize to the same form, the first one in source order is returned. Returns the
/// index into `headers`.
pub fn resolve_alias<'a, I>(headers: I, aliases: &[&str]) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized: Vec<String> = headers.into_iter().map(normalize_header).collect();
    aliases.iter().find_map(|alias| {
        let wanted = normalize_header(alias);
        if wanted.is_empty() {
            return None;
        }
        normalized.iter().position(|h| *h == wanted)
    })
}

/// `true` if `header` matches an alias of any schema field.
pub fn is_known_header(header: &str) -> bool {
    KNOWN_ALIASES.contains(&normalize_header(header))
}

/// Check that every required field resolves to some header.
///
/// All required fields are checked before failing, so a single
/// [`IngestionError::MissingRequiredColumns`] lists every missing field (by preferred name)
/// together with the headers that were detected.
pub fn validate_headers(headers: &[String]) -> IngestionResult<()> {
    let present: HashSet<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let missing: Vec<String> = FIELD_SCHEMA
        .iter()
        .filter(|d| d.required)
        .filter(|d| {
            !d.aliases
                .iter()
                .map(|a| normalize_header(a))
                .any(|a| !a.is_empty() && present.contains(&a))
        })
        .map(|d| d.display_name().to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(IngestionError::MissingRequiredColumns {
        missing,
        detected: headers.to_vec(),
    })
}

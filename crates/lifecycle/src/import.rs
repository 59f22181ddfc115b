//! Import identifier parsing

use crate::error::{Error, Result};

/// Separator between fields of a composite import identifier
pub const IMPORT_SEPARATOR: &str = ",";

/// Parse a composite import identifier like "app_id,rule_id"
///
/// Returns `(field, value)` pairs in the declared field order. Fails with
/// `Error::ImportFormat` if the field count does not match or any field is
/// empty.
pub fn parse_import_id<'f>(
    raw: &str,
    fields: &[&'f str],
) -> Result<Vec<(&'f str, String)>> {
    let parts: Vec<&str> = raw.split(IMPORT_SEPARATOR).collect();

    if parts.len() != fields.len() || parts.iter().any(|p| p.is_empty()) {
        return Err(Error::ImportFormat {
            expected: fields.join(IMPORT_SEPARATOR),
            got: raw.to_string(),
        });
    }

    Ok(fields
        .iter()
        .zip(parts)
        .map(|(field, value)| (*field, value.to_string()))
        .collect())
}

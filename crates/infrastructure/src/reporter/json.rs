//! Deterministic JSON rendering for reports.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::ReportError;

/// Serializes a value as pretty JSON with 2-space indentation and a
/// trailing newline.
///
/// Map keys come out sorted because every map in the report types is a
/// `BTreeMap`, so two reports of the same run diff cleanly.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

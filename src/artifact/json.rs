//! JSON encoding of records.

use serde::Serialize;
use serde_json::ser::{CompactFormatter, PrettyFormatter, Serializer};

use crate::error::Result;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed with 4-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Encode a value as UTF-8 JSON.
///
/// Non-ASCII characters are written as-is, not escaped.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        JsonFormat::Pretty => {
            let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
            value.serialize(&mut ser)?;
        }
        JsonFormat::Compact => {
            let mut ser = Serializer::with_formatter(&mut buf, CompactFormatter);
            value.serialize(&mut ser)?;
        }
    }
    Ok(buf)
}

//! Line Parser - one framed line in, one `Reading` or a rejection out.
//!
//! Rejections are part of normal streaming operation (line-edge truncation
//! on connect, sensor boot banners, noise) and are dropped silently by the
//! caller; nothing here logs.

use contracts::Reading;

/// Why a line did not become a reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    /// Nothing but whitespace
    Empty,
    /// Does not start with the JSON object delimiter
    NotObject,
    /// JSON decode failed
    MalformedSyntax(String),
}

/// Cheap pre-parse gate: first non-whitespace byte is `{`.
///
/// The reader uses this to discard banner/noise lines without invoking the
/// parser at all.
pub fn looks_like_object(line: &[u8]) -> bool {
    line.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}

/// Decode one framed line into a `Reading`.
///
/// Undecodable byte sequences are replaced rather than failing the line;
/// unknown keys are ignored; missing keys leave the corresponding field
/// unset.
pub fn parse_line(line: &[u8]) -> Result<Reading, LineRejection> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(LineRejection::Empty);
    }
    if !trimmed.starts_with('{') {
        return Err(LineRejection::NotObject);
    }

    serde_json::from_str(trimmed).map_err(|e| LineRejection::MalformedSyntax(e.to_string()))
}

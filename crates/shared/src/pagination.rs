//! Cursor-based pagination utilities for location history.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error type for cursor operations.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("Invalid sequence in cursor")]
    InvalidSequence,
}

/// Encodes a history cursor from a server timestamp and per-pet sequence.
///
/// The cursor format is: base64(RFC3339_timestamp:sequence). The sequence
/// component breaks ties between logs sharing the same server timestamp, so
/// paging never skips or repeats a row.
pub fn encode_cursor(recorded_at: DateTime<Utc>, sequence: i64) -> String {
    let raw = format!(
        "{}:{}",
        recorded_at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
        sequence
    );
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Decodes a history cursor into `(recorded_at, sequence)`.
pub fn decode_cursor(cursor: &str) -> Result<(DateTime<Utc>, i64), CursorError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;

    let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

    // Split on the last colon; the RFC3339 timestamp itself contains colons.
    let colon_pos = s.rfind(':').ok_or(CursorError::InvalidFormat)?;
    let timestamp_str = &s[..colon_pos];
    let sequence_str = &s[colon_pos + 1..];

    let sequence: i64 = sequence_str
        .parse()
        .map_err(|_| CursorError::InvalidSequence)?;

    let recorded_at = DateTime::parse_from_rfc3339(timestamp_str)
        .map_err(|_| CursorError::InvalidTimestamp)?
        .with_timezone(&Utc);

    Ok((recorded_at, sequence))
}

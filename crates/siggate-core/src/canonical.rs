//! Canonical signing-string construction.
//!
//! The signing string is the exact byte sequence that gets MACed: one
//! `name: value` line per covered header, joined by a single `\n`, with no
//! trailing newline. Both sides of the protocol must build it identically
//! or verification fails even with the correct secret, so values are used
//! byte-for-byte as supplied. Nothing is re-encoded, trimmed, or re-sorted.

use http::HeaderMap;

use crate::error::SignatureError;

/// Build the signing string from `(name, value)` pairs in their given order.
///
/// Used on the signing side, where the caller supplies the values directly.
#[must_use]
pub fn signing_string_from_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the signing string by looking up each named header on the request,
/// preserving the order of `names`.
///
/// Used on the verifying side, where the values live on the incoming
/// request.
///
/// # Errors
///
/// Returns [`SignatureError::MissingRequiredHeader`] if a named header is
/// absent from the request or its value is not valid UTF-8.
pub fn signing_string_from_request(
    names: &[String],
    headers: &HeaderMap,
) -> Result<String, SignatureError> {
    let mut lines = Vec::with_capacity(names.len());

    for name in names {
        let value = headers
            .get(name.as_str())
            .ok_or_else(|| SignatureError::MissingRequiredHeader(name.clone()))?
            .to_str()
            .map_err(|_| SignatureError::MissingRequiredHeader(name.clone()))?;
        lines.push(format!("{name}: {value}"));
    }

    Ok(lines.join("\n"))
}

//! `Authorization` header parsing.
//!
//! Extracts a [`SignatureDescriptor`] from an incoming request, or fails
//! with one of the structural [`SignatureError`] kinds before any
//! cryptographic work happens. The expected header shape is:
//!
//! ```text
//! Authorization: Signature keyId="client-1",algorithm="hmac-sha256",headers="date",signature="<base64>"
//! ```
//!
//! Attribute order is not significant and whitespace around commas is
//! tolerated. Quoted values are opaque until the closing quote, so commas
//! and equals signs inside them are data, not delimiters. Unknown
//! attributes are ignored.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::error::SignatureError;
use crate::policy::VerifyPolicy;

/// The scheme token that opens a recognized `Authorization` header.
pub(crate) const SCHEME: &str = "Signature";

/// Parsed, structured representation of a signature header.
///
/// Created fresh per request by [`parse_request`] and consumed immediately
/// by the verifier; never cached or reused across requests.
#[derive(Debug)]
pub struct SignatureDescriptor {
    /// Opaque identifier selecting the secret.
    pub key_id: String,
    /// The registered algorithm named by the header.
    pub algorithm: &'static Algorithm,
    /// Covered header names, in signing order. Never empty, never
    /// re-sorted; this order is reproduced exactly when the signing string
    /// is rebuilt.
    pub header_names: Vec<String>,
    /// The decoded signature bytes.
    pub signature: Vec<u8>,
}

/// Parse and validate the signature attributes of an incoming request.
///
/// Checks run in a fixed order: header presence and scheme, attribute
/// completeness, policy-required coverage, per-header presence on the
/// request, freshness, signature decoding, and finally algorithm lookup.
/// The first failing check wins.
///
/// # Errors
///
/// One of [`SignatureError::MalformedAuthorization`],
/// [`SignatureError::MissingRequiredHeader`],
/// [`SignatureError::ExpiredRequest`], or
/// [`SignatureError::UnsupportedAlgorithm`].
pub fn parse_request(
    parts: &http::request::Parts,
    policy: &VerifyPolicy,
) -> Result<SignatureDescriptor, SignatureError> {
    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .ok_or(SignatureError::MalformedAuthorization)?
        .to_str()
        .map_err(|_| SignatureError::MalformedAuthorization)?;

    let attribute_list = auth_header
        .strip_prefix(SCHEME)
        .and_then(|rest| rest.strip_prefix(' '))
        .ok_or(SignatureError::MalformedAuthorization)?;

    let mut key_id = None;
    let mut algorithm_name = None;
    let mut headers = None;
    let mut signature_text = None;

    for (name, value) in parse_attributes(attribute_list)? {
        match name {
            "keyId" => key_id = Some(value),
            "algorithm" => algorithm_name = Some(value),
            "headers" => headers = Some(value),
            "signature" => signature_text = Some(value),
            // Unknown attributes are tolerated and ignored.
            _ => {}
        }
    }

    let key_id = key_id.ok_or(SignatureError::MalformedAuthorization)?;
    let algorithm_name = algorithm_name.ok_or(SignatureError::MalformedAuthorization)?;
    let headers = headers.ok_or(SignatureError::MalformedAuthorization)?;
    let signature_text = signature_text.ok_or(SignatureError::MalformedAuthorization)?;

    if key_id.is_empty() {
        return Err(SignatureError::MalformedAuthorization);
    }

    let header_names: Vec<String> = headers.split_whitespace().map(ToOwned::to_owned).collect();
    if header_names.is_empty() {
        return Err(SignatureError::MalformedAuthorization);
    }

    for required in &policy.required_headers {
        if !header_names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(required))
        {
            return Err(SignatureError::MissingRequiredHeader(required.clone()));
        }
    }

    for name in &header_names {
        if !parts.headers.contains_key(name.as_str()) {
            return Err(SignatureError::MissingRequiredHeader(name.clone()));
        }
    }

    if let Some(lifetime) = policy.request_lifetime {
        check_freshness(parts, lifetime)?;
    }

    let signature = BASE64
        .decode(signature_text)
        .map_err(|_| SignatureError::MalformedAuthorization)?;

    let algorithm = Algorithm::resolve(algorithm_name)
        .ok_or_else(|| SignatureError::UnsupportedAlgorithm(algorithm_name.to_owned()))?;

    debug!(
        key_id,
        algorithm = algorithm.name(),
        covered = ?header_names,
        "parsed signature header"
    );

    Ok(SignatureDescriptor {
        key_id: key_id.to_owned(),
        algorithm,
        header_names,
        signature,
    })
}

/// Split a `key="value"` attribute list into pairs.
///
/// Values are opaque until the closing quote; commas and equals signs
/// inside quotes are preserved verbatim. Whitespace before and after the
/// separating commas is ignored.
fn parse_attributes(input: &str) -> Result<Vec<(&str, &str)>, SignatureError> {
    let mut attributes = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let eq = rest.find('=').ok_or(SignatureError::MalformedAuthorization)?;
        let name = rest[..eq].trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(SignatureError::MalformedAuthorization);
        }

        let value_and_rest = rest[eq + 1..]
            .strip_prefix('"')
            .ok_or(SignatureError::MalformedAuthorization)?;
        let close = value_and_rest
            .find('"')
            .ok_or(SignatureError::MalformedAuthorization)?;
        attributes.push((name, &value_and_rest[..close]));

        rest = value_and_rest[close + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
            if rest.is_empty() {
                // A trailing comma with nothing after it.
                return Err(SignatureError::MalformedAuthorization);
            }
        } else if !rest.is_empty() {
            return Err(SignatureError::MalformedAuthorization);
        }
    }

    Ok(attributes)
}

/// Enforce the freshness window on the request `date` header.
///
/// The check is symmetric: a request dated too far in the past and one
/// dated too far in the future (clock skew) are rejected the same way.
fn check_freshness(parts: &http::request::Parts, lifetime: u64) -> Result<(), SignatureError> {
    let date = parts
        .headers
        .get(http::header::DATE)
        .ok_or_else(|| SignatureError::MissingRequiredHeader("date".to_owned()))?
        .to_str()
        .map_err(|_| SignatureError::ExpiredRequest)?;

    let signed_at =
        DateTime::parse_from_rfc2822(date).map_err(|_| SignatureError::ExpiredRequest)?;

    let window =
        TimeDelta::seconds(i64::try_from(lifetime).map_err(|_| SignatureError::ExpiredRequest)?);
    let skew = Utc::now().signed_duration_since(signed_at).abs();

    if skew > window {
        return Err(SignatureError::ExpiredRequest);
    }

    Ok(())
}

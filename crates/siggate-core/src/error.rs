//! Error taxonomy for signature signing and verification.
//!
//! Every failure path in this crate yields exactly one of these variants;
//! nothing is silently swallowed. All parse-stage variants are produced
//! before any cryptographic work happens, and the verifier is never invoked
//! without a fully validated descriptor.

/// Errors produced while signing or verifying a request signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The `Authorization` header is absent, uses the wrong scheme, its
    /// attribute list cannot be parsed, or the signature text is not valid
    /// base64.
    #[error("missing or malformed Authorization header")]
    MalformedAuthorization,

    /// A policy-required header is not covered by the signature, or a header
    /// named in the signature is absent from the request.
    #[error("missing required header: {0}")]
    MissingRequiredHeader(String),

    /// The `algorithm` attribute names an algorithm that is not registered.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The request `date` is outside the allowed lifetime window.
    #[error("request date is outside the allowed lifetime window")]
    ExpiredRequest,

    /// The secret resolver reported an error for the key ID. Distinct from
    /// [`SignatureError::BadSignature`] so callers can tell an unknown
    /// client from an invalid signature; at the HTTP boundary both map to
    /// the same generic denial.
    #[error("secret resolution failed: {0}")]
    Unauthorized(String),

    /// The secret resolved but the recomputed digest does not match.
    #[error("signature does not match")]
    BadSignature,

    /// The resolver yielded no error but an empty secret. This is a
    /// misconfigured resolver, not a bad request, and maps to a server
    /// fault rather than a denial.
    #[error("secret resolver returned an empty secret for key ID: {0}")]
    ResolverContract(String),

    /// A signer was constructed with an empty key ID.
    #[error("key ID must not be empty")]
    EmptyKeyId,

    /// Signing was attempted with no headers to cover.
    #[error("at least one header must be signed")]
    EmptyHeaders,
}

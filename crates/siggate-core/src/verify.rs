//! Server-side signature verification.
//!
//! [`verify_signature`] is the pure compare step: rebuild the signing
//! string, recompute the digest, compare in constant time.
//! [`verify_request`] is the full per-request flow: parse the header,
//! await secret resolution, then verify.

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::signing_string_from_request;
use crate::error::SignatureError;
use crate::parse::{SignatureDescriptor, parse_request};
use crate::policy::VerifyPolicy;
use crate::resolver::{Credentials, SecretResolver};

/// Recompute the expected digest for `descriptor` against the request and
/// compare it to the transported signature.
///
/// The signing string is rebuilt exactly as the signer built it, sourcing
/// each covered header's value from the request in descriptor order. The
/// comparison runs over the decoded bytes in constant time: it does not
/// leak where the first mismatching byte occurs. Any mismatch, including a
/// length mismatch, yields `false`.
///
/// # Errors
///
/// Returns [`SignatureError::MissingRequiredHeader`] if a covered header is
/// absent from the request. [`parse_request`] has already checked this, so
/// the error only fires when the descriptor and request do not belong
/// together.
pub fn verify_signature(
    descriptor: &SignatureDescriptor,
    parts: &http::request::Parts,
    secret: &str,
) -> Result<bool, SignatureError> {
    let signing_string = signing_string_from_request(&descriptor.header_names, &parts.headers)?;
    let expected = descriptor
        .algorithm
        .digest(secret.as_bytes(), signing_string.as_bytes());

    Ok(expected.ct_eq(&descriptor.signature).into())
}

/// Full server-side verification flow: parse, resolve, verify.
///
/// The resolver call is the only await point. If resolution fails the
/// verifier is never invoked and the request is rejected with
/// [`SignatureError::Unauthorized`]; a resolver that succeeds with an empty
/// secret is reported as [`SignatureError::ResolverContract`]. On success
/// the resolved credentials are returned for the caller to attach to the
/// request.
///
/// # Errors
///
/// Any [`SignatureError`] from parsing, resolution, or comparison. A clean
/// digest mismatch is [`SignatureError::BadSignature`].
pub async fn verify_request(
    parts: &http::request::Parts,
    policy: &VerifyPolicy,
    resolver: &dyn SecretResolver,
) -> Result<Credentials, SignatureError> {
    let descriptor = parse_request(parts, policy)?;

    let resolved = resolver
        .resolve(&descriptor.key_id)
        .await
        .map_err(|err| SignatureError::Unauthorized(err.to_string()))?;

    if resolved.secret.is_empty() {
        return Err(SignatureError::ResolverContract(descriptor.key_id));
    }

    if !verify_signature(&descriptor, parts, &resolved.secret)? {
        debug!(key_id = %descriptor.key_id, "signature mismatch");
        return Err(SignatureError::BadSignature);
    }

    debug!(key_id = %descriptor.key_id, "signature verified");
    Ok(resolved.credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{BoxError, ResolvedSecret, StaticSecretResolver};
    use crate::sign::Signer;

    const SECRET: &str = "s3cr3t";
    const KEY_ID: &str = "client-1";
    const FIXED_DATE: &str = "Tue, 07 Jun 2014 20:51:35 GMT";

    fn no_lifetime() -> VerifyPolicy {
        VerifyPolicy {
            request_lifetime: None,
            ..VerifyPolicy::default()
        }
    }

    fn signed_request(headers: &[(&str, &str)]) -> http::request::Parts {
        let signer = Signer::new(KEY_ID, SECRET).unwrap();
        let pairs: Vec<(String, String)> = headers
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        let signed = signer.sign_headers(&pairs).unwrap();

        let mut builder = http::Request::builder().method("GET").uri("/resource");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if !headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("date")) {
            builder = builder.header("date", &signed.date);
        }
        let (parts, ()) = builder
            .header(http::header::AUTHORIZATION, &signed.authorization)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn test_resolver() -> StaticSecretResolver {
        StaticSecretResolver::new(vec![(KEY_ID.to_owned(), SECRET.to_owned())])
    }

    #[test]
    fn test_should_verify_round_trip() {
        let parts = signed_request(&[("date", FIXED_DATE)]);
        let descriptor = parse_request(&parts, &no_lifetime()).unwrap();
        assert!(verify_signature(&descriptor, &parts, SECRET).unwrap());
    }

    #[test]
    fn test_should_verify_known_signature_vector() {
        let auth = format!(
            "Signature keyId=\"{KEY_ID}\",algorithm=\"hmac-sha256\",headers=\"date\",\
             signature=\"Lx1U92xNQ7NGvBG4kseHaZ4qzFTYMZOcicQzk+/PXPc=\""
        );
        let (parts, ()) = http::Request::builder()
            .method("GET")
            .uri("/resource")
            .header("date", FIXED_DATE)
            .header(http::header::AUTHORIZATION, &auth)
            .body(())
            .unwrap()
            .into_parts();

        let descriptor = parse_request(&parts, &no_lifetime()).unwrap();
        assert!(verify_signature(&descriptor, &parts, SECRET).unwrap());
        assert!(!verify_signature(&descriptor, &parts, "wrong").unwrap());
    }

    #[test]
    fn test_should_reject_tampered_header_value() {
        let mut parts = signed_request(&[("date", FIXED_DATE), ("digest", "SHA-256=abc")]);
        let descriptor = parse_request(&parts, &no_lifetime()).unwrap();
        assert!(verify_signature(&descriptor, &parts, SECRET).unwrap());

        // Flip one byte of a covered header after signing.
        parts
            .headers
            .insert("digest", "SHA-256=abd".parse().unwrap());
        assert!(!verify_signature(&descriptor, &parts, SECRET).unwrap());
    }

    #[test]
    fn test_should_reject_wrong_secret() {
        let parts = signed_request(&[("date", FIXED_DATE)]);
        let descriptor = parse_request(&parts, &no_lifetime()).unwrap();
        assert!(!verify_signature(&descriptor, &parts, "not-the-secret").unwrap());
    }

    #[test]
    fn test_should_reject_truncated_signature() {
        let parts = signed_request(&[("date", FIXED_DATE)]);
        let mut descriptor = parse_request(&parts, &no_lifetime()).unwrap();

        // A length mismatch is false, not an error.
        descriptor.signature.pop();
        assert!(!verify_signature(&descriptor, &parts, SECRET).unwrap());
    }

    #[tokio::test]
    async fn test_should_verify_full_request_flow() {
        let parts = signed_request(&[("date", FIXED_DATE)]);
        let credentials = verify_request(&parts, &no_lifetime(), &test_resolver())
            .await
            .unwrap();
        assert_eq!(
            credentials,
            Credentials(serde_json::json!({ "keyId": KEY_ID }))
        );
    }

    #[tokio::test]
    async fn test_should_map_resolver_failure_to_unauthorized() {
        let parts = signed_request(&[("date", FIXED_DATE)]);
        let resolver = StaticSecretResolver::new(vec![]);

        let result = verify_request(&parts, &no_lifetime(), &resolver).await;
        assert!(matches!(result, Err(SignatureError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_should_map_wrong_secret_to_bad_signature() {
        let parts = signed_request(&[("date", FIXED_DATE)]);
        let resolver =
            StaticSecretResolver::new(vec![(KEY_ID.to_owned(), "other".to_owned())]);

        let result = verify_request(&parts, &no_lifetime(), &resolver).await;
        assert!(matches!(result, Err(SignatureError::BadSignature)));
    }

    #[tokio::test]
    async fn test_should_escalate_empty_secret_as_contract_violation() {
        struct EmptySecretResolver;

        #[async_trait::async_trait]
        impl SecretResolver for EmptySecretResolver {
            async fn resolve(&self, _key_id: &str) -> Result<ResolvedSecret, BoxError> {
                Ok(ResolvedSecret {
                    secret: String::new(),
                    credentials: Credentials(serde_json::Value::Null),
                })
            }
        }

        let parts = signed_request(&[("date", FIXED_DATE)]);
        let result = verify_request(&parts, &no_lifetime(), &EmptySecretResolver).await;
        assert!(matches!(
            result,
            Err(SignatureError::ResolverContract(key_id)) if key_id == KEY_ID
        ));
    }

    #[tokio::test]
    async fn test_should_not_resolve_secret_for_malformed_request() {
        // A resolver that panics proves parsing failures short-circuit
        // before resolution.
        struct PanickingResolver;

        #[async_trait::async_trait]
        impl SecretResolver for PanickingResolver {
            async fn resolve(&self, _key_id: &str) -> Result<ResolvedSecret, BoxError> {
                panic!("resolver must not be called for malformed requests");
            }
        }

        let (parts, ()) = http::Request::builder()
            .method("GET")
            .uri("/resource")
            .body(())
            .unwrap()
            .into_parts();

        let result = verify_request(&parts, &no_lifetime(), &PanickingResolver).await;
        assert!(matches!(result, Err(SignatureError::MalformedAuthorization)));
    }
}

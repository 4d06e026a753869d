//! Denial response construction.
//!
//! Every per-request verification failure maps to the same generic 401
//! body, so an external caller cannot tell an unknown key from a bad
//! signature; the specific error kind is only logged. A resolver contract
//! violation is a configuration fault and maps to 500 instead.

use siggate_core::SignatureError;
use tracing::{debug, error};

use crate::body::GateBody;

/// Content type for gate-produced denial bodies.
pub const CONTENT_TYPE: &str = "application/json";

/// Convert a verification failure into a complete HTTP response.
#[must_use]
pub fn denial_response<B>(err: &SignatureError) -> http::Response<GateBody<B>> {
    let (status, message) = match err {
        SignatureError::ResolverContract(_) => {
            error!(error = %err, "secret resolver violated its contract");
            (http::StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
        _ => {
            debug!(error = %err, "rejecting request");
            (http::StatusCode::UNAUTHORIZED, "unauthorized")
        }
    };

    let json = serde_json::to_vec(&serde_json::json!({ "message": message }))
        .expect("JSON serialization of denial cannot fail");

    let mut builder = http::Response::builder()
        .status(status)
        .header("content-type", CONTENT_TYPE);
    if status == http::StatusCode::UNAUTHORIZED {
        builder = builder.header("www-authenticate", "Signature");
    }

    builder
        .body(GateBody::denial(json))
        .expect("valid denial response")
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use http_body_util::{BodyExt, Full};

    async fn body_bytes(response: http::Response<GateBody<Full<Bytes>>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_should_map_verification_failures_to_401() {
        for err in [
            SignatureError::MalformedAuthorization,
            SignatureError::MissingRequiredHeader("date".to_owned()),
            SignatureError::UnsupportedAlgorithm("rsa-sha256".to_owned()),
            SignatureError::ExpiredRequest,
            SignatureError::Unauthorized("unknown key".to_owned()),
            SignatureError::BadSignature,
        ] {
            let response: http::Response<GateBody<Full<Bytes>>> = denial_response(&err);
            assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.headers().get("www-authenticate").unwrap(),
                "Signature"
            );
        }
    }

    #[tokio::test]
    async fn test_should_not_distinguish_unknown_key_from_bad_signature() {
        let unknown: http::Response<GateBody<Full<Bytes>>> =
            denial_response(&SignatureError::Unauthorized("unknown key".to_owned()));
        let mismatch: http::Response<GateBody<Full<Bytes>>> =
            denial_response(&SignatureError::BadSignature);

        assert_eq!(unknown.status(), mismatch.status());
        assert_eq!(body_bytes(unknown).await, body_bytes(mismatch).await);
    }

    #[tokio::test]
    async fn test_should_map_resolver_contract_violation_to_500() {
        let response: http::Response<GateBody<Full<Bytes>>> =
            denial_response(&SignatureError::ResolverContract("client-1".to_owned()));
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get("www-authenticate").is_none());
    }
}

//! Client-side request signing.
//!
//! A [`Signer`] is bound to one key ID, secret, and algorithm. Signing a
//! set of header values produces the finished `Authorization` and `date`
//! header pair for an outgoing request; the server rebuilds the identical
//! signing string from those headers during verification.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use tracing::debug;

use crate::algorithm::{Algorithm, DEFAULT_ALGORITHM};
use crate::canonical::signing_string_from_pairs;
use crate::error::SignatureError;
use crate::parse::SCHEME;

/// HTTP-date (IMF-fixdate) format used for generated `date` headers.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The header pair emitted by [`Signer::sign_headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Complete `Authorization` header value.
    pub authorization: String,
    /// The `date` header value bound into the signature. Must be sent on
    /// the request unchanged.
    pub date: String,
}

/// Client-side signer bound to one key ID, secret, and algorithm.
///
/// # Examples
///
/// ```
/// use siggate_core::sign::Signer;
///
/// let signer = Signer::new("client-1", "s3cr3t").unwrap();
/// let signed = signer
///     .sign_headers(&[("date".to_owned(), "Tue, 07 Jun 2014 20:51:35 GMT".to_owned())])
///     .unwrap();
/// assert!(signed.authorization.starts_with("Signature keyId=\"client-1\""));
/// ```
#[derive(Clone)]
pub struct Signer {
    key_id: String,
    secret: String,
    algorithm: &'static Algorithm,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("key_id", &self.key_id)
            .field("secret", &"...")
            .field("algorithm", &self.algorithm.name())
            .finish()
    }
}

impl Signer {
    /// Create a signer using the default algorithm (`hmac-sha256`).
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::EmptyKeyId`] if `key_id` is empty.
    pub fn new(
        key_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, SignatureError> {
        Self::with_algorithm(key_id, secret, DEFAULT_ALGORITHM)
    }

    /// Create a signer using a named registered algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::EmptyKeyId`] if `key_id` is empty, or
    /// [`SignatureError::UnsupportedAlgorithm`] if `algorithm` is not
    /// registered.
    pub fn with_algorithm(
        key_id: impl Into<String>,
        secret: impl Into<String>,
        algorithm: &str,
    ) -> Result<Self, SignatureError> {
        let key_id = key_id.into();
        if key_id.is_empty() {
            return Err(SignatureError::EmptyKeyId);
        }

        let algorithm = Algorithm::resolve(algorithm)
            .ok_or_else(|| SignatureError::UnsupportedAlgorithm(algorithm.to_owned()))?;

        Ok(Self {
            key_id,
            secret: secret.into(),
            algorithm,
        })
    }

    /// Sign the given header values, producing the `Authorization` and
    /// `date` header pair for an outgoing request.
    ///
    /// The pairs are signed in the order given. If no `date` entry is
    /// supplied the current time is appended as the final pair. The date is
    /// always part of the signed content, so re-signing the same headers at
    /// a different time yields a different signature.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::EmptyHeaders`] if `pairs` is empty.
    pub fn sign_headers(
        &self,
        pairs: &[(String, String)],
    ) -> Result<SignedHeaders, SignatureError> {
        if pairs.is_empty() {
            return Err(SignatureError::EmptyHeaders);
        }

        let mut covered = pairs.to_vec();
        let date = match covered
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("date"))
        {
            Some((_, value)) => value.clone(),
            None => {
                let now = Utc::now().format(HTTP_DATE_FORMAT).to_string();
                covered.push(("date".to_owned(), now.clone()));
                now
            }
        };

        let signing_string = signing_string_from_pairs(&covered);
        let digest = self
            .algorithm
            .digest(self.secret.as_bytes(), signing_string.as_bytes());
        let signature = BASE64.encode(digest);

        let names = covered
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let authorization = format!(
            "{SCHEME} keyId=\"{}\",algorithm=\"{}\",headers=\"{names}\",signature=\"{signature}\"",
            self.key_id,
            self.algorithm.name(),
        );

        debug!(
            key_id = %self.key_id,
            algorithm = self.algorithm.name(),
            headers = %names,
            "signed request headers"
        );

        Ok(SignedHeaders {
            authorization,
            date,
        })
    }
}

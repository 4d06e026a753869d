//! Secret resolution seam.
//!
//! The verifier never looks up secrets itself: the key ID extracted from
//! the `Authorization` header is handed to a [`SecretResolver`], which may
//! hit a database, a configuration store, or a KMS. Resolution is the only
//! suspension point in the per-request verification flow; multiple requests
//! may have resolutions in flight concurrently and no ordering is imposed
//! between them.

use std::collections::HashMap;

/// Boxed error type returned by resolver implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Opaque credential payload returned by the resolver alongside the secret.
///
/// The verification core never interprets it; the middleware attaches it to
/// the request extensions so downstream handlers can identify the caller.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Credentials(pub serde_json::Value);

/// A resolved secret and its attached credentials.
#[derive(Clone)]
pub struct ResolvedSecret {
    /// The shared secret for the key ID.
    pub secret: String,
    /// Opaque credentials attached to the request on success.
    pub credentials: Credentials,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("secret", &"...")
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Trait for asynchronously resolving the shared secret for a key ID.
///
/// Implementations may back this with any credential store and may perform
/// I/O; the core imposes no timeout on the call. A resolver that succeeds
/// but yields an empty secret violates the contract and is reported as a
/// configuration fault, not a per-request rejection.
///
/// # Object safety
///
/// Uses `#[async_trait]` so implementations can be used behind
/// `Arc<dyn SecretResolver>`.
#[async_trait::async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolve the secret and credentials for `key_id`.
    ///
    /// # Errors
    ///
    /// Any error returned here surfaces as
    /// [`SignatureError::Unauthorized`](crate::SignatureError::Unauthorized)
    /// and the request is rejected without running signature verification.
    async fn resolve(&self, key_id: &str) -> Result<ResolvedSecret, BoxError>;
}

/// In-memory resolver backed by a `HashMap`.
///
/// Suitable for tests and development. For production use, implement
/// [`SecretResolver`] against a real credential store.
///
/// # Examples
///
/// ```
/// use siggate_core::resolver::StaticSecretResolver;
///
/// let resolver = StaticSecretResolver::new(vec![
///     ("client-1".to_owned(), "s3cr3t".to_owned()),
/// ]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSecretResolver {
    secrets: HashMap<String, String>,
}

impl StaticSecretResolver {
    /// Create a resolver from `(key_id, secret)` pairs.
    pub fn new(secrets: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            secrets: secrets.into_iter().collect(),
        }
    }

    /// Number of registered key IDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether the resolver has no registered key IDs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

#[async_trait::async_trait]
impl SecretResolver for StaticSecretResolver {
    async fn resolve(&self, key_id: &str) -> Result<ResolvedSecret, BoxError> {
        let secret = self
            .secrets
            .get(key_id)
            .cloned()
            .ok_or_else(|| format!("unknown key ID: {key_id}"))?;

        Ok(ResolvedSecret {
            secret,
            credentials: Credentials(serde_json::json!({ "keyId": key_id })),
        })
    }
}

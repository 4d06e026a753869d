//! Signature gate implementing the hyper `Service` trait.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use siggate_core::{SecretResolver, VerifyPolicy, verify_request};

use crate::body::GateBody;
use crate::response::denial_response;

/// Configuration for the signature gate.
#[derive(Clone)]
pub struct SignatureGateConfig {
    /// Policy applied to every verified request.
    pub policy: VerifyPolicy,
    /// Resolver used to look up secrets by key ID.
    pub resolver: Arc<dyn SecretResolver>,
}

impl fmt::Debug for SignatureGateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureGateConfig")
            .field("policy", &self.policy)
            .field("resolver", &"...")
            .finish()
    }
}

/// Hyper `Service` that verifies request signatures before forwarding to
/// an inner service.
///
/// On success the resolved [`siggate_core::Credentials`] are inserted into
/// the request extensions for downstream handlers and the request is
/// forwarded. On failure the inner service is never invoked and the gate
/// responds itself. CORS preflight requests that declare `authorization`
/// among their requested headers pass through unverified; the follow-up
/// actual request carries the signature.
#[derive(Debug)]
pub struct SignatureGateService<S> {
    inner: S,
    config: Arc<SignatureGateConfig>,
}

impl<S> SignatureGateService<S> {
    /// Wrap `inner` with signature verification.
    pub fn new(inner: S, config: SignatureGateConfig) -> Self {
        Self {
            inner,
            config: Arc::new(config),
        }
    }
}

impl<S: Clone> Clone for SignatureGateService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, B, RB> hyper::service::Service<http::Request<B>> for SignatureGateService<S>
where
    S: hyper::service::Service<http::Request<B>, Response = http::Response<RB>>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
    B: Send + 'static,
{
    type Response = http::Response<GateBody<RB>>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            if is_preflight_bypass(&req) {
                debug!("preflight request declares authorization, bypassing verification");
                let response = inner.call(req).await?;
                return Ok(response.map(GateBody::inner));
            }

            let (parts, body) = req.into_parts();
            match verify_request(&parts, &config.policy, config.resolver.as_ref()).await {
                Ok(credentials) => {
                    let mut req = http::Request::from_parts(parts, body);
                    req.extensions_mut().insert(credentials);
                    let response = inner.call(req).await?;
                    Ok(response.map(GateBody::inner))
                }
                Err(err) => Ok(denial_response(&err)),
            }
        })
    }
}

/// Whether `req` is a CORS preflight that declares `authorization` among
/// its requested headers.
fn is_preflight_bypass<B>(req: &http::Request<B>) -> bool {
    if req.method() != http::Method::OPTIONS {
        return false;
    }

    req.headers()
        .get("access-control-request-headers")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .split(',')
                .any(|name| name.trim().eq_ignore_ascii_case("authorization"))
        })
}

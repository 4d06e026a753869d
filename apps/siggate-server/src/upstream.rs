//! Built-in upstream service protected by the gate.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;

use siggate_core::Credentials;

/// Upstream echoing the request line and the resolved credentials.
///
/// Stands in for a real backend: it demonstrates how downstream handlers
/// consume the [`Credentials`] extension the gate attaches to verified
/// requests.
#[derive(Debug, Clone, Default)]
pub struct EchoService;

impl hyper::service::Service<http::Request<Incoming>> for EchoService {
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        Box::pin(async move { Ok(echo_response(&req)) })
    }
}

/// Build the echo response for a verified request.
fn echo_response<B>(req: &http::Request<B>) -> http::Response<Full<Bytes>> {
    let credentials = req
        .extensions()
        .get::<Credentials>()
        .map_or(serde_json::Value::Null, |creds| creds.0.clone());

    let json = serde_json::to_vec(&serde_json::json!({
        "method": req.method().as_str(),
        "path": req.uri().path(),
        "credentials": credentials,
    }))
    .expect("JSON serialization of echo response cannot fail");

    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", "application/json")
        .header("server", "SigGate")
        .body(Full::new(Bytes::from(json)))
        .expect("valid echo response")
}

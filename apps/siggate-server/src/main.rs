//! SigGate Server - signature-authenticating HTTP gateway.
//!
//! This binary terminates HTTP, verifies the `Signature` authorization
//! scheme on every incoming request, and forwards verified requests to the
//! built-in echo upstream with the resolved credentials attached.
//!
//! # Usage
//!
//! ```text
//! SIGGATE_KEYS="client-1:s3cr3t" GATEWAY_LISTEN=0.0.0.0:8686 siggate-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:8686` | Bind address |
//! | `SIGGATE_KEYS` | *(required)* | Comma-separated `keyId:secret` pairs |
//! | `REQUIRED_HEADERS` | `date` | Headers every signature must cover |
//! | `REQUEST_LIFETIME` | `300` | Freshness window in seconds (`none` disables) |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod config;
mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use siggate_core::{StaticSecretResolver, VerifyPolicy};
use siggate_http::{SignatureGateConfig, SignatureGateService};

use crate::config::GatewayConfig;
use crate::upstream::EchoService;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config
/// value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the gate service from the loaded configuration.
fn build_gate(config: &GatewayConfig) -> SignatureGateService<EchoService> {
    let resolver = Arc::new(StaticSecretResolver::new(config.keys.clone()));
    info!(keys = resolver.len(), "configured static secret resolver");

    let policy = VerifyPolicy {
        required_headers: config.required_headers.clone(),
        request_lifetime: config.request_lifetime,
    };

    SignatureGateService::new(EchoService, SignatureGateConfig { policy, resolver })
}

/// Run the accept loop, serving connections until a shutdown signal is
/// received.
async fn serve(listener: TcpListener, service: SignatureGateService<EchoService>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env()?;
    init_tracing(&config.log_level)?;

    if config.keys.is_empty() {
        anyhow::bail!(
            "no signing keys configured. Set SIGGATE_KEYS to a comma-separated \
             list of keyId:secret pairs."
        );
    }

    let gate = build_gate(&config);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        required_headers = ?config.required_headers,
        request_lifetime = ?config.request_lifetime,
        version = VERSION,
        "starting SigGate server",
    );

    serve(listener, gate).await
}

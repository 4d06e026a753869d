//! Symmetric-key HTTP request signing and verification for SigGate.
//!
//! This crate implements both sides of the `Signature` authorization
//! scheme: a client-side [`Signer`] builds a canonical string from selected
//! request header values, computes a keyed hash over it, and embeds the
//! result in an `Authorization` header; the server-side parser and verifier
//! reconstruct the same canonical string from an incoming request,
//! recompute the expected hash using a secret resolved from the embedded
//! key ID, and accept the request only if the hashes match and the request
//! is fresh.
//!
//! # Usage
//!
//! ```
//! use siggate_core::{Signer, VerifyPolicy, parse_request, verify_signature};
//!
//! // Client side: sign the headers of an outgoing request.
//! let signer = Signer::new("client-1", "s3cr3t").unwrap();
//! let signed = signer
//!     .sign_headers(&[("date".to_owned(), "Tue, 07 Jun 2014 20:51:35 GMT".to_owned())])
//!     .unwrap();
//!
//! // Server side: parse the incoming request, then verify against the
//! // secret resolved for the key ID.
//! let (parts, ()) = http::Request::builder()
//!     .method("GET")
//!     .uri("/resource")
//!     .header("date", &signed.date)
//!     .header(http::header::AUTHORIZATION, &signed.authorization)
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//!
//! let policy = VerifyPolicy {
//!     request_lifetime: None,
//!     ..VerifyPolicy::default()
//! };
//! let descriptor = parse_request(&parts, &policy).unwrap();
//! assert!(verify_signature(&descriptor, &parts, "s3cr3t").unwrap());
//! ```
//!
//! # Modules
//!
//! - [`algorithm`] - Frozen registry of keyed-hash algorithms
//! - [`canonical`] - Canonical signing-string construction
//! - [`error`] - The [`SignatureError`] taxonomy
//! - [`parse`] - `Authorization` header parsing into a [`SignatureDescriptor`]
//! - [`policy`] - Verification policy (required headers, freshness window)
//! - [`resolver`] - Asynchronous secret resolution seam
//! - [`sign`] - Client-side signing
//! - [`verify`] - Digest comparison and the full verification flow

pub mod algorithm;
pub mod canonical;
pub mod error;
pub mod parse;
pub mod policy;
pub mod resolver;
pub mod sign;
pub mod verify;

pub use algorithm::Algorithm;
pub use error::SignatureError;
pub use parse::{SignatureDescriptor, parse_request};
pub use policy::VerifyPolicy;
pub use resolver::{BoxError, Credentials, ResolvedSecret, SecretResolver, StaticSecretResolver};
pub use sign::{SignedHeaders, Signer};
pub use verify::{verify_request, verify_signature};

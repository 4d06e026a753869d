//! Signature-verifying HTTP middleware layer for SigGate.
//!
//! Wires the verification core into a hyper request/response pipeline:
//! [`SignatureGateService`] verifies each incoming request before the
//! protected inner service runs, attaches the resolved credentials to the
//! request extensions on success, and answers with a generic denial on
//! failure.
//!
//! # Modules
//!
//! - [`body`] - The [`GateBody`] response body type
//! - [`response`] - Denial response construction
//! - [`service`] - The [`SignatureGateService`] middleware

pub mod body;
pub mod response;
pub mod service;

pub use body::GateBody;
pub use service::{SignatureGateConfig, SignatureGateService};

//! Keyed-hash algorithm registry.
//!
//! Maps wire-format algorithm names (as they appear in the `algorithm`
//! attribute of the `Authorization` header) to their MAC implementations.
//! The registry is a frozen `static` table built at compile time: adding an
//! algorithm means adding an entry here, never branching on the name
//! anywhere else in the crate.

use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// The algorithm used by signers that do not specify one.
pub const DEFAULT_ALGORITHM: &str = "hmac-sha256";

/// A named keyed-hash algorithm.
///
/// The digest function takes a secret and a message and returns a
/// fixed-length digest; the output length depends on the underlying hash.
#[derive(Debug)]
pub struct Algorithm {
    name: &'static str,
    digest: fn(secret: &[u8], message: &[u8]) -> Vec<u8>,
}

/// Every algorithm recognized in the `algorithm` attribute.
static REGISTRY: &[Algorithm] = &[
    Algorithm {
        name: "hmac-sha1",
        digest: digest_sha1,
    },
    Algorithm {
        name: "hmac-sha256",
        digest: digest_sha256,
    },
    Algorithm {
        name: "hmac-sha512",
        digest: digest_sha512,
    },
];

impl Algorithm {
    /// Look up an algorithm by its wire name.
    ///
    /// Unknown names return `None`; callers treat that as a hard failure,
    /// never as a fallback to some default.
    #[must_use]
    pub fn resolve(name: &str) -> Option<&'static Algorithm> {
        REGISTRY.iter().find(|algorithm| algorithm.name == name)
    }

    /// The wire name of this algorithm.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Compute the digest of `message` keyed by `secret`.
    #[must_use]
    pub fn digest(&self, secret: &[u8], message: &[u8]) -> Vec<u8> {
        (self.digest)(secret, message)
    }
}

fn digest_sha1(secret: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC can accept keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

fn digest_sha256(secret: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can accept keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

fn digest_sha512(secret: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC can accept keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

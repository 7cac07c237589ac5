//! Signature algorithm families and their header policy.
//!
//! The algorithm family decides how a signature is anchored in time: the
//! symmetric HMAC family signs a wall-clock `Date` header, while the
//! self-dated asymmetric family (`hs2019`) carries `(created)`/`(expires)`
//! pseudo-headers in the signing string instead.

use sha2::{Digest, Sha256, Sha384, Sha512};

/// Hash function used for keyed-hash signing and body digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Canonical uppercase hyphenated name used on the wire, e.g. in the
    /// `Digest` header.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Hash the given bytes.
    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// Signature algorithm: a closed set of symmetric and asymmetric families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// Symmetric keyed hash over a shared secret (`hmac-sha256` etc.).
    Hmac(HashAlgorithm),
    /// Asymmetric Ed25519 signing, advertised as `hs2019` on the wire.
    Ed25519,
}

impl SignatureAlgorithm {
    /// The algorithm name used in the `algorithm="..."` wire parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hmac(HashAlgorithm::Sha256) => "hmac-sha256",
            Self::Hmac(HashAlgorithm::Sha384) => "hmac-sha384",
            Self::Hmac(HashAlgorithm::Sha512) => "hmac-sha512",
            Self::Ed25519 => "hs2019",
        }
    }

    /// Parse a wire algorithm name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hmac-sha256" => Some(Self::Hmac(HashAlgorithm::Sha256)),
            "hmac-sha384" => Some(Self::Hmac(HashAlgorithm::Sha384)),
            "hmac-sha512" => Some(Self::Hmac(HashAlgorithm::Sha512)),
            "hs2019" => Some(Self::Ed25519),
            _ => None,
        }
    }

    /// Whether this family anchors its signature to a wall-clock `Date`
    /// header. Families that return `false` carry their validity window as
    /// `(created)`/`(expires)` pseudo-headers instead.
    pub fn uses_wall_clock_date(&self) -> bool {
        match self {
            Self::Hmac(_) => true,
            Self::Ed25519 => false,
        }
    }

    /// The hash function underlying this algorithm. Ed25519 hashes with
    /// SHA-512 internally.
    pub fn hash(&self) -> HashAlgorithm {
        match self {
            Self::Hmac(hash) => *hash,
            Self::Ed25519 => HashAlgorithm::Sha512,
        }
    }
}

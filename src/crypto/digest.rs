//! Body digest computation and validation.
//!
//! The `Digest` header binds body integrity to the signature: its value is
//! part of the signing string, so tampering with the body invalidates the
//! signature as long as the digest itself is checked against the body.

use crate::crypto::algorithm::HashAlgorithm;
use crate::errors::HttpSealError;
use base64::{engine::general_purpose::STANDARD, Engine};
use subtle::ConstantTimeEq;

/// Compute a `Digest` header value: `<ALGO-NAME>=<base64-hash>`.
pub fn digest_header_value(hash: HashAlgorithm, body: &[u8]) -> String {
    format!("{}={}", hash.wire_name(), STANDARD.encode(hash.hash(body)))
}

/// Split a `Digest` header value into its algorithm and base64 hash.
pub fn parse_digest_header(value: &str) -> Option<(HashAlgorithm, &str)> {
    let (name, hash_b64) = value.trim().split_once('=')?;
    let algorithm = match name.to_ascii_uppercase().as_str() {
        "SHA-256" => HashAlgorithm::Sha256,
        "SHA-384" => HashAlgorithm::Sha384,
        "SHA-512" => HashAlgorithm::Sha512,
        _ => return None,
    };
    Some((algorithm, hash_b64))
}

/// Check a `Digest` header value against the raw body bytes.
///
/// The comparison of the recomputed and claimed hashes is constant-time.
/// A malformed header or unknown digest algorithm counts as a mismatch.
pub fn verify_digest(body: &[u8], digest_header: &str) -> Result<(), HttpSealError> {
    let Some((algorithm, claimed_b64)) = parse_digest_header(digest_header) else {
        return Err(HttpSealError::DigestMismatch);
    };
    let Ok(claimed) = STANDARD.decode(claimed_b64) else {
        return Err(HttpSealError::DigestMismatch);
    };

    let computed = algorithm.hash(body);
    if computed.ct_eq(&claimed).into() {
        Ok(())
    } else {
        Err(HttpSealError::DigestMismatch)
    }
}

//! Credential identity and key material.
//!
//! Key material is held only as long as a signing or verification operation
//! needs it and never appears in logs; [`Secret`]'s `Debug` output is
//! redacted.

use crate::crypto::algorithm::{HashAlgorithm, SignatureAlgorithm};
use crate::errors::HttpSealError;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Opaque, case-sensitive identifier naming a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(String);

impl KeyId {
    /// Create a key id from its exact string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Shared secret bytes for the HMAC family.
#[derive(Clone)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn reveal(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Key material a client uses to produce signatures.
#[derive(Clone)]
pub enum SigningKeyMaterial {
    /// Shared secret for the HMAC family.
    Hmac(Secret),
    /// Ed25519 signing key for the `hs2019` family.
    Ed25519(SigningKey),
}

impl SigningKeyMaterial {
    /// Decode an Ed25519 signing key from 64 hex characters.
    pub fn ed25519_from_hex(hex_key: &str) -> Result<Self, HttpSealError> {
        let bytes = hex::decode(hex_key)
            .map_err(|e| HttpSealError::Validation(format!("Invalid signing key hex: {}", e)))?;
        let key_array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| HttpSealError::Validation("Signing key must be 32 bytes".to_owned()))?;
        Ok(Self::Ed25519(SigningKey::from_bytes(&key_array)))
    }

    /// Whether this material fits the given algorithm family.
    pub fn matches(&self, algorithm: SignatureAlgorithm) -> bool {
        matches!(
            (self, algorithm),
            (Self::Hmac(_), SignatureAlgorithm::Hmac(_))
                | (Self::Ed25519(_), SignatureAlgorithm::Ed25519)
        )
    }
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hmac(_) => f.write_str("SigningKeyMaterial::Hmac(***)"),
            Self::Ed25519(_) => f.write_str("SigningKeyMaterial::Ed25519(***)"),
        }
    }
}

/// Key material the server uses to validate signatures.
#[derive(Clone)]
pub enum VerificationKeyMaterial {
    /// The same shared secret the client signs with.
    Hmac(Secret),
    /// Ed25519 public key for the `hs2019` family.
    Ed25519(VerifyingKey),
}

impl VerificationKeyMaterial {
    /// Decode an Ed25519 public key from 64 hex characters.
    pub fn ed25519_from_hex(hex_key: &str) -> Result<Self, HttpSealError> {
        let bytes = hex::decode(hex_key)
            .map_err(|e| HttpSealError::Validation(format!("Invalid public key hex: {}", e)))?;
        let key_array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| HttpSealError::Validation("Public key must be 32 bytes".to_owned()))?;
        let key = VerifyingKey::from_bytes(&key_array)
            .map_err(|e| HttpSealError::Validation(format!("Invalid Ed25519 public key: {}", e)))?;
        Ok(Self::Ed25519(key))
    }

    /// Whether this material fits the given algorithm family.
    pub fn matches(&self, algorithm: SignatureAlgorithm) -> bool {
        matches!(
            (self, algorithm),
            (Self::Hmac(_), SignatureAlgorithm::Hmac(_))
                | (Self::Ed25519(_), SignatureAlgorithm::Ed25519)
        )
    }
}

impl fmt::Debug for VerificationKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hmac(_) => f.write_str("VerificationKeyMaterial::Hmac(***)"),
            Self::Ed25519(_) => f.write_str("VerificationKeyMaterial::Ed25519(pub)"),
        }
    }
}

/// Compute the raw signature bytes over a composed signing string.
pub fn compute_signature(
    algorithm: SignatureAlgorithm,
    key: &SigningKeyMaterial,
    signing_string: &str,
) -> Result<Vec<u8>, HttpSealError> {
    match (algorithm, key) {
        (SignatureAlgorithm::Hmac(hash), SigningKeyMaterial::Hmac(secret)) => {
            Ok(hmac_tag(hash, secret, signing_string.as_bytes()))
        }
        (SignatureAlgorithm::Ed25519, SigningKeyMaterial::Ed25519(signing_key)) => {
            Ok(signing_key.sign(signing_string.as_bytes()).to_bytes().to_vec())
        }
        _ => Err(HttpSealError::Validation(format!(
            "Key material does not fit algorithm '{}'",
            algorithm.name()
        ))),
    }
}

/// Validate claimed signature bytes against a composed signing string.
///
/// HMAC tags are checked with the constant-time comparison of the `hmac`
/// crate; Ed25519 verification is inherently comparison-free.
pub fn verify_signature(
    algorithm: SignatureAlgorithm,
    key: &VerificationKeyMaterial,
    signing_string: &str,
    claimed: &[u8],
) -> Result<(), HttpSealError> {
    match (algorithm, key) {
        (SignatureAlgorithm::Hmac(hash), VerificationKeyMaterial::Hmac(secret)) => {
            verify_hmac_tag(hash, secret, signing_string.as_bytes(), claimed)
        }
        (SignatureAlgorithm::Ed25519, VerificationKeyMaterial::Ed25519(public_key)) => {
            let sig_array: [u8; 64] = claimed
                .try_into()
                .map_err(|_| HttpSealError::InvalidSignature)?;
            let signature = Signature::from_bytes(&sig_array);
            public_key
                .verify(signing_string.as_bytes(), &signature)
                .map_err(|_| HttpSealError::InvalidSignature)
        }
        _ => Err(HttpSealError::Validation(format!(
            "Key material does not fit algorithm '{}'",
            algorithm.name()
        ))),
    }
}

fn hmac_tag(hash: HashAlgorithm, secret: &Secret, message: &[u8]) -> Vec<u8> {
    match hash {
        HashAlgorithm::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(secret.reveal())
                .expect("HMAC accepts any key length");
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
        HashAlgorithm::Sha384 => {
            let mut mac = HmacSha384::new_from_slice(secret.reveal())
                .expect("HMAC accepts any key length");
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
        HashAlgorithm::Sha512 => {
            let mut mac = HmacSha512::new_from_slice(secret.reveal())
                .expect("HMAC accepts any key length");
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

fn verify_hmac_tag(
    hash: HashAlgorithm,
    secret: &Secret,
    message: &[u8],
    claimed: &[u8],
) -> Result<(), HttpSealError> {
    let outcome = match hash {
        HashAlgorithm::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(secret.reveal())
                .expect("HMAC accepts any key length");
            mac.update(message);
            mac.verify_slice(claimed)
        }
        HashAlgorithm::Sha384 => {
            let mut mac = HmacSha384::new_from_slice(secret.reveal())
                .expect("HMAC accepts any key length");
            mac.update(message);
            mac.verify_slice(claimed)
        }
        HashAlgorithm::Sha512 => {
            let mut mac = HmacSha512::new_from_slice(secret.reveal())
                .expect("HMAC accepts any key length");
            mac.update(message);
            mac.verify_slice(claimed)
        }
    };
    outcome.map_err(|_| HttpSealError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test keypair (DO NOT USE IN PRODUCTION)
    const TEST_PRIVATE_KEY_HEX: &str =
        "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const TEST_PUBLIC_KEY_HEX: &str =
        "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    #[test]
    fn key_id_is_case_sensitive() {
        assert_eq!(KeyId::new("id1"), KeyId::from("id1"));
        assert_ne!(KeyId::new("id1"), KeyId::new("Id1"));
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new(b"s3cr3t".to_vec());
        assert_eq!(format!("{:?}", secret), "Secret(***)");
    }

    #[test]
    fn signing_key_debug_is_redacted() {
        let key = SigningKeyMaterial::Hmac(Secret::new(b"s3cr3t".to_vec()));
        assert!(!format!("{:?}", key).contains("s3cr3t"));
    }

    #[test]
    fn hmac_sign_verify_round_trip() {
        let algorithm = SignatureAlgorithm::Hmac(HashAlgorithm::Sha256);
        let secret = Secret::new(b"s3cr3t".to_vec());
        let signing = SigningKeyMaterial::Hmac(secret.clone());
        let verification = VerificationKeyMaterial::Hmac(secret);

        let tag = compute_signature(algorithm, &signing, "the signing string").unwrap();
        verify_signature(algorithm, &verification, "the signing string", &tag).unwrap();
    }

    #[test]
    fn hmac_verify_rejects_tampered_string() {
        let algorithm = SignatureAlgorithm::Hmac(HashAlgorithm::Sha512);
        let secret = Secret::new(b"s3cr3t".to_vec());
        let signing = SigningKeyMaterial::Hmac(secret.clone());
        let verification = VerificationKeyMaterial::Hmac(secret);

        let tag = compute_signature(algorithm, &signing, "the signing string").unwrap();
        let result = verify_signature(algorithm, &verification, "another string", &tag);
        assert!(matches!(result, Err(HttpSealError::InvalidSignature)));
    }

    #[test]
    fn hmac_verify_rejects_wrong_secret() {
        let algorithm = SignatureAlgorithm::Hmac(HashAlgorithm::Sha256);
        let signing = SigningKeyMaterial::Hmac(Secret::new(b"s3cr3t".to_vec()));
        let verification = VerificationKeyMaterial::Hmac(Secret::new(b"other".to_vec()));

        let tag = compute_signature(algorithm, &signing, "the signing string").unwrap();
        let result = verify_signature(algorithm, &verification, "the signing string", &tag);
        assert!(matches!(result, Err(HttpSealError::InvalidSignature)));
    }

    #[test]
    fn ed25519_sign_verify_round_trip() {
        let signing = SigningKeyMaterial::ed25519_from_hex(TEST_PRIVATE_KEY_HEX).unwrap();
        let verification = VerificationKeyMaterial::ed25519_from_hex(TEST_PUBLIC_KEY_HEX).unwrap();

        let sig = compute_signature(SignatureAlgorithm::Ed25519, &signing, "payload").unwrap();
        verify_signature(SignatureAlgorithm::Ed25519, &verification, "payload", &sig).unwrap();
    }

    #[test]
    fn ed25519_verify_rejects_wrong_length() {
        let verification = VerificationKeyMaterial::ed25519_from_hex(TEST_PUBLIC_KEY_HEX).unwrap();
        let result = verify_signature(SignatureAlgorithm::Ed25519, &verification, "payload", b"abc");
        assert!(matches!(result, Err(HttpSealError::InvalidSignature)));
    }

    #[test]
    fn ed25519_verify_rejects_zero_signature() {
        let verification = VerificationKeyMaterial::ed25519_from_hex(TEST_PUBLIC_KEY_HEX).unwrap();
        let result =
            verify_signature(SignatureAlgorithm::Ed25519, &verification, "payload", &[0u8; 64]);
        assert!(matches!(result, Err(HttpSealError::InvalidSignature)));
    }

    #[test]
    fn mismatched_material_fails_validation_before_crypto() {
        let algorithm = SignatureAlgorithm::Hmac(HashAlgorithm::Sha256);
        let signing = SigningKeyMaterial::ed25519_from_hex(TEST_PRIVATE_KEY_HEX).unwrap();
        let result = compute_signature(algorithm, &signing, "payload");
        assert!(matches!(result, Err(HttpSealError::Validation(_))));
    }

    #[test]
    fn invalid_hex_key_is_rejected() {
        assert!(matches!(
            VerificationKeyMaterial::ed25519_from_hex("not-hex"),
            Err(HttpSealError::Validation(_))
        ));
        assert!(matches!(
            VerificationKeyMaterial::ed25519_from_hex("0000"),
            Err(HttpSealError::Validation(_))
        ));
    }
}

//! Per-client signing configuration.

use crate::canonical::target::RequestTargetEscaping;
use crate::crypto::algorithm::{HashAlgorithm, SignatureAlgorithm};
use crate::crypto::material::{KeyId, SigningKeyMaterial};
use crate::errors::HttpSealError;
use crate::header::HeaderName;
use std::time::Duration;

/// Settings controlling how outgoing requests are signed.
///
/// Construct with [`SigningSettings::new`] for the named defaults, then
/// adjust fields as needed. Invalid settings fail fast when the signer is
/// created.
#[derive(Debug, Clone)]
pub struct SigningSettings {
    /// Identifier of the credential, echoed as `keyId` on the wire.
    pub key_id: KeyId,

    /// Key material used to produce signatures.
    pub key: SigningKeyMaterial,

    /// The signature algorithm.
    pub algorithm: SignatureAlgorithm,

    /// Ordered header list to sign. The sanitizer appends whatever the
    /// algorithm's policy additionally requires; entries listed here are
    /// never removed.
    pub headers: Vec<HeaderName>,

    /// Hash for the body digest header; `None` disables digest injection.
    pub digest: Option<HashAlgorithm>,

    /// Validity duration of produced signatures.
    pub expires: Duration,

    /// Escaping applied to the request target when composing.
    pub request_target_escaping: RequestTargetEscaping,
}

impl SigningSettings {
    /// Default signature validity: five minutes.
    pub const DEFAULT_EXPIRES: Duration = Duration::from_secs(5 * 60);

    /// Create settings with the named defaults: empty header list (the
    /// sanitizer fills in the required entries), SHA-256 body digest,
    /// five-minute validity, RFC 3986 request-target escaping.
    pub fn new(key_id: KeyId, key: SigningKeyMaterial, algorithm: SignatureAlgorithm) -> Self {
        Self {
            key_id,
            key,
            algorithm,
            headers: Vec::new(),
            digest: Some(HashAlgorithm::Sha256),
            expires: Self::DEFAULT_EXPIRES,
            request_target_escaping: RequestTargetEscaping::default(),
        }
    }

    /// Validate the settings for obvious errors.
    pub fn validate(&self) -> Result<(), HttpSealError> {
        if self.key_id.is_empty() {
            return Err(HttpSealError::Validation(
                "key_id cannot be empty".to_owned(),
            ));
        }
        if let SigningKeyMaterial::Hmac(secret) = &self.key {
            if secret.is_empty() {
                return Err(HttpSealError::Validation(
                    "HMAC secret cannot be empty".to_owned(),
                ));
            }
        }
        if !self.key.matches(self.algorithm) {
            return Err(HttpSealError::Validation(format!(
                "Key material does not fit algorithm '{}'",
                self.algorithm.name()
            )));
        }
        if self.expires.is_zero() {
            return Err(HttpSealError::Validation(
                "expires duration cannot be zero".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::material::Secret;

    fn hmac_settings() -> SigningSettings {
        SigningSettings::new(
            KeyId::new("client1"),
            SigningKeyMaterial::Hmac(Secret::new(b"s3cr3t".to_vec())),
            SignatureAlgorithm::Hmac(HashAlgorithm::Sha256),
        )
    }

    #[test]
    fn defaults_are_sane() {
        let settings = hmac_settings();
        assert_eq!(settings.expires, Duration::from_secs(300));
        assert_eq!(settings.digest, Some(HashAlgorithm::Sha256));
        assert_eq!(settings.request_target_escaping, RequestTargetEscaping::Rfc3986);
        assert!(settings.headers.is_empty());
        settings.validate().unwrap();
    }

    #[test]
    fn empty_key_id_fails_validation() {
        let mut settings = hmac_settings();
        settings.key_id = KeyId::new("");
        assert!(matches!(settings.validate(), Err(HttpSealError::Validation(_))));
    }

    #[test]
    fn empty_secret_fails_validation() {
        let mut settings = hmac_settings();
        settings.key = SigningKeyMaterial::Hmac(Secret::new(Vec::new()));
        assert!(matches!(settings.validate(), Err(HttpSealError::Validation(_))));
    }

    #[test]
    fn mismatched_key_and_algorithm_fail_validation() {
        let mut settings = hmac_settings();
        settings.algorithm = SignatureAlgorithm::Ed25519;
        assert!(matches!(settings.validate(), Err(HttpSealError::Validation(_))));
    }

    #[test]
    fn zero_expires_fails_validation() {
        let mut settings = hmac_settings();
        settings.expires = Duration::ZERO;
        assert!(matches!(settings.validate(), Err(HttpSealError::Validation(_))));
    }
}

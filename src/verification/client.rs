//! Registered clients: the server-side credential records.

use crate::canonical::target::RequestTargetEscaping;
use crate::crypto::algorithm::SignatureAlgorithm;
use crate::crypto::material::{KeyId, Secret, VerificationKeyMaterial};
use crate::errors::HttpSealError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// An additional assertion attached to a client, surfaced to the caller on
/// successful verification for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// The claim kind, e.g. `"role"`.
    pub kind: String,
    /// The claim value, e.g. `"admin"`.
    pub value: String,
}

impl Claim {
    /// Create a claim.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Optional client settings with named defaults.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// How long a registered nonce blocks reuse.
    pub nonce_lifetime: Duration,
    /// Allowed clock drift between signer and verifier.
    pub clock_skew: Duration,
    /// Escaping applied to the request target when rebuilding the signing string.
    pub request_target_escaping: RequestTargetEscaping,
    /// Claims surfaced on successful verification.
    pub claims: Vec<Claim>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            nonce_lifetime: Client::DEFAULT_NONCE_LIFETIME,
            clock_skew: Client::DEFAULT_CLOCK_SKEW,
            request_target_escaping: RequestTargetEscaping::default(),
            claims: Vec::new(),
        }
    }
}

/// A registered client credential.
///
/// Created by registration, read on every verification, never mutated after
/// registration; replace via re-registration. The id is the durable
/// identity: equality and hashing consider only the id, case-sensitively.
#[derive(Debug, Clone)]
pub struct Client {
    id: KeyId,
    name: String,
    algorithm: SignatureAlgorithm,
    key: VerificationKeyMaterial,
    nonce_lifetime: Duration,
    clock_skew: Duration,
    request_target_escaping: RequestTargetEscaping,
    claims: Vec<Claim>,
}

impl Client {
    /// Default nonce lifetime: five minutes.
    pub const DEFAULT_NONCE_LIFETIME: Duration = Duration::from_secs(5 * 60);

    /// Default clock skew tolerance: one minute.
    pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(60);

    /// Register a client with default options.
    pub fn new(
        id: KeyId,
        name: impl Into<String>,
        algorithm: SignatureAlgorithm,
        key: VerificationKeyMaterial,
    ) -> Result<Self, HttpSealError> {
        Self::with_options(id, name, algorithm, key, ClientOptions::default())
    }

    /// Register a client with explicit options.
    pub fn with_options(
        id: KeyId,
        name: impl Into<String>,
        algorithm: SignatureAlgorithm,
        key: VerificationKeyMaterial,
        options: ClientOptions,
    ) -> Result<Self, HttpSealError> {
        let name = name.into();
        if id.is_empty() {
            return Err(HttpSealError::Validation("client id cannot be empty".to_owned()));
        }
        if name.is_empty() {
            return Err(HttpSealError::Validation("client name cannot be empty".to_owned()));
        }
        if let VerificationKeyMaterial::Hmac(secret) = &key {
            if secret.is_empty() {
                return Err(HttpSealError::Validation(
                    "HMAC secret cannot be empty".to_owned(),
                ));
            }
        }
        if !key.matches(algorithm) {
            return Err(HttpSealError::Validation(format!(
                "Key material does not fit algorithm '{}'",
                algorithm.name()
            )));
        }
        if options.nonce_lifetime.is_zero() {
            return Err(HttpSealError::Validation(
                "nonce lifetime cannot be zero".to_owned(),
            ));
        }
        Ok(Self {
            id,
            name,
            algorithm,
            key,
            nonce_lifetime: options.nonce_lifetime,
            clock_skew: options.clock_skew,
            request_target_escaping: options.request_target_escaping,
            claims: options.claims,
        })
    }

    /// Create an HMAC client from a shared secret, with default options.
    pub fn hmac(
        id: KeyId,
        name: impl Into<String>,
        algorithm: SignatureAlgorithm,
        secret: Secret,
    ) -> Result<Self, HttpSealError> {
        Self::new(id, name, algorithm, VerificationKeyMaterial::Hmac(secret))
    }

    /// The client identifier.
    pub fn id(&self) -> &KeyId {
        &self.id
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The algorithm this client signs with.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// The verification key material.
    pub fn key(&self) -> &VerificationKeyMaterial {
        &self.key
    }

    /// How long a registered nonce blocks reuse.
    pub fn nonce_lifetime(&self) -> Duration {
        self.nonce_lifetime
    }

    /// Allowed clock drift between signer and verifier.
    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// Escaping applied when rebuilding the request target.
    pub fn request_target_escaping(&self) -> RequestTargetEscaping {
        self.request_target_escaping
    }

    /// Claims surfaced on successful verification.
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Client {}

impl Hash for Client {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

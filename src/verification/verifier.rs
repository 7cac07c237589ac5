//! Server-side signature verification.
//!
//! One verification attempt walks a fixed sequence of stages; the first
//! failing stage is terminal. Callers get a uniform failure value so that
//! nothing about the failing stage leaks to an untrusted peer; the typed
//! reason stays available for diagnostics and is logged at `debug`.

use crate::canonical::compose::compose_signing_string;
use crate::clock::{Clock, SystemClock};
use crate::crypto::digest::verify_digest;
use crate::crypto::material::verify_signature;
use crate::errors::HttpSealError;
use crate::request::HttpRequest;
use crate::verification::client::Client;
use crate::verification::client_store::ClientStore;
use crate::verification::nonce::{Nonce, NonceStore};
use crate::wire::{Signature, AUTHORIZATION_SCHEME};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A successfully verified request: the resolved client and the signature
/// that was validated. The client's claims drive authorization decisions in
/// the calling layer.
#[derive(Debug, Clone)]
pub struct VerifiedRequest {
    /// The resolved client credential.
    pub client: Client,
    /// The validated signature as claimed on the wire.
    pub signature: Signature,
}

/// Uniform verification failure.
///
/// Displays only a generic message; the typed reason is retained for
/// diagnostics via [`VerificationFailure::kind`] and must not be echoed back
/// to an untrusted peer.
#[derive(Debug)]
pub struct VerificationFailure {
    kind: HttpSealError,
}

impl VerificationFailure {
    fn new(kind: HttpSealError) -> Self {
        Self { kind }
    }

    /// The specific reason this attempt failed, for diagnostics only.
    pub fn kind(&self) -> &HttpSealError {
        &self.kind
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("signature verification failed")
    }
}

impl std::error::Error for VerificationFailure {}

/// Verifies signed requests against registered clients and the nonce ledger.
pub struct SignatureVerifier {
    clients: Arc<dyn ClientStore>,
    nonces: Arc<dyn NonceStore>,
    clock: Arc<dyn Clock>,
}

impl SignatureVerifier {
    /// Create a verifier on the system clock.
    pub fn new(clients: Arc<dyn ClientStore>, nonces: Arc<dyn NonceStore>) -> Self {
        Self::with_clock(clients, nonces, Arc::new(SystemClock))
    }

    /// Create a verifier reading time from a custom clock.
    pub fn with_clock(
        clients: Arc<dyn ClientStore>,
        nonces: Arc<dyn NonceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            clients,
            nonces,
            clock,
        }
    }

    /// Verify the request's `Authorization` signature.
    ///
    /// On success the resolved client (with its claims) is surfaced for
    /// authorization decisions.
    pub async fn verify(
        &self,
        request: &HttpRequest,
    ) -> Result<VerifiedRequest, VerificationFailure> {
        match self.verify_stages(request).await {
            Ok(verified) => Ok(verified),
            Err(reason) => {
                debug!(reason = %reason, "signature verification failed");
                Err(VerificationFailure::new(reason))
            }
        }
    }

    async fn verify_stages(
        &self,
        request: &HttpRequest,
    ) -> Result<VerifiedRequest, HttpSealError> {
        // Parse
        let authorization = request.header("authorization").ok_or_else(|| {
            HttpSealError::MalformedSignature("Authorization header missing".to_owned())
        })?;
        let (scheme, param) = authorization.split_once(' ').ok_or_else(|| {
            HttpSealError::MalformedSignature("Authorization header has no parameter".to_owned())
        })?;
        if !scheme.eq_ignore_ascii_case(AUTHORIZATION_SCHEME) {
            return Err(HttpSealError::MalformedSignature(format!(
                "unexpected authorization scheme '{}'",
                scheme
            )));
        }
        let signature = Signature::parse_authorization_param(param)?;

        // ResolveClient
        let client = self
            .clients
            .get(&signature.key_id)
            .await?
            .ok_or_else(|| HttpSealError::UnregisteredClient {
                key_id: signature.key_id.to_string(),
            })?;

        // The claimed algorithm must be the one the client registered with.
        if client.algorithm() != signature.algorithm {
            return Err(HttpSealError::InvalidSignature);
        }

        // RebuildString, from the claimed header list and timestamps. A
        // header claimed but absent on the live request fails here.
        let signing_string = compose_signing_string(
            request,
            &signature.headers,
            client.request_target_escaping(),
            signature.created,
            signature.expires,
        )?;

        // Body integrity, when the request carries both a body and a digest.
        if let (Some(body), Some(digest_header)) = (request.body(), request.header("digest")) {
            if !body.is_empty() {
                verify_digest(body, &digest_header)?;
            }
        }

        // CheckCrypto
        let claimed = STANDARD.decode(&signature.signature).map_err(|_| {
            HttpSealError::MalformedSignature("signature value is not valid base64".to_owned())
        })?;
        verify_signature(client.algorithm(), client.key(), &signing_string, &claimed)?;

        // CheckTimeWindow: created − skew ≤ now ≤ expires + skew, inclusive.
        let now = self.clock.now_utc();
        let skew = chrono::Duration::seconds(client.clock_skew().as_secs() as i64);
        if now < signature.created - skew {
            return Err(HttpSealError::NotYetValid {
                seconds_early: (signature.created - now).num_seconds(),
            });
        }
        if now > signature.expires + skew {
            return Err(HttpSealError::Expired {
                seconds_late: (now - signature.expires).num_seconds(),
            });
        }

        // CheckReplay
        if let Some(value) = &signature.nonce {
            let lifetime = chrono::Duration::seconds(client.nonce_lifetime().as_secs() as i64);
            let nonce = Nonce::new(signature.key_id.clone(), value.clone(), now + lifetime);
            self.nonces.register(nonce).await?;
        }

        Ok(VerifiedRequest { client, signature })
    }
}

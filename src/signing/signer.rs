//! Request signing: the client-side entry point.

use crate::canonical::compose::compose_signing_string;
use crate::clock::{Clock, SystemClock};
use crate::crypto::material::compute_signature;
use crate::errors::HttpSealError;
use crate::request::HttpRequest;
use crate::signing::ensure::{ensure_date_header, ensure_digest_header};
use crate::signing::sanitize::sanitize_headers;
use crate::signing::settings::SigningSettings;
use crate::wire::{Signature, AUTHORIZATION_SCHEME};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Signs outgoing requests and injects the `Authorization` header.
///
/// Create one per credential and reuse it for all requests signed under that
/// credential; signing itself is stateless.
pub struct RequestSigner {
    settings: SigningSettings,
    clock: Arc<dyn Clock>,
}

impl RequestSigner {
    /// Create a signer, validating the settings eagerly.
    pub fn new(settings: SigningSettings) -> Result<Self, HttpSealError> {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create a signer reading time from a custom clock.
    pub fn with_clock(
        settings: SigningSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, HttpSealError> {
        settings.validate()?;
        Ok(Self { settings, clock })
    }

    /// Sign the request and set its `Authorization` header.
    ///
    /// The time of signing is captured once; the produced record carries
    /// `created` = time of signing and `expires` = time of signing plus the
    /// configured validity duration. Returns the signature that was applied.
    pub fn sign(&self, request: &mut HttpRequest) -> Result<Signature, HttpSealError> {
        self.sign_with_nonce(request, None)
    }

    /// Sign the request, carrying a caller-supplied single-use nonce in the
    /// signature for server-side replay protection.
    pub fn sign_with_nonce(
        &self,
        request: &mut HttpRequest,
        nonce: Option<String>,
    ) -> Result<Signature, HttpSealError> {
        self.settings.validate()?;

        let time_of_signing = truncate_to_seconds(self.clock.now_utc());
        let headers = sanitize_headers(&self.settings, request);
        ensure_date_header(request, &headers, time_of_signing);
        ensure_digest_header(request, &self.settings);

        let created = time_of_signing;
        let expires = created + chrono::Duration::seconds(self.settings.expires.as_secs() as i64);

        let signing_string = compose_signing_string(
            request,
            &headers,
            self.settings.request_target_escaping,
            created,
            expires,
        )?;

        let raw = compute_signature(self.settings.algorithm, &self.settings.key, &signing_string)?;

        let signature = Signature {
            key_id: self.settings.key_id.clone(),
            algorithm: self.settings.algorithm,
            created,
            expires,
            nonce,
            headers,
            signature: STANDARD.encode(raw),
        };

        let param = signature.to_authorization_param();
        debug!(key_id = %signature.key_id, "setting Authorization header");
        request.set_header(
            "Authorization",
            format!("{} {}", AUTHORIZATION_SCHEME, param),
        );

        Ok(signature)
    }
}

/// Drop sub-second precision so the record round-trips through the wire's
/// Unix-seconds fields without loss.
fn truncate_to_seconds(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(instant.timestamp(), 0).unwrap_or(instant)
}

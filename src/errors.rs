//! Httpseal error types.

use thiserror::Error;

/// Errors that can occur while signing or verifying HTTP messages.
#[derive(Debug, Error)]
pub enum HttpSealError {
    /// Settings or client configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// The Authorization signature parameter could not be parsed.
    #[error("Malformed signature parameter: {0}")]
    MalformedSignature(String),

    /// A header named in the signing-string header list is absent from the request.
    #[error("Header '{header}' is required for the signing string but missing from the request")]
    HeaderMissing {
        /// The header that was named but absent.
        header: String,
    },

    /// No client is registered under the claimed key id.
    #[error("No client registered for key id '{key_id}'")]
    UnregisteredClient {
        /// The key id that failed to resolve.
        key_id: String,
    },

    /// The claimed signature does not match the recomputed value.
    #[error("Signature does not match the computed value")]
    InvalidSignature,

    /// The Digest header does not match the request body.
    #[error("Digest header does not match the request body")]
    DigestMismatch,

    /// The signature's creation time is in the future beyond the allowed clock skew.
    #[error("Signature is not yet valid (created {seconds_early}s in the future)")]
    NotYetValid {
        /// How far in the future the creation time lies, in seconds.
        seconds_early: i64,
    },

    /// The signature's expiration time has passed beyond the allowed clock skew.
    #[error("Signature expired {seconds_late}s ago")]
    Expired {
        /// How long ago the signature expired, in seconds.
        seconds_late: i64,
    },

    /// The nonce was already used by this client within its lifetime.
    #[error("Nonce was already used within its lifetime")]
    ReplayedRequest,

    /// The bounded wait for exclusive store access was exceeded.
    #[error("Timed out waiting for exclusive store access")]
    LockTimeout,

    /// A backing store failed.
    #[error("Store error: {0}")]
    Store(String),
}

//! # Httpseal
//!
//! **Hardened HTTP message signing and verification for Rust.**
//!
//! Httpseal signs outgoing HTTP requests in the draft-cavage
//! HTTP-signatures style and verifies them on the receiving side: a sender
//! composes a canonical signing string from selected request parts, signs
//! it with a shared secret or an Ed25519 key, and carries the result in the
//! `Authorization` header; the receiver rebuilds the exact same string,
//! validates the signature against the registered client's key material,
//! and rejects stale, replayed or tampered requests.
//!
//! ## Features
//!
//! - **HMAC and Ed25519 signatures** — symmetric `hmac-sha256/384/512` and
//!   asymmetric `hs2019` families with per-family header policy
//! - **Body digests** — `Digest: SHA-256=<base64>` injection bound into the
//!   signing string, so body tampering invalidates the signature
//! - **Time-window enforcement** — `created`/`expires` with per-client
//!   clock-skew tolerance
//! - **Replay protection** — a per-client nonce ledger with an
//!   exclusive-access decorator for non-atomic backing stores
//! - **Cached client resolution** — a TTL cache with single-flighted misses
//!   over any pluggable client store
//! - **Fail-closed verification** — every failing stage is terminal, and
//!   callers see a uniform failure that leaks nothing to the peer
//!
//! ## Signing a request
//!
//! ```no_run
//! use httpseal::{
//!     HashAlgorithm, HttpRequest, KeyId, Method, RequestSigner, Secret,
//!     SignatureAlgorithm, SigningKeyMaterial, SigningSettings,
//! };
//!
//! fn main() -> Result<(), httpseal::HttpSealError> {
//!     let settings = SigningSettings::new(
//!         KeyId::new("client1"),
//!         SigningKeyMaterial::Hmac(Secret::new(b"s3cr3t".to_vec())),
//!         SignatureAlgorithm::Hmac(HashAlgorithm::Sha256),
//!     );
//!     let signer = RequestSigner::new(settings)?;
//!
//!     let mut request = HttpRequest::new(Method::Post, "/api/resource/id1")
//!         .with_body(b"abc123".to_vec());
//!     signer.sign(&mut request)?;
//!
//!     assert!(request.header("authorization").is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Verifying a request
//!
//! ```no_run
//! use httpseal::{
//!     Client, ClientStore, HashAlgorithm, InMemoryClientStore, InMemoryNonceStore,
//!     KeyId, LockingNonceStore, Secret, SignatureAlgorithm, SignatureVerifier,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), httpseal::HttpSealError> {
//!     let clients = Arc::new(InMemoryClientStore::new());
//!     clients
//!         .register(Client::hmac(
//!             KeyId::new("client1"),
//!             "My API consumer",
//!             SignatureAlgorithm::Hmac(HashAlgorithm::Sha256),
//!             Secret::new(b"s3cr3t".to_vec()),
//!         )?)
//!         .await?;
//!
//!     let nonces = Arc::new(LockingNonceStore::new(Arc::new(InMemoryNonceStore::new())));
//!     let verifier = SignatureVerifier::new(clients, nonces);
//!
//!     # let request = httpseal::HttpRequest::new(httpseal::Method::Get, "/");
//!     match verifier.verify(&request).await {
//!         Ok(verified) => println!("authenticated client {}", verified.client),
//!         Err(failure) => eprintln!("{}", failure),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Threat model
//!
//! Httpseal protects against:
//! - **Tampered requests** — any signed part (target, headers, body via
//!   digest) fails verification when modified
//! - **Replayed requests** — nonces are single-use per client within their
//!   lifetime; stale signatures fall outside the time window
//! - **Stage oracles** — verification failures surface one uniform message;
//!   the specific reason is kept for server-side diagnostics only
//!
//! Httpseal does **not** provide transport security; run it over TLS. Key
//! distribution and storage are the application's concern.
//!
//! ## Configuration
//!
//! - [`SigningSettings`] — algorithm, header list, digest hash, validity
//!   duration, request-target escaping (client side)
//! - [`Client`] / [`ClientOptions`] — key material, nonce lifetime, clock
//!   skew, escaping mode, claims (server side)

#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/httpseal/0.1.0")]

// Core modules
pub mod clock;
pub mod errors;
pub mod header;
pub mod request;

// Crypto layer
pub mod crypto;

// Canonicalization
pub mod canonical;

// Wire format
pub mod wire;

// Client side
pub mod signing;

// Server side
pub mod verification;

// Re-exports for public API
pub use canonical::target::RequestTargetEscaping;
pub use clock::{Clock, SystemClock};
pub use crypto::algorithm::{HashAlgorithm, SignatureAlgorithm};
pub use crypto::material::{KeyId, Secret, SigningKeyMaterial, VerificationKeyMaterial};
pub use errors::HttpSealError;
pub use header::HeaderName;
pub use request::{HttpRequest, Method};
pub use signing::{RequestSigner, SigningSettings};
pub use verification::{
    CachingClientStore, Claim, Client, ClientOptions, ClientStore, InMemoryClientStore,
    InMemoryNonceStore, LockingNonceStore, Nonce, NonceStore, SignatureVerifier,
    VerificationFailure, VerifiedRequest,
};
pub use wire::{Signature, AUTHORIZATION_SCHEME};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;

//! Server side: client records, stores, the nonce ledger and the verifier.

pub mod client;
pub mod client_store;
pub mod nonce;
pub mod verifier;

pub use client::{Claim, Client, ClientOptions};
pub use client_store::{CachingClientStore, ClientStore, InMemoryClientStore};
pub use nonce::{InMemoryNonceStore, LockingNonceStore, Nonce, NonceStore};
pub use verifier::{SignatureVerifier, VerificationFailure, VerifiedRequest};

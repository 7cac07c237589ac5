//! Cryptographic layer: algorithm families, key material and body digests.

pub mod algorithm;
pub mod digest;
pub mod material;

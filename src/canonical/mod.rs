//! Canonical signing-string construction.

pub mod compose;
pub mod target;

pub use compose::compose_signing_string;
pub use target::RequestTargetEscaping;

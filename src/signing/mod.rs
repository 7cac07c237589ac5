//! Client side: settings, header policy, and request signing.

pub mod ensure;
pub mod sanitize;
pub mod settings;
pub mod signer;

pub use settings::SigningSettings;
pub use signer::RequestSigner;

//! Header names as they appear in the signing-string header list.
//!
//! A header list mixes ordinary HTTP header names with the pseudo-headers
//! `(request-target)`, `(created)` and `(expires)`. Names are
//! case-insensitive; list order is significant and defines the order of the
//! signing-string lines.

use std::fmt;

/// A single entry of a signing-string header list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeaderName {
    /// The `(request-target)` pseudo-header: lowercase method plus escaped path.
    RequestTarget,
    /// The `(created)` pseudo-header: Unix timestamp of the time of signing.
    Created,
    /// The `(expires)` pseudo-header: Unix timestamp of the signature expiry.
    Expires,
    /// An ordinary HTTP header, case-folded to lowercase.
    Header(String),
}

impl HeaderName {
    /// Parse a raw token into a header name.
    ///
    /// Pseudo-header tokens map to their dedicated variants; everything else
    /// becomes an ordinary header name, case-folded.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "(request-target)" => Self::RequestTarget,
            "(created)" => Self::Created,
            "(expires)" => Self::Expires,
            other => Self::Header(other.to_ascii_lowercase()),
        }
    }

    /// Construct an ordinary header name, case-folded.
    pub fn header(name: &str) -> Self {
        Self::Header(name.to_ascii_lowercase())
    }

    /// The `date` header.
    pub fn date() -> Self {
        Self::Header("date".to_owned())
    }

    /// The `digest` header.
    pub fn digest() -> Self {
        Self::Header("digest".to_owned())
    }

    /// The canonical lowercase token for this name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::RequestTarget => "(request-target)",
            Self::Created => "(created)",
            Self::Expires => "(expires)",
            Self::Header(name) => name,
        }
    }

    /// Whether this is one of the pseudo-headers.
    pub fn is_pseudo(&self) -> bool {
        !matches!(self, Self::Header(_))
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

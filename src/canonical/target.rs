//! Request-target escaping for the `(request-target)` pseudo-header.
//!
//! The surrogate carries the decoded target; the active escaping mode decides
//! how it is re-encoded when the signing string is composed. Signer and
//! verifier must agree on the mode or the canonical strings diverge.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters percent-encoded in a request target under RFC 3986: everything
/// except unreserved characters, sub-delims, and `:`/`@`/`/`/`?`.
const RFC3986_TARGET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@')
    .remove(b'/')
    .remove(b'?');

/// RFC 2396-era escaping additionally leaves `[` and `]` literal.
const RFC2396_TARGET: &AsciiSet = &RFC3986_TARGET.remove(b'[').remove(b']');

/// The escaping convention applied to the request target when composing the
/// `(request-target)` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestTargetEscaping {
    /// Re-encode the decoded target per RFC 2396.
    Rfc2396,
    /// Re-encode the decoded target per RFC 3986.
    #[default]
    Rfc3986,
    /// Use the target exactly as carried on the request.
    Unescaped,
}

/// Render the decoded request target under the given escaping mode.
pub fn escape_target(path: &str, mode: RequestTargetEscaping) -> String {
    match mode {
        RequestTargetEscaping::Rfc2396 => utf8_percent_encode(path, RFC2396_TARGET).to_string(),
        RequestTargetEscaping::Rfc3986 => utf8_percent_encode(path, RFC3986_TARGET).to_string(),
        RequestTargetEscaping::Unescaped => path.to_owned(),
    }
}

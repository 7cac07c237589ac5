//! The canonical signing-string composer.
//!
//! Composition is a pure function of the request, the ordered header list,
//! the escaping mode and the two anchoring timestamps. Signer and verifier
//! run the exact same composition; any divergence shows up as a signature
//! mismatch.

use crate::canonical::target::{escape_target, RequestTargetEscaping};
use crate::errors::HttpSealError;
use crate::header::HeaderName;
use crate::request::HttpRequest;
use chrono::{DateTime, Utc};

/// Compose the canonical signing string.
///
/// One line per header-list entry, in order:
/// - `(request-target): <method-lowercase> <escaped-target>`
/// - `(created): <unix-seconds>` / `(expires): <unix-seconds>`
/// - `<lowercase-name>: <value>` for ordinary headers, joining repeated
///   values with `", "`.
///
/// Lines are joined with `\n` and there is no trailing newline. An ordinary
/// header named in the list but absent from the request is an error; the
/// list is expected to have been sanitized beforehand.
pub fn compose_signing_string(
    request: &HttpRequest,
    headers: &[HeaderName],
    escaping: RequestTargetEscaping,
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
) -> Result<String, HttpSealError> {
    let mut lines = Vec::with_capacity(headers.len());

    for header in headers {
        let line = match header {
            HeaderName::RequestTarget => format!(
                "(request-target): {} {}",
                request.method().as_str().to_ascii_lowercase(),
                escape_target(request.path(), escaping)
            ),
            HeaderName::Created => format!("(created): {}", created.timestamp()),
            HeaderName::Expires => format!("(expires): {}", expires.timestamp()),
            HeaderName::Header(name) => {
                let value =
                    request
                        .header(name)
                        .ok_or_else(|| HttpSealError::HeaderMissing {
                            header: name.clone(),
                        })?;
                format!("{}: {}", name, value)
            }
        };
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

//! Header policy sanitization.
//!
//! Before composition, the configured header list is normalized against the
//! algorithm's time-anchoring policy and the digest policy. Sanitization
//! produces a new list; entries the caller configured are never removed.

use crate::header::HeaderName;
use crate::request::HttpRequest;
use crate::signing::settings::SigningSettings;
use tracing::warn;

/// Produce the effective header list for signing.
///
/// - `(request-target)` is always part of the signing string.
/// - Wall-clock-dated algorithms sign the `date` header; self-dated ones
///   sign the `(created)`/`(expires)` pseudo-header pair.
/// - When a digest is enabled and the method can carry a body, the `digest`
///   header is part of the signing string.
///
/// A `(created)`/`(expires)` entry under a wall-clock-dated algorithm is
/// contradictory but non-fatal; it is kept and a diagnostic is emitted.
pub fn sanitize_headers(settings: &SigningSettings, request: &HttpRequest) -> Vec<HeaderName> {
    let mut headers = settings.headers.clone();

    // Leads the signing string unless the caller placed it elsewhere.
    if !headers.contains(&HeaderName::RequestTarget) {
        headers.insert(0, HeaderName::RequestTarget);
    }

    if settings.algorithm.uses_wall_clock_date() {
        if !headers.contains(&HeaderName::date()) {
            headers.push(HeaderName::date());
        }
    } else {
        if !headers.contains(&HeaderName::Created) {
            headers.push(HeaderName::Created);
        }
        if !headers.contains(&HeaderName::Expires) {
            headers.push(HeaderName::Expires);
        }
    }

    if settings.digest.is_some()
        && request.method().supports_body()
        && !headers.contains(&HeaderName::digest())
    {
        headers.push(HeaderName::digest());
    }

    if settings.algorithm.uses_wall_clock_date() {
        for pseudo in [HeaderName::Created, HeaderName::Expires] {
            if headers.contains(&pseudo) {
                warn!(
                    algorithm = settings.algorithm.name(),
                    header = pseudo.as_str(),
                    "header should not be part of the signing string for this algorithm"
                );
            }
        }
    }

    headers
}

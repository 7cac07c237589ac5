//! Header ensurers: complete the request before composition.
//!
//! The sanitized header list may demand headers the request does not carry
//! yet. The ensurers inject them; a header already present is authoritative
//! and never replaced.

use crate::crypto::digest::digest_header_value;
use crate::header::HeaderName;
use crate::request::HttpRequest;
use crate::signing::settings::SigningSettings;
use chrono::{DateTime, Utc};

/// HTTP date format for the `Date` header.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Set the `Date` header from the time of signing when the header list
/// demands it and the request lacks one.
pub fn ensure_date_header(
    request: &mut HttpRequest,
    headers: &[HeaderName],
    time_of_signing: DateTime<Utc>,
) {
    if headers.contains(&HeaderName::date()) && !request.has_header("date") {
        request.set_header("Date", time_of_signing.format(HTTP_DATE_FORMAT).to_string());
    }
}

/// Compute and inject the `Digest` header for the request body.
///
/// No-op when digest hashing is disabled, the method cannot carry a body,
/// a digest header already exists under any casing, or the body is absent
/// or empty. An empty body yields no digest header at all, so receivers
/// that only check digests for bodied requests stay compatible.
pub fn ensure_digest_header(request: &mut HttpRequest, settings: &SigningSettings) {
    let Some(hash) = settings.digest else {
        return;
    };
    if !request.method().supports_body() || request.has_header("digest") {
        return;
    }
    let Some(body) = request.body() else {
        return;
    };
    if body.is_empty() {
        return;
    }

    let value = digest_header_value(hash, body);
    request.set_header("Digest", value);
}

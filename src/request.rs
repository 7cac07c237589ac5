//! The minimal request shape the signing core needs.
//!
//! Framework adapters translate their live request types into [`HttpRequest`]
//! before signing or verification, and copy injected headers back out. The
//! surrogate carries the decoded request target; escaping is applied when the
//! signing string is composed.

/// HTTP method of a signable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl Method {
    /// Uppercase method token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }

    /// Whether requests with this method can carry a body.
    ///
    /// GET, HEAD, TRACE, DELETE and OPTIONS requests are treated as bodyless
    /// for digest purposes.
    pub fn supports_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

/// A request snapshot: method, decoded target, headers and optional body.
///
/// Headers form an insertion-ordered multimap with case-insensitive lookup.
/// Original casing is preserved for adapters that copy headers back onto a
/// live request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a request surrogate for the given method and decoded target
    /// (path plus optional query string).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The decoded request target (path plus optional query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Look up a header value, case-insensitively.
    ///
    /// Repeated headers are joined with `", "` per standard HTTP semantics.
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Whether a header with this name is present, under any casing.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Set a header, replacing any existing values under any casing.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Append a header value without touching existing ones.
    pub fn append_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// All headers in insertion order, with their original casing.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_body_policy() {
        assert!(Method::Post.supports_body());
        assert!(Method::Put.supports_body());
        assert!(Method::Patch.supports_body());
        assert!(!Method::Get.supports_body());
        assert!(!Method::Head.supports_body());
        assert!(!Method::Trace.supports_body());
        assert!(!Method::Delete.supports_body());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = HttpRequest::new(Method::Get, "/").with_header("Digest", "SHA-256=abc");
        assert_eq!(request.header("digest").as_deref(), Some("SHA-256=abc"));
        assert!(request.has_header("DIGEST"));
    }

    #[test]
    fn repeated_headers_join_with_comma() {
        let request = HttpRequest::new(Method::Get, "/")
            .with_header("Accept", "text/plain")
            .with_header("accept", "application/json");
        assert_eq!(
            request.header("Accept").as_deref(),
            Some("text/plain, application/json")
        );
    }

    #[test]
    fn set_header_replaces_all_casings() {
        let mut request = HttpRequest::new(Method::Post, "/").with_header("date", "old");
        request.set_header("Date", "new");
        assert_eq!(request.header("date").as_deref(), Some("new"));
    }

    #[test]
    fn missing_header_is_none() {
        let request = HttpRequest::new(Method::Get, "/");
        assert_eq!(request.header("date"), None);
    }
}

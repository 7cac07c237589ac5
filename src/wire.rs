//! The `Signature` record and its Authorization parameter wire codec.
//!
//! Wire form:
//!
//! ```text
//! keyId="client1",algorithm="hmac-sha256",created=1582539614,expires=1582539914,headers="(request-target) date digest",signature="<base64>"
//! ```
//!
//! with an optional `nonce="..."` parameter. The record is produced once per
//! signing operation and never mutated.

use crate::crypto::algorithm::SignatureAlgorithm;
use crate::crypto::material::KeyId;
use crate::errors::HttpSealError;
use crate::header::HeaderName;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// The Authorization scheme under which signature parameters travel.
pub const AUTHORIZATION_SCHEME: &str = "Signature";

/// An immutable signature record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Identifier of the credential that produced the signature.
    pub key_id: KeyId,
    /// Algorithm the signature was computed with.
    pub algorithm: SignatureAlgorithm,
    /// Time of signing, truncated to whole seconds.
    pub created: DateTime<Utc>,
    /// Expiry of the signature's validity window, truncated to whole seconds.
    pub expires: DateTime<Utc>,
    /// Single-use token for replay protection, when the caller supplied one.
    pub nonce: Option<String>,
    /// The ordered header list the signing string was composed from.
    pub headers: Vec<HeaderName>,
    /// Base64-encoded signature value.
    pub signature: String,
}

impl Signature {
    /// Serialize this record into the Authorization parameter string.
    pub fn to_authorization_param(&self) -> String {
        let mut param = format!(
            "keyId=\"{}\",algorithm=\"{}\",created={},expires={}",
            self.key_id,
            self.algorithm.name(),
            self.created.timestamp(),
            self.expires.timestamp(),
        );
        if let Some(nonce) = &self.nonce {
            param.push_str(&format!(",nonce=\"{}\"", nonce));
        }
        let headers: Vec<&str> = self.headers.iter().map(HeaderName::as_str).collect();
        param.push_str(&format!(
            ",headers=\"{}\",signature=\"{}\"",
            headers.join(" "),
            self.signature
        ));
        param
    }

    /// Parse an Authorization parameter string back into a record.
    ///
    /// Fails with [`HttpSealError::MalformedSignature`] on missing mandatory
    /// fields, an unknown algorithm name, or unparsable timestamps. An absent
    /// `headers` field defaults to the algorithm family's canonical list.
    pub fn parse_authorization_param(param: &str) -> Result<Self, HttpSealError> {
        let mut fields: HashMap<String, String> = HashMap::new();
        for part in param.split(',') {
            let part = part.trim();
            if let Some(eq_pos) = part.find('=') {
                let key = part[..eq_pos].trim().to_ascii_lowercase();
                let value = part[eq_pos + 1..].trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                fields.insert(key, value.to_owned());
            }
        }

        let key_id = fields
            .get("keyid")
            .filter(|id| !id.is_empty())
            .map(|id| KeyId::new(id.as_str()))
            .ok_or_else(|| malformed("missing keyId field"))?;

        let algorithm_name = fields
            .get("algorithm")
            .ok_or_else(|| malformed("missing algorithm field"))?;
        let algorithm = SignatureAlgorithm::from_name(algorithm_name).ok_or_else(|| {
            malformed(&format!("unknown algorithm '{}'", algorithm_name))
        })?;

        let created = parse_timestamp(&fields, "created")?;
        let expires = parse_timestamp(&fields, "expires")?;

        let signature = fields
            .get("signature")
            .filter(|sig| !sig.is_empty())
            .cloned()
            .ok_or_else(|| malformed("missing signature field"))?;

        let headers = match fields.get("headers") {
            Some(list) => list.split_whitespace().map(HeaderName::parse).collect(),
            None => default_headers(algorithm),
        };

        Ok(Self {
            key_id,
            algorithm,
            created,
            expires,
            nonce: fields.get("nonce").cloned(),
            headers,
            signature,
        })
    }
}

/// The canonical header list assumed when a signature omits `headers`.
fn default_headers(algorithm: SignatureAlgorithm) -> Vec<HeaderName> {
    if algorithm.uses_wall_clock_date() {
        vec![HeaderName::RequestTarget, HeaderName::date()]
    } else {
        vec![HeaderName::RequestTarget, HeaderName::Created, HeaderName::Expires]
    }
}

fn parse_timestamp(
    fields: &HashMap<String, String>,
    name: &str,
) -> Result<DateTime<Utc>, HttpSealError> {
    let raw = fields
        .get(name)
        .ok_or_else(|| malformed(&format!("missing {} field", name)))?;
    let seconds: i64 = raw
        .parse()
        .map_err(|_| malformed(&format!("unparsable {} timestamp '{}'", name, raw)))?;
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| malformed(&format!("{} timestamp out of range", name)))
}

fn malformed(detail: &str) -> HttpSealError {
    HttpSealError::MalformedSignature(detail.to_owned())
}

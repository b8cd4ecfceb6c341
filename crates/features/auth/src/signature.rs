//! Wire details of the signature protocol.
//!
//! A signed request carries two headers:
//!
//! ```text
//! Date: Tue, 15 Nov 1994 08:12:31 GMT
//! Authorization: sigil-sig-v1 <fingerprint>:<base64(signature)>
//! ```
//!
//! The signature covers the canonical string `METHOD\nPATH_AND_QUERY\nDATE\nBODY`.

use chrono::{DateTime, NaiveDateTime, Utc};
use http::header::{AUTHORIZATION, DATE};

use crate::HttpRequest;
use crate::error::AuthError;

/// Scheme of the current protocol version.
pub const SIGNATURE_SCHEME: &str = "sigil-sig-v1";

/// Schemes of superseded protocol versions. Requests using them are always rejected.
pub const LEGACY_SCHEMES: [&str; 2] = ["Sigil", "Sigil-Sig2"];

/// HTTP-date (RFC 7231 IMF-fixdate) with second precision.
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[must_use]
pub fn format_http_date(date: DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses an HTTP-date. Only the exact form produced by [`format_http_date`] is accepted.
///
/// # Errors
/// * [`AuthError::DateParse`] If `value` is not an HTTP-date in GMT.
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, AuthError> {
    let date = NaiveDateTime::parse_from_str(value, DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| AuthError::DateParse { message: e.to_string().into(), context: None })?;

    // chrono tolerates extra whitespace and unpadded fields.
    if format_http_date(date) != value {
        return Err(AuthError::DateParse {
            message: "not in canonical HTTP-date form".into(),
            context: None,
        });
    }

    Ok(date)
}

/// Builds the exact byte string that is signed for `request`.
#[must_use]
pub fn canonical_message(request: &HttpRequest, date: &str) -> Vec<u8> {
    let uri = request.uri();
    let path = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());

    let mut message =
        Vec::with_capacity(request.method().as_str().len() + path.len() + date.len() + 3);
    message.extend_from_slice(request.method().as_str().as_bytes());
    message.push(b'\n');
    message.extend_from_slice(path.as_bytes());
    message.push(b'\n');
    message.extend_from_slice(date.as_bytes());
    message.push(b'\n');
    message.extend_from_slice(request.body());
    message
}

/// The authentication headers of a request, split but not yet verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders<'a> {
    /// The raw `Date` header, exactly as signed.
    pub date: &'a str,
    pub issued_at: DateTime<Utc>,
    pub scheme: &'a str,
    /// Everything after the scheme, e.g. `<fingerprint>:<signature>`.
    pub credentials: &'a str,
}

impl<'a> SignedHeaders<'a> {
    /// Extracts `Date` and `Authorization` from `request`.
    ///
    /// # Errors
    /// * [`AuthError::DateParse`] If `Date` is absent or malformed.
    /// * [`AuthError::InvalidAuthorizationHeader`] If `Authorization` is absent, empty or has
    ///   no `<scheme> <credentials>` shape.
    pub fn parse(request: &'a HttpRequest) -> Result<Self, AuthError> {
        let date = request
            .headers()
            .get(DATE)
            .map(|value| value.to_str())
            .transpose()
            .map_err(|e| AuthError::DateParse { message: e.to_string().into(), context: None })?
            .unwrap_or_default();
        let issued_at = parse_http_date(date)?;

        let authorization = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::invalid_authorization("missing Authorization header"))?;

        let (scheme, credentials) = authorization
            .split_once(' ')
            .ok_or(AuthError::invalid_authorization("expected `<scheme> <credentials>`"))?;

        Ok(Self { date, issued_at, scheme, credentials })
    }
}

use std::borrow::Cow;

use crate::lookup::LookupError;

/// Errors produced while signing or verifying a request.
///
/// [`AuthError::SignatureNotVerified`] never carries context: an unknown fingerprint, an
/// unusable stored key and a bad signature must look the same to the caller.
#[sigil_derive::sigil_error]
pub enum AuthError {
    /// The `Date` header is missing or not an HTTP-date.
    #[error("Could not parse Date header{}: {message}", format_context(.context))]
    DateParse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The `Date` header is too far from the verifier's clock.
    #[error("Request date outside the accepted window{}: {message}", format_context(.context))]
    StaleRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The `Authorization` header is missing or not `<scheme> <fingerprint>:<signature>`.
    #[error("Invalid Authorization header{}", format_context(.context))]
    InvalidAuthorizationHeader { context: Option<Cow<'static, str>> },

    /// The request uses a superseded signature scheme.
    #[error("Outdated signature protocol, update your client{}", format_context(.context))]
    OutdatedSignatureProtocol { context: Option<Cow<'static, str>> },

    /// The signature part of the header is not base64.
    #[error("Malformed signature{}: {source}", format_context(.context))]
    MalformedSignature { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// The signature could not be verified.
    #[error("Signature not verified{}", format_context(.context))]
    SignatureNotVerified { context: Option<Cow<'static, str>> },

    /// The credential store failed for a reason other than a missing fingerprint.
    #[error("Credential lookup failed{}: {source}", format_context(.context))]
    Lookup { source: LookupError, context: Option<Cow<'static, str>> },

    /// Signing failed inside the crypto layer.
    #[error("Crypto error{}: {source}", format_context(.context))]
    Crypto { source: sigil_crypto::CryptoError, context: Option<Cow<'static, str>> },

    /// A generated header value is not valid HTTP.
    #[error("Invalid header value{}: {source}", format_context(.context))]
    InvalidHeaderValue {
        source: http::header::InvalidHeaderValue,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal auth error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AuthError {
    pub(crate) const fn invalid_authorization(context: &'static str) -> Self {
        Self::InvalidAuthorizationHeader { context: Some(Cow::Borrowed(context)) }
    }

    pub(crate) const fn signature_not_verified() -> Self {
        Self::SignatureNotVerified { context: None }
    }
}

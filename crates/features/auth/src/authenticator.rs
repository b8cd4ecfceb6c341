//! Server-side verification of signed requests.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{TimeDelta, Utc};
use sigil_crypto::RsaPublicKey;
use sigil_domain::AuthResult;
use sigil_domain::config::SigningConfig;
use sigil_logger::Telemetry;
use tracing::{debug, instrument, warn};

use crate::HttpRequest;
use crate::error::AuthError;
use crate::lookup::{CredentialGetter, LookupError};
use crate::signature::{LEGACY_SCHEMES, SIGNATURE_SCHEME, SignedHeaders, canonical_message};

/// Default tolerance between the `Date` header and the verifier's clock.
pub const DEFAULT_MAX_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Verifies the credentials of one `Authorization` scheme.
pub trait VerificationMethod: Send + Sync {
    /// The scheme token this method handles, e.g. `sigil-sig-v1`.
    fn scheme(&self) -> &str;

    /// # Errors
    /// Any [`AuthError`] that rejects the request.
    fn verify(
        &self,
        request: &HttpRequest,
        headers: &SignedHeaders<'_>,
    ) -> Result<AuthResult, AuthError>;
}

/// `sigil-sig-v1`: an RSA signature over the canonical request string.
pub struct MethodSignature {
    getter: Arc<dyn CredentialGetter>,
}

impl MethodSignature {
    pub const fn new(getter: Arc<dyn CredentialGetter>) -> Self {
        Self { getter }
    }
}

impl std::fmt::Debug for MethodSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSignature").field("scheme", &SIGNATURE_SCHEME).finish_non_exhaustive()
    }
}

impl VerificationMethod for MethodSignature {
    fn scheme(&self) -> &str {
        SIGNATURE_SCHEME
    }

    fn verify(
        &self,
        request: &HttpRequest,
        headers: &SignedHeaders<'_>,
    ) -> Result<AuthResult, AuthError> {
        let (fingerprint, signature) = headers
            .credentials
            .split_once(':')
            .filter(|(fingerprint, signature)| {
                !fingerprint.is_empty() && !signature.is_empty() && !signature.contains(':')
            })
            .ok_or(AuthError::invalid_authorization("expected `<fingerprint>:<signature>`"))?;

        let signature = STANDARD.decode(signature)?;

        let credential = match self.getter.get_credential(fingerprint) {
            Ok(credential) => credential,
            Err(LookupError::NotFound { .. }) => return Err(AuthError::signature_not_verified()),
            Err(e) => return Err(e.into()),
        };

        let verifier = RsaPublicKey::import_pem(&credential.verifier).map_err(|e| {
            warn!(fingerprint, code = e.code(), "stored verifier could not be imported");
            AuthError::signature_not_verified()
        })?;

        verifier
            .verify(&canonical_message(request, headers.date), &signature)
            .map_err(|_| AuthError::signature_not_verified())?;

        Ok(AuthResult { fingerprint: fingerprint.to_owned(), account_id: credential.account_id })
    }
}

/// Verifies the `Date` and `Authorization` headers of incoming requests.
///
/// Checks run in a fixed order: headers are parsed, superseded schemes are rejected, the date
/// is checked against the clock and the remaining scheme is dispatched to the registered
/// [`VerificationMethod`].
pub struct Authenticator {
    methods: Vec<Box<dyn VerificationMethod>>,
    max_clock_skew: Option<Duration>,
    telemetry: Telemetry,
}

impl Authenticator {
    pub fn new(method: impl VerificationMethod + 'static) -> Self {
        Self {
            methods: vec![Box::new(method)],
            max_clock_skew: Some(DEFAULT_MAX_CLOCK_SKEW),
            telemetry: Telemetry::disabled(),
        }
    }

    pub fn from_config(config: &SigningConfig, method: impl VerificationMethod + 'static) -> Self {
        Self::new(method).with_max_clock_skew(config.max_clock_skew_secs.map(Duration::from_secs))
    }

    /// Registers another scheme. The first method registered for a scheme wins.
    #[must_use]
    pub fn with_method(mut self, method: impl VerificationMethod + 'static) -> Self {
        self.methods.push(Box::new(method));
        self
    }

    /// `None` disables the freshness check.
    #[must_use]
    pub const fn with_max_clock_skew(mut self, skew: Option<Duration>) -> Self {
        self.max_clock_skew = skew;
        self
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Verifies `request` and returns the authenticated identity.
    ///
    /// # Errors
    /// * [`AuthError::DateParse`] If `Date` is missing or malformed.
    /// * [`AuthError::StaleRequest`] If `Date` is outside the accepted clock skew.
    /// * [`AuthError::InvalidAuthorizationHeader`] If `Authorization` is missing, malformed or
    ///   uses an unknown scheme.
    /// * [`AuthError::OutdatedSignatureProtocol`] If a superseded scheme is used.
    /// * [`AuthError::MalformedSignature`] If the signature is not base64.
    /// * [`AuthError::SignatureNotVerified`] If the fingerprint is unknown or the signature
    ///   does not match.
    /// * [`AuthError::Lookup`] If the credential store fails.
    pub fn verify(&self, request: &HttpRequest) -> Result<AuthResult, AuthError> {
        self.telemetry.in_scope(|| self.verify_request(request))
    }

    #[instrument(skip_all, fields(method = %request.method(), path = %request.uri().path()))]
    fn verify_request(&self, request: &HttpRequest) -> Result<AuthResult, AuthError> {
        let result = self.check(request);
        match &result {
            Ok(auth) => {
                debug!(fingerprint = %auth.fingerprint, account_id = %auth.account_id, "Request authenticated");
            },
            Err(e) => debug!(code = e.code(), "Request rejected"),
        }
        result
    }

    fn check(&self, request: &HttpRequest) -> Result<AuthResult, AuthError> {
        let headers = SignedHeaders::parse(request)?;

        if LEGACY_SCHEMES.contains(&headers.scheme) {
            return Err(AuthError::OutdatedSignatureProtocol {
                context: Some(headers.scheme.to_owned().into()),
            });
        }

        self.check_freshness(&headers)?;

        let method = self
            .methods
            .iter()
            .find(|method| method.scheme() == headers.scheme)
            .ok_or(AuthError::invalid_authorization("unsupported scheme"))?;

        method.verify(request, &headers)
    }

    fn check_freshness(&self, headers: &SignedHeaders<'_>) -> Result<(), AuthError> {
        let Some(skew) = self.max_clock_skew else {
            return Ok(());
        };

        let allowed = TimeDelta::from_std(skew).unwrap_or(TimeDelta::MAX);
        let drift = (Utc::now() - headers.issued_at).abs();
        if drift > allowed {
            return Err(AuthError::StaleRequest {
                message: format!("off by {}s, allowed {}s", drift.num_seconds(), skew.as_secs())
                    .into(),
                context: None,
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schemes: Vec<&str> = self.methods.iter().map(|method| method.scheme()).collect();
        f.debug_struct("Authenticator")
            .field("schemes", &schemes)
            .field("max_clock_skew", &self.max_clock_skew)
            .field("telemetry", &self.telemetry)
            .finish()
    }
}

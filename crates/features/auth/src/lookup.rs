//! The credential lookup seam.

use std::borrow::Cow;
use std::sync::Arc;

use sigil_domain::Credential;

/// Errors returned by a [`CredentialGetter`].
#[sigil_derive::sigil_error]
pub enum LookupError {
    /// No credential is registered under the fingerprint.
    #[error("Credential not found{}", format_context(.context))]
    NotFound { context: Option<Cow<'static, str>> },

    /// The backing store failed.
    #[error("Credential store failure{}: {message}", format_context(.context))]
    Backend { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Resolves a fingerprint to the registered [`Credential`].
///
/// Implementations must report an unknown fingerprint as [`LookupError::NotFound`]; the
/// authenticator relies on it to hide which fingerprints exist.
pub trait CredentialGetter: Send + Sync {
    /// # Errors
    /// * [`LookupError::NotFound`] If no credential has this fingerprint.
    /// * [`LookupError::Backend`] For any failure of the store itself.
    fn get_credential(&self, fingerprint: &str) -> Result<Credential, LookupError>;
}

impl<T: CredentialGetter + ?Sized> CredentialGetter for Arc<T> {
    fn get_credential(&self, fingerprint: &str) -> Result<Credential, LookupError> {
        (**self).get_credential(fingerprint)
    }
}

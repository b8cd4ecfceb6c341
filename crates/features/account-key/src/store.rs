//! Persistence seam for wrapped account keys.

use std::sync::Arc;

use crate::error::AccountKeyError;
use crate::model::{CreateAccountKeyRequest, EncryptedAccountKey};

/// Stores one [`EncryptedAccountKey`] per credential fingerprint.
pub trait AccountKeyStore: Send + Sync {
    /// Stores a wrapped account key for the credential `fingerprint`.
    ///
    /// # Errors
    /// * [`AccountKeyError::InvalidPublicKey`] If the request does not validate, if the account
    ///   already holds a different account key, or if the key belongs to another account.
    /// * [`AccountKeyError::UnknownCredential`] If `fingerprint` is not registered.
    /// * [`AccountKeyError::AlreadyKeyed`] If the credential already holds an account key.
    fn create_account_key(
        &self,
        fingerprint: &str,
        request: CreateAccountKeyRequest,
    ) -> Result<EncryptedAccountKey, AccountKeyError>;

    /// # Errors
    /// * [`AccountKeyError::AccountNotKeyed`] If nothing is stored for `fingerprint`.
    fn get_account_key(&self, fingerprint: &str) -> Result<EncryptedAccountKey, AccountKeyError>;
}

impl<T: AccountKeyStore + ?Sized> AccountKeyStore for Arc<T> {
    fn create_account_key(
        &self,
        fingerprint: &str,
        request: CreateAccountKeyRequest,
    ) -> Result<EncryptedAccountKey, AccountKeyError> {
        (**self).create_account_key(fingerprint, request)
    }

    fn get_account_key(&self, fingerprint: &str) -> Result<EncryptedAccountKey, AccountKeyError> {
        (**self).get_account_key(fingerprint)
    }
}

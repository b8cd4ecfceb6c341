use std::sync::Arc;

use sigil_auth::{Credential, Decrypter};
use sigil_crypto::{ACCOUNT_KEY_BITS, RsaPrivateKey, RsaPublicKey, encrypt_hybrid};
use sigil_domain::config::KeyConfig;
use sigil_logger::Telemetry;
use tracing::{debug, info, instrument};
use zeroize::Zeroizing;

use crate::error::{AccountKeyError, AccountKeyErrorExt};
use crate::model::{CreateAccountKeyRequest, EncryptedAccountKey};
use crate::store::AccountKeyStore;

/// Creates, unlocks and shares account keys on behalf of a credential.
///
/// The account private key only exists unwrapped inside a single call; the store sees it
/// wrapped for one credential at a time.
pub struct AccountKeyService {
    store: Arc<dyn AccountKeyStore>,
    account_key_bits: usize,
    telemetry: Telemetry,
}

impl AccountKeyService {
    pub fn new(store: Arc<dyn AccountKeyStore>) -> Self {
        Self { store, account_key_bits: ACCOUNT_KEY_BITS, telemetry: Telemetry::disabled() }
    }

    pub fn from_config(config: &KeyConfig, store: Arc<dyn AccountKeyStore>) -> Self {
        Self::new(store).with_account_key_bits(config.account_key_bits)
    }

    /// Modulus size of generated account keys.
    #[must_use]
    pub const fn with_account_key_bits(mut self, bits: usize) -> Self {
        self.account_key_bits = bits;
        self
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Generates an account key and stores it wrapped for `credential`.
    ///
    /// # Errors
    /// * [`AccountKeyError::Crypto`] If generation or wrapping fails.
    /// * Any error of [`AccountKeyStore::create_account_key`].
    pub fn create<C>(&self, credential: &C) -> Result<EncryptedAccountKey, AccountKeyError>
    where
        C: Credential + Decrypter + ?Sized,
    {
        self.telemetry.in_scope(|| self.create_for(credential))
    }

    /// Fetches and unwraps the account key of `credential`.
    ///
    /// # Errors
    /// * [`AccountKeyError::AccountNotKeyed`] If the credential holds no account key.
    /// * [`AccountKeyError::Crypto`] If the stored key cannot be unwrapped or parsed.
    pub fn get<C>(&self, credential: &C) -> Result<RsaPrivateKey, AccountKeyError>
    where
        C: Credential + Decrypter + ?Sized,
    {
        self.telemetry.in_scope(|| self.unlock(credential))
    }

    /// Wraps the account key of `existing` for `new_key` and stores the new record under
    /// `new_key`'s fingerprint. `new_key` must be registered under the same account.
    ///
    /// # Errors
    /// * [`AccountKeyError::AccountNotKeyed`] If `existing` holds no account key.
    /// * [`AccountKeyError::Crypto`] If re-wrapping fails.
    /// * Any error of [`AccountKeyStore::create_account_key`].
    pub fn share<C>(
        &self,
        existing: &C,
        new_key: &RsaPublicKey,
    ) -> Result<EncryptedAccountKey, AccountKeyError>
    where
        C: Credential + Decrypter + ?Sized,
    {
        self.telemetry.in_scope(|| self.share_with(existing, new_key))
    }

    /// Whether `credential` holds an account key.
    ///
    /// # Errors
    /// Store failures other than [`AccountKeyError::AccountNotKeyed`].
    pub fn exists<C>(&self, credential: &C) -> Result<bool, AccountKeyError>
    where
        C: Credential + ?Sized,
    {
        match self.store.get_account_key(credential.fingerprint()) {
            Ok(_) => Ok(true),
            Err(AccountKeyError::AccountNotKeyed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all, fields(credential = credential.fingerprint(), bits = self.account_key_bits))]
    fn create_for<C>(&self, credential: &C) -> Result<EncryptedAccountKey, AccountKeyError>
    where
        C: Credential + Decrypter + ?Sized,
    {
        let account_key = RsaPrivateKey::generate(self.account_key_bits)?;
        let der = account_key.export_der()?;
        let encrypted_private_key = encrypt_hybrid(&der, credential.encryption_key())?;

        let request = CreateAccountKeyRequest {
            encrypted_private_key,
            public_key: account_key.public_key().export_pem().as_bytes().to_vec(),
        };
        request.validate()?;

        let record = self.store.create_account_key(credential.fingerprint(), request)?;
        info!(account = %record.account, "Account key created");
        Ok(record)
    }

    #[instrument(skip_all, fields(credential = credential.fingerprint()))]
    fn unlock<C>(&self, credential: &C) -> Result<RsaPrivateKey, AccountKeyError>
    where
        C: Credential + Decrypter + ?Sized,
    {
        let record = self.store.get_account_key(credential.fingerprint())?;
        let der = Zeroizing::new(
            credential.decrypt(&record.encrypted_private_key).context("account key")?,
        );
        let account_key = RsaPrivateKey::import_der(&der).context("account key")?;

        debug!(account = %record.account, "Account key unlocked");
        Ok(account_key)
    }

    #[instrument(skip_all, fields(from = existing.fingerprint(), to = new_key.fingerprint()))]
    fn share_with<C>(
        &self,
        existing: &C,
        new_key: &RsaPublicKey,
    ) -> Result<EncryptedAccountKey, AccountKeyError>
    where
        C: Credential + Decrypter + ?Sized,
    {
        let record = self.store.get_account_key(existing.fingerprint())?;
        let encrypted_private_key =
            existing.re_encrypt(&record.encrypted_private_key, new_key).context("account key")?;

        let request = CreateAccountKeyRequest { encrypted_private_key, public_key: record.public_key };
        let shared = self.store.create_account_key(new_key.fingerprint(), request)?;

        info!(account = %shared.account, "Account key shared");
        Ok(shared)
    }
}

impl std::fmt::Debug for AccountKeyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountKeyService")
            .field("account_key_bits", &self.account_key_bits)
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

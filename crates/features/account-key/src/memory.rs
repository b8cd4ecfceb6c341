//! In-memory credential and account-key store.

use std::sync::Arc;

use fxhash::FxHashMap;
use parking_lot::RwLock;
use sigil_auth::{CredentialGetter, LookupError};
use sigil_domain::{AccountId, Credential};
use sigil_kernel::new_account_id;
use tracing::trace;

use crate::error::AccountKeyError;
use crate::model::{CreateAccountKeyRequest, EncryptedAccountKey};
use crate::store::AccountKeyStore;

#[derive(Debug, Default)]
struct Tables {
    credentials: FxHashMap<String, Credential>,
    account_keys: FxHashMap<String, EncryptedAccountKey>,
}

/// Thread-safe in-memory implementation of both [`CredentialGetter`] and [`AccountKeyStore`].
///
/// Cloning is cheap and clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountKeyStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryAccountKeyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `credential` under a freshly generated account.
    pub fn register_credential(&self, credential: &impl sigil_auth::Credential) -> AccountId {
        let account_id = new_account_id();
        self.register_credential_for(account_id.clone(), credential);
        account_id
    }

    /// Registers `credential` under an existing account, e.g. a second device of a user.
    /// Registering the same fingerprint again replaces the previous record.
    pub fn register_credential_for(
        &self,
        account_id: AccountId,
        credential: &impl sigil_auth::Credential,
    ) {
        let record = Credential {
            account_id,
            fingerprint: credential.fingerprint().to_owned(),
            verifier: credential.verifier().to_vec(),
        };
        trace!(fingerprint = %record.fingerprint, account_id = %record.account_id, "Credential registered");
        self.tables.write().credentials.insert(record.fingerprint.clone(), record);
    }

    #[must_use]
    pub fn credential_count(&self) -> usize {
        self.tables.read().credentials.len()
    }

    #[must_use]
    pub fn account_key_count(&self) -> usize {
        self.tables.read().account_keys.len()
    }
}

impl CredentialGetter for MemoryAccountKeyStore {
    fn get_credential(&self, fingerprint: &str) -> Result<Credential, LookupError> {
        self.tables
            .read()
            .credentials
            .get(fingerprint)
            .cloned()
            .ok_or(LookupError::NotFound { context: None })
    }
}

impl AccountKeyStore for MemoryAccountKeyStore {
    fn create_account_key(
        &self,
        fingerprint: &str,
        request: CreateAccountKeyRequest,
    ) -> Result<EncryptedAccountKey, AccountKeyError> {
        request.validate()?;

        let mut tables = self.tables.write();
        let account = tables
            .credentials
            .get(fingerprint)
            .map(|credential| credential.account_id.clone())
            .ok_or_else(|| AccountKeyError::UnknownCredential {
                context: Some(fingerprint.to_owned().into()),
            })?;

        if tables.account_keys.contains_key(fingerprint) {
            return Err(AccountKeyError::AlreadyKeyed {
                context: Some(fingerprint.to_owned().into()),
            });
        }

        // Every credential of an account must wrap the same account key, and an account key
        // belongs to exactly one account.
        for existing in tables.account_keys.values() {
            if existing.account == account && existing.public_key != request.public_key {
                return Err(AccountKeyError::InvalidPublicKey {
                    context: Some("does not match the account's existing key".into()),
                });
            }
            if existing.account != account && existing.public_key == request.public_key {
                return Err(AccountKeyError::InvalidPublicKey {
                    context: Some("belongs to another account".into()),
                });
            }
        }

        let record = EncryptedAccountKey {
            account,
            public_key: request.public_key,
            encrypted_private_key: request.encrypted_private_key,
            credential: fingerprint.to_owned(),
        };
        tables.account_keys.insert(fingerprint.to_owned(), record.clone());

        Ok(record)
    }

    fn get_account_key(&self, fingerprint: &str) -> Result<EncryptedAccountKey, AccountKeyError> {
        self.tables
            .read()
            .account_keys
            .get(fingerprint)
            .cloned()
            .ok_or(AccountKeyError::AccountNotKeyed { context: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_auth::RsaCredential;
    use sigil_crypto::HybridCiphertext;
    use std::sync::LazyLock;

    static CREDENTIAL: LazyLock<RsaCredential> =
        LazyLock::new(|| RsaCredential::generate(1024).unwrap());

    fn request(public_key: &[u8]) -> CreateAccountKeyRequest {
        CreateAccountKeyRequest {
            encrypted_private_key: HybridCiphertext::default(),
            public_key: public_key.to_vec(),
        }
    }

    #[test]
    fn test_registered_credential_is_found() {
        let store = MemoryAccountKeyStore::new();
        let account = store.register_credential(&*CREDENTIAL);

        let found = store.get_credential(sigil_auth::Credential::fingerprint(&*CREDENTIAL)).unwrap();
        assert_eq!(found.account_id, account);
        assert_eq!(found.verifier, sigil_auth::Credential::verifier(&*CREDENTIAL));
        assert!(matches!(store.get_credential("nope"), Err(LookupError::NotFound { .. })));
    }

    #[test]
    fn test_create_requires_registered_credential() {
        let store = MemoryAccountKeyStore::new();
        let err = store.create_account_key("nope", request(b"pem")).unwrap_err();

        assert!(matches!(err, AccountKeyError::UnknownCredential { .. }));
    }

    #[test]
    fn test_create_rejects_empty_public_key() {
        let store = MemoryAccountKeyStore::new();
        store.register_credential(&*CREDENTIAL);
        let fingerprint = sigil_auth::Credential::fingerprint(&*CREDENTIAL);

        let err = store.create_account_key(fingerprint, request(b"")).unwrap_err();
        assert!(matches!(err, AccountKeyError::InvalidPublicKey { .. }));
        assert_eq!(store.account_key_count(), 0);
    }

    #[test]
    fn test_records_are_never_replaced() {
        let store = MemoryAccountKeyStore::new();
        let account = store.register_credential(&*CREDENTIAL);
        let fingerprint = sigil_auth::Credential::fingerprint(&*CREDENTIAL);

        let created = store.create_account_key(fingerprint, request(b"pem")).unwrap();
        assert_eq!(created.account, account);
        assert_eq!(created.credential, fingerprint);

        let err = store.create_account_key(fingerprint, request(b"pem")).unwrap_err();
        assert!(matches!(err, AccountKeyError::AlreadyKeyed { .. }));
        assert_eq!(store.get_account_key(fingerprint).unwrap(), created);
    }

    #[test]
    fn test_account_key_cannot_move_to_another_account() {
        static OTHER: LazyLock<RsaCredential> =
            LazyLock::new(|| RsaCredential::generate(1024).unwrap());

        let store = MemoryAccountKeyStore::new();
        store.register_credential(&*CREDENTIAL);
        store.register_credential(&*OTHER);
        let fingerprint = sigil_auth::Credential::fingerprint(&*CREDENTIAL);
        let other = sigil_auth::Credential::fingerprint(&*OTHER);

        store.create_account_key(fingerprint, request(b"pem")).unwrap();
        let err = store.create_account_key(other, request(b"pem")).unwrap_err();

        assert!(matches!(err, AccountKeyError::InvalidPublicKey { .. }));
        assert_eq!(store.account_key_count(), 1);
    }

    #[test]
    fn test_get_missing_is_not_keyed() {
        let store = MemoryAccountKeyStore::new();
        assert_eq!(store.get_account_key("nope").unwrap_err().code(), "account_not_keyed");
    }

    #[test]
    fn test_clones_share_tables() {
        let store = MemoryAccountKeyStore::new();
        let clone = store.clone();
        clone.register_credential(&*CREDENTIAL);

        assert_eq!(store.credential_count(), 1);
    }
}

use std::sync::{Arc, LazyLock};

use sigil_account_key::{AccountKeyService, MemoryAccountKeyStore};
use sigil_auth::RsaCredential;

/// Key size used throughout the tests. Small enough to keep generation fast.
pub const TEST_KEY_BITS: usize = 1024;

static LAPTOP: LazyLock<RsaCredential> =
    LazyLock::new(|| RsaCredential::generate(TEST_KEY_BITS).expect("laptop key generation"));
static PHONE: LazyLock<RsaCredential> =
    LazyLock::new(|| RsaCredential::generate(TEST_KEY_BITS).expect("phone key generation"));
static STRANGER: LazyLock<RsaCredential> =
    LazyLock::new(|| RsaCredential::generate(TEST_KEY_BITS).expect("stranger key generation"));

/// The credential that creates the account key.
#[must_use]
pub fn laptop() -> &'static RsaCredential {
    &LAPTOP
}

/// A second credential of the same account.
#[must_use]
pub fn phone() -> &'static RsaCredential {
    &PHONE
}

/// A credential of another account.
#[must_use]
pub fn stranger() -> &'static RsaCredential {
    &STRANGER
}

/// A fresh store with all three credentials registered; laptop and phone share an account.
#[must_use]
pub fn setup() -> (MemoryAccountKeyStore, AccountKeyService) {
    let store = MemoryAccountKeyStore::new();
    let account = store.register_credential(laptop());
    store.register_credential_for(account, phone());
    store.register_credential(stranger());

    let service =
        AccountKeyService::new(Arc::new(store.clone())).with_account_key_bits(TEST_KEY_BITS);
    (store, service)
}

use sigil_crypto::prelude::*;
use std::sync::LazyLock;

/// Key size used throughout the tests. Small enough to keep generation fast.
pub const TEST_KEY_BITS: usize = 1024;

static RECIPIENT: LazyLock<RsaPrivateKey> =
    LazyLock::new(|| RsaPrivateKey::generate(TEST_KEY_BITS).expect("recipient key generation"));
static OUTSIDER: LazyLock<RsaPrivateKey> =
    LazyLock::new(|| RsaPrivateKey::generate(TEST_KEY_BITS).expect("outsider key generation"));

/// The key most tests encrypt for.
#[must_use]
pub fn recipient() -> &'static RsaPrivateKey {
    &RECIPIENT
}

/// A second, unrelated key pair.
#[must_use]
pub fn outsider() -> &'static RsaPrivateKey {
    &OUTSIDER
}

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::envelope::SymmetricCiphertext;
use crate::error::CryptoError;
use crate::rng::fill_random;

/// Length of an AES-256 key in bytes.
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// Length of an AES-GCM nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

type HmacSha256 = Hmac<Sha256>;

/// A 256-bit AES-GCM key.
///
/// Keys are ephemeral: [`crate::encrypt_hybrid`] generates a fresh one per call and the
/// material is wiped when the value is dropped.
///
/// ### Example
/// ```rust
/// use sigil_crypto::SymmetricKey;
///
/// # fn main() -> Result<(), sigil_crypto::CryptoError> {
/// let key = SymmetricKey::generate()?;
/// let sealed = key.encrypt(b"top secret")?;
/// assert_eq!(key.decrypt(&sealed)?, b"top secret");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_LEN]);

impl SymmetricKey {
    /// Generates a new key from the OS CSPRNG.
    ///
    /// # Errors
    /// * [`CryptoError::Randomness`] If the randomness source fails.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; SYMMETRIC_KEY_LEN];
        fill_random(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Builds a key from raw bytes.
    ///
    /// # Errors
    /// * [`CryptoError::InvalidKeyLength`] If `bytes` is not exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; SYMMETRIC_KEY_LEN] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                message: format!("expected {SYMMETRIC_KEY_LEN} bytes, got {}", bytes.len()).into(),
                context: None,
            })?;
        Ok(Self(key))
    }

    /// Raw key bytes. Only needed to wrap the key for a recipient.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_LEN] {
        &self.0
    }

    /// Encrypts `plaintext` with AES-256-GCM under a fresh random nonce.
    ///
    /// # Results
    /// Returns the ciphertext (with the appended tag) together with its nonce.
    ///
    /// # Errors
    /// * [`CryptoError::Randomness`] If no nonce could be drawn.
    /// * [`CryptoError::Encryption`] If the AEAD encryption fails.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<SymmetricCiphertext, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        fill_random(&mut nonce)?;

        let data = self.cipher().encrypt(Nonce::from_slice(&nonce), plaintext).map_err(|_| {
            CryptoError::Encryption { message: "AES-GCM encryption failed".into(), context: None }
        })?;

        Ok(SymmetricCiphertext { data, nonce: nonce.to_vec() })
    }

    /// Decrypts and authenticates a [`SymmetricCiphertext`].
    ///
    /// # Errors
    /// * [`CryptoError::DecryptionFailed`] For a wrong key, a tampered payload or a nonce of
    ///   the wrong length. The cases are indistinguishable.
    pub fn decrypt(&self, ciphertext: &SymmetricCiphertext) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.nonce.len() != NONCE_LEN {
            return Err(CryptoError::decryption_failed());
        }

        self.cipher()
            .decrypt(Nonce::from_slice(&ciphertext.nonce), ciphertext.data.as_slice())
            .map_err(|_| CryptoError::decryption_failed())
    }

    /// Computes HMAC-SHA256 of `data` under this key.
    ///
    /// The digest is deterministic and is meant for building lookup indexes over secret data.
    ///
    /// # Errors
    /// * [`CryptoError::Internal`] If the MAC cannot be keyed (never for a 32-byte key).
    pub fn hmac(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.0)
            .map_err(|_| CryptoError::from("HMAC rejected the key length"))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

//! RSA-OAEP + AES-GCM hybrid encryption.
//!
//! A fresh [`SymmetricKey`] encrypts the payload and only the 32 key bytes go through RSA, so
//! payloads of any size can be sealed for a recipient key.

use zeroize::Zeroizing;

use crate::asymmetric::{RsaPrivateKey, RsaPublicKey};
use crate::envelope::{AsymmetricCiphertext, HybridCiphertext};
use crate::error::CryptoError;
use crate::symmetric::SymmetricKey;

/// Encrypts `plaintext` for the holder of `recipient`'s private key.
///
/// # Errors
/// * [`CryptoError::Randomness`] If no key or nonce could be drawn.
/// * [`CryptoError::Encryption`] If either encryption stage fails.
pub fn encrypt_hybrid(
    plaintext: &[u8],
    recipient: &RsaPublicKey,
) -> Result<HybridCiphertext, CryptoError> {
    let key = SymmetricKey::generate()?;
    let symmetric = key.encrypt(plaintext)?;
    let asymmetric = recipient.encrypt(key.as_bytes())?;

    Ok(HybridCiphertext { symmetric, asymmetric })
}

/// Opens a [`HybridCiphertext`] with the recipient's private key.
///
/// # Errors
/// * [`CryptoError::DecryptionFailed`] For any failure in either stage. A wrong key, a
///   tampered wrapped key and a tampered payload are indistinguishable.
pub fn decrypt_hybrid(
    ciphertext: &HybridCiphertext,
    recipient: &RsaPrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    let key = unwrap_key(&ciphertext.asymmetric, recipient)?;
    key.decrypt(&ciphertext.symmetric)
}

impl HybridCiphertext {
    /// Re-wraps the symmetric key for `to` without touching the payload.
    ///
    /// The payload plaintext is never recovered; only the 32-byte key is briefly held in
    /// memory and wiped afterwards.
    ///
    /// # Errors
    /// * [`CryptoError::DecryptionFailed`] If `from` cannot unwrap the key.
    /// * [`CryptoError::Encryption`] If wrapping for `to` fails.
    pub fn re_encrypt(&self, from: &RsaPrivateKey, to: &RsaPublicKey) -> Result<Self, CryptoError> {
        let key = unwrap_key(&self.asymmetric, from)?;
        let asymmetric = to.encrypt(key.as_bytes())?;

        Ok(Self { symmetric: self.symmetric.clone(), asymmetric })
    }
}

fn unwrap_key(
    wrapped: &AsymmetricCiphertext,
    recipient: &RsaPrivateKey,
) -> Result<SymmetricKey, CryptoError> {
    let raw = Zeroizing::new(recipient.decrypt(wrapped)?);
    SymmetricKey::from_bytes(&raw).map_err(|_| CryptoError::decryption_failed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static ALICE: LazyLock<RsaPrivateKey> =
        LazyLock::new(|| RsaPrivateKey::generate(1024).unwrap());
    static BOB: LazyLock<RsaPrivateKey> = LazyLock::new(|| RsaPrivateKey::generate(1024).unwrap());

    #[test]
    fn test_round_trip_large_payload() {
        let payload = vec![0x5A; 64 * 1024];
        let sealed = encrypt_hybrid(&payload, ALICE.public_key()).unwrap();

        assert_eq!(decrypt_hybrid(&sealed, &ALICE).unwrap(), payload);
    }

    #[test]
    fn test_wrong_recipient_fails_uniformly() {
        let sealed = encrypt_hybrid(b"secret", ALICE.public_key()).unwrap();
        let err = decrypt_hybrid(&sealed, &BOB).unwrap_err();

        assert!(matches!(err, CryptoError::DecryptionFailed { .. }));
    }

    #[test]
    fn test_empty_wrapped_key_is_a_decryption_failure() {
        let mut sealed = encrypt_hybrid(b"secret", ALICE.public_key()).unwrap();
        sealed.asymmetric.data.clear();

        assert!(matches!(decrypt_hybrid(&sealed, &ALICE), Err(CryptoError::DecryptionFailed { .. })));
    }

    #[test]
    fn test_re_encrypt_keeps_payload_and_switches_recipient() {
        let sealed = encrypt_hybrid(b"shared secret", ALICE.public_key()).unwrap();
        let shared = sealed.re_encrypt(&ALICE, BOB.public_key()).unwrap();

        assert_eq!(shared.symmetric, sealed.symmetric);
        assert_ne!(shared.asymmetric, sealed.asymmetric);
        assert_eq!(decrypt_hybrid(&shared, &BOB).unwrap(), b"shared secret");
        assert!(decrypt_hybrid(&shared, &ALICE).is_err());
    }
}

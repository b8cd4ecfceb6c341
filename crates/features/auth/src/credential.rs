//! Client-side credentials.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use http::HeaderValue;
use http::header::{AUTHORIZATION, DATE};
use sigil_crypto::{
    CryptoError, HybridCiphertext, RsaPrivateKey, RsaPublicKey, decrypt_hybrid,
};

use crate::HttpRequest;
use crate::error::AuthError;
use crate::signature::{SIGNATURE_SCHEME, canonical_message, format_http_date};

/// The signing capability of a credential.
///
/// A credential authenticates outgoing requests; it is also registered server-side through
/// its [`Credential::fingerprint`] and [`Credential::verifier`].
pub trait Credential: Send + Sync {
    /// Adds `Date` (when absent) and `Authorization` headers to `request`.
    ///
    /// # Errors
    /// * [`AuthError::DateParse`] If an existing `Date` header is not valid text.
    /// * [`AuthError::Crypto`] If signing fails.
    /// * [`AuthError::InvalidHeaderValue`] If a header value cannot be built.
    fn add_authentication(&self, request: &mut HttpRequest) -> Result<(), AuthError>;

    /// Identity claimed in signatures and used as lookup key.
    fn fingerprint(&self) -> &str;

    /// The exported public material the server verifies against.
    fn verifier(&self) -> &[u8];
}

/// The decryption capability of a credential.
///
/// Account keys are stored wrapped for a credential; only the holder of the credential can
/// unwrap them or wrap them again for somebody else.
pub trait Decrypter: Send + Sync {
    /// The key data is wrapped for.
    fn encryption_key(&self) -> &RsaPublicKey;

    /// # Errors
    /// * [`CryptoError::DecryptionFailed`] If the ciphertext is not wrapped for this credential.
    fn decrypt(&self, ciphertext: &HybridCiphertext) -> Result<Vec<u8>, CryptoError>;

    /// Re-wraps `ciphertext` for `to` without exposing its payload.
    ///
    /// # Errors
    /// * [`CryptoError::DecryptionFailed`] If the ciphertext is not wrapped for this credential.
    /// * [`CryptoError::Encryption`] If wrapping for `to` fails.
    fn re_encrypt(
        &self,
        ciphertext: &HybridCiphertext,
        to: &RsaPublicKey,
    ) -> Result<HybridCiphertext, CryptoError>;
}

/// A credential backed by an RSA key pair.
#[derive(Debug, Clone)]
pub struct RsaCredential {
    key: RsaPrivateKey,
}

impl RsaCredential {
    #[must_use]
    pub const fn new(key: RsaPrivateKey) -> Self {
        Self { key }
    }

    /// Generates a credential with a fresh key of `bits` bits.
    ///
    /// # Errors
    /// * [`CryptoError::KeyGeneration`] If key generation fails.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        RsaPrivateKey::generate(bits).map(Self::new)
    }

    /// Loads a credential from a PKCS#1 PEM private key.
    ///
    /// # Errors
    /// See [`RsaPrivateKey::import_pem`].
    pub fn from_pem(pem: &[u8]) -> Result<Self, CryptoError> {
        RsaPrivateKey::import_pem(pem).map(Self::new)
    }

    #[must_use]
    pub const fn private_key(&self) -> &RsaPrivateKey {
        &self.key
    }

    #[must_use]
    pub const fn public_key(&self) -> &RsaPublicKey {
        self.key.public_key()
    }
}

impl Credential for RsaCredential {
    fn add_authentication(&self, request: &mut HttpRequest) -> Result<(), AuthError> {
        let date = if let Some(existing) = request.headers().get(DATE) {
            existing
                .to_str()
                .map_err(|e| AuthError::DateParse {
                    message: e.to_string().into(),
                    context: Some("existing Date header".into()),
                })?
                .to_owned()
        } else {
            let now = format_http_date(Utc::now());
            request.headers_mut().insert(DATE, HeaderValue::from_str(&now)?);
            now
        };

        let signature = self.key.sign(&canonical_message(request, &date))?;
        let authorization =
            format!("{SIGNATURE_SCHEME} {}:{}", self.key.fingerprint(), STANDARD.encode(signature));
        request.headers_mut().insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);

        Ok(())
    }

    fn fingerprint(&self) -> &str {
        self.key.fingerprint()
    }

    fn verifier(&self) -> &[u8] {
        self.key.public_key().export_pem().as_bytes()
    }
}

impl Decrypter for RsaCredential {
    fn encryption_key(&self) -> &RsaPublicKey {
        self.key.public_key()
    }

    fn decrypt(&self, ciphertext: &HybridCiphertext) -> Result<Vec<u8>, CryptoError> {
        decrypt_hybrid(ciphertext, &self.key)
    }

    fn re_encrypt(
        &self,
        ciphertext: &HybridCiphertext,
        to: &RsaPublicKey,
    ) -> Result<HybridCiphertext, CryptoError> {
        ciphertext.re_encrypt(&self.key, to)
    }
}

//! RSA key pairs.
//!
//! Private keys are exchanged as PKCS#1 (`RSA PRIVATE KEY`) and public keys as PKIX
//! (`PUBLIC KEY`) PEM documents. Signatures use RSASSA-PKCS1-v1_5 over SHA-256 and encryption
//! uses RSA-OAEP with SHA-256 and an empty label.

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::der::Decode;
use rsa::pkcs8::{EncodePublicKey, LineEnding, SubjectPublicKeyInfoRef};
use rsa::{Oaep, Pkcs1v15Sign};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::envelope::AsymmetricCiphertext;
use crate::error::CryptoError;

/// Modulus size for credential keys, which authenticate to the API and wrap account keys.
///
/// Credentials are exposed to the network, so they are never weaker than the account keys
/// they protect. Both currently share the 4096-bit maximum.
pub const CREDENTIAL_KEY_BITS: usize = 4096;

/// Modulus size for account keys. At most [`CREDENTIAL_KEY_BITS`].
pub const ACCOUNT_KEY_BITS: usize = 4096;

const _: () = assert!(CREDENTIAL_KEY_BITS >= ACCOUNT_KEY_BITS);

const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
const PUBLIC_KEY_LABELS: [&str; 2] = ["PUBLIC KEY", "RSA PUBLIC KEY"];

/// The public half of an RSA key pair.
///
/// The canonical PEM export and its fingerprint are computed once when the key is built, so
/// both accessors are infallible.
#[derive(Clone)]
pub struct RsaPublicKey {
    inner: rsa::RsaPublicKey,
    pem: String,
    fingerprint: String,
}

impl RsaPublicKey {
    fn from_inner(inner: rsa::RsaPublicKey) -> Result<Self, CryptoError> {
        let pem = inner.to_public_key_pem(LineEnding::LF).map_err(|e| CryptoError::KeyExport {
            message: e.to_string().into(),
            context: Some("public key".into()),
        })?;
        let fingerprint = hex::encode(Sha256::digest(pem.as_bytes()));

        Ok(Self { inner, pem, fingerprint })
    }

    /// Imports a public key from a single PKIX PEM block.
    ///
    /// # Errors
    /// * [`CryptoError::EmptyKey`] If `encoded` is empty.
    /// * [`CryptoError::NoKeyFound`] If no PEM block is present.
    /// * [`CryptoError::MultipleKeysFound`] If anything but the line ending follows the block.
    /// * [`CryptoError::InvalidKeyEncoding`] If the block or its DER content is malformed.
    /// * [`CryptoError::UnsupportedKeyType`] If the block holds a non-RSA public key.
    pub fn import_pem(encoded: &[u8]) -> Result<Self, CryptoError> {
        let (label, der) = decode_single_pem(encoded)?;
        if !PUBLIC_KEY_LABELS.contains(&label.as_str()) {
            return Err(CryptoError::InvalidKeyEncoding {
                message: format!("unexpected PEM label `{label}`").into(),
                context: Some("public key".into()),
            });
        }

        let spki = SubjectPublicKeyInfoRef::from_der(&der).map_err(|e| {
            CryptoError::InvalidKeyEncoding {
                message: e.to_string().into(),
                context: Some("public key".into()),
            }
        })?;
        if spki.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
            return Err(CryptoError::UnsupportedKeyType {
                context: Some(spki.algorithm.oid.to_string().into()),
            });
        }

        let inner =
            rsa::RsaPublicKey::try_from(spki).map_err(|e| CryptoError::InvalidKeyEncoding {
                message: e.to_string().into(),
                context: Some("public key".into()),
            })?;
        Self::from_inner(inner)
    }

    /// Canonical PKIX PEM export. This is the exact blob a fingerprint is computed over.
    #[must_use]
    pub fn export_pem(&self) -> &str {
        &self.pem
    }

    /// Lowercase hex SHA-256 of [`Self::export_pem`].
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Verifies a PKCS#1 v1.5 SHA-256 signature over `message`.
    ///
    /// # Errors
    /// * [`CryptoError::SignatureNotVerified`] For any mismatch, whatever the cause.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let hashed = Sha256::digest(message);
        self.inner
            .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
            .map_err(|_| CryptoError::signature_not_verified())
    }

    /// Encrypts `plaintext` with RSA-OAEP (SHA-256, empty label).
    ///
    /// # Errors
    /// * [`CryptoError::Encryption`] If the plaintext does not fit the modulus.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<AsymmetricCiphertext, CryptoError> {
        let data = self.inner.encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext).map_err(
            |e| CryptoError::Encryption {
                message: e.to_string().into(),
                context: Some("RSA-OAEP".into()),
            },
        )?;
        Ok(AsymmetricCiphertext { data })
    }
}

impl PartialEq for RsaPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.pem == other.pem
    }
}

impl Eq for RsaPublicKey {}

impl std::fmt::Debug for RsaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPublicKey").field("fingerprint", &self.fingerprint).finish()
    }
}

/// An RSA private key together with its public half.
///
/// ### Example
/// ```rust
/// use sigil_crypto::RsaPrivateKey;
///
/// # fn main() -> Result<(), sigil_crypto::CryptoError> {
/// let key = RsaPrivateKey::generate(1024)?;
/// let signature = key.sign(b"GET\n/\n")?;
/// key.public_key().verify(b"GET\n/\n", &signature)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RsaPrivateKey {
    inner: rsa::RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaPrivateKey {
    /// Generates a fresh key pair with a modulus of `bits` bits.
    ///
    /// Use [`CREDENTIAL_KEY_BITS`] or [`ACCOUNT_KEY_BITS`] for anything exposed to the network.
    ///
    /// # Errors
    /// * [`CryptoError::KeyGeneration`] If the RSA generator fails.
    /// * [`CryptoError::KeyExport`] If the public half cannot be encoded.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        let inner = rsa::RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| {
            CryptoError::KeyGeneration {
                message: e.to_string().into(),
                context: Some(format!("{bits} bits").into()),
            }
        })?;
        Self::from_inner(inner)
    }

    fn from_inner(inner: rsa::RsaPrivateKey) -> Result<Self, CryptoError> {
        let public = RsaPublicKey::from_inner(inner.to_public_key())?;
        Ok(Self { inner, public })
    }

    /// Imports a private key from a single PKCS#1 PEM block.
    ///
    /// # Errors
    /// Same kinds as [`RsaPublicKey::import_pem`], except [`CryptoError::UnsupportedKeyType`].
    pub fn import_pem(encoded: &[u8]) -> Result<Self, CryptoError> {
        let (label, der) = decode_single_pem(encoded)?;
        let der = Zeroizing::new(der);
        if label != PRIVATE_KEY_LABEL {
            return Err(CryptoError::InvalidKeyEncoding {
                message: format!("unexpected PEM label `{label}`").into(),
                context: Some("private key".into()),
            });
        }
        Self::import_der(&der)
    }

    /// Imports a private key from raw PKCS#1 DER.
    ///
    /// # Errors
    /// * [`CryptoError::EmptyKey`] If `der` is empty.
    /// * [`CryptoError::InvalidKeyEncoding`] If `der` is not a PKCS#1 private key.
    pub fn import_der(der: &[u8]) -> Result<Self, CryptoError> {
        if der.is_empty() {
            return Err(CryptoError::EmptyKey { context: Some("private key".into()) });
        }
        let inner =
            rsa::RsaPrivateKey::from_pkcs1_der(der).map_err(|e| CryptoError::InvalidKeyEncoding {
                message: e.to_string().into(),
                context: Some("private key".into()),
            })?;
        Self::from_inner(inner)
    }

    /// Exports the private key as a PKCS#1 PEM document.
    ///
    /// # Errors
    /// * [`CryptoError::KeyExport`] If the key cannot be encoded.
    pub fn export_pem(&self) -> Result<Zeroizing<String>, CryptoError> {
        self.inner.to_pkcs1_pem(LineEnding::LF).map_err(|e| CryptoError::KeyExport {
            message: e.to_string().into(),
            context: Some("private key".into()),
        })
    }

    /// Exports the private key as raw PKCS#1 DER.
    ///
    /// # Errors
    /// * [`CryptoError::KeyExport`] If the key cannot be encoded.
    pub fn export_der(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let document = self.inner.to_pkcs1_der().map_err(|e| CryptoError::KeyExport {
            message: e.to_string().into(),
            context: Some("private key".into()),
        })?;
        Ok(Zeroizing::new(document.as_bytes().to_vec()))
    }

    #[must_use]
    pub const fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        self.public.fingerprint()
    }

    /// Signs SHA-256(`message`) with RSASSA-PKCS1-v1_5.
    ///
    /// # Errors
    /// * [`CryptoError::Signing`] If the RSA operation fails.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let hashed = Sha256::digest(message);
        self.inner.sign(Pkcs1v15Sign::new::<Sha256>(), &hashed).map_err(|e| CryptoError::Signing {
            message: e.to_string().into(),
            context: None,
        })
    }

    /// Decrypts an RSA-OAEP ciphertext.
    ///
    /// A zero-length ciphertext yields a zero-length plaintext.
    ///
    /// # Errors
    /// * [`CryptoError::DecryptionFailed`] If the ciphertext was not produced for this key or
    ///   was altered.
    pub fn decrypt(&self, ciphertext: &AsymmetricCiphertext) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.data.is_empty() {
            return Ok(Vec::new());
        }
        self.inner
            .decrypt(Oaep::new::<Sha256>(), &ciphertext.data)
            .map_err(|_| CryptoError::decryption_failed())
    }

    /// Decrypts `ciphertext` and immediately encrypts the plaintext for `target`.
    ///
    /// The intermediate plaintext is wiped before returning.
    ///
    /// # Errors
    /// * [`CryptoError::DecryptionFailed`] If this key cannot open `ciphertext`.
    /// * [`CryptoError::Encryption`] If the plaintext does not fit the target modulus.
    pub fn re_encrypt(
        &self,
        target: &RsaPublicKey,
        ciphertext: &AsymmetricCiphertext,
    ) -> Result<AsymmetricCiphertext, CryptoError> {
        let plaintext = Zeroizing::new(self.decrypt(ciphertext)?);
        target.encrypt(&plaintext)
    }
}

impl std::fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("fingerprint", &self.public.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Extracts exactly one PEM block from `input`, returning its label and DER body.
///
/// Text before the block is ignored. Only the line ending of the `END` line may follow it;
/// anything else counts as another key.
fn decode_single_pem(input: &[u8]) -> Result<(String, Vec<u8>), CryptoError> {
    if input.is_empty() {
        return Err(CryptoError::EmptyKey { context: None });
    }

    let begin = find(input, b"-----BEGIN ").ok_or(CryptoError::NoKeyFound { context: None })?;
    let block = &input[begin..];

    let end = find(block, b"-----END ")
        .and_then(|end| {
            let label_start = end + b"-----END ".len();
            find(&block[label_start..], b"-----").map(|close| label_start + close + 5)
        })
        .ok_or_else(|| CryptoError::InvalidKeyEncoding {
            message: "unterminated PEM block".into(),
            context: None,
        })?;
    let end = match &block[end..] {
        [b'\r', b'\n', ..] => end + 2,
        [b'\n', ..] => end + 1,
        _ => end,
    };

    if end < block.len() {
        return Err(CryptoError::MultipleKeysFound { context: None });
    }

    let (label, der) = rsa::pkcs8::der::pem::decode_vec(&block[..end]).map_err(|e| {
        CryptoError::InvalidKeyEncoding { message: e.to_string().into(), context: None }
    })?;
    Ok((label.to_owned(), der))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

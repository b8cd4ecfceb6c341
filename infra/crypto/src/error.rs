//! # Crypto Errors
//!
//! This module defines the [`CryptoError`] enum used throughout the crate.
//!
//! Failures of the authenticated primitives are deliberately coarse: a decryption reports
//! [`CryptoError::DecryptionFailed`] and a verification reports
//! [`CryptoError::SignatureNotVerified`] no matter which internal check rejected the input.

use std::borrow::Cow;

/// A specialized [`CryptoError`] enum for cryptographic failures.
#[sigil_derive::sigil_error]
pub enum CryptoError {
    /// The operating system randomness source failed. Never retried with weaker randomness.
    #[error("Randomness source failure{}: {message}", format_context(.context))]
    Randomness { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Key pair generation failed.
    #[error("Key generation failed{}: {message}", format_context(.context))]
    KeyGeneration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Encryption failed (e.g. plaintext too large for the RSA modulus).
    #[error("Encryption failed{}: {message}", format_context(.context))]
    Encryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Decryption or authentication of a ciphertext failed.
    ///
    /// Wrong keys and tampered data are reported identically.
    #[error("Could not decrypt data{}", format_context(.context))]
    DecryptionFailed { context: Option<Cow<'static, str>> },

    /// Producing a signature failed.
    #[error("Signing failed{}: {message}", format_context(.context))]
    Signing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A signature did not verify against the message and public key.
    #[error("Signature not verified{}", format_context(.context))]
    SignatureNotVerified { context: Option<Cow<'static, str>> },

    /// An empty byte string was supplied where an encoded key was expected.
    #[error("Key should not be empty{}", format_context(.context))]
    EmptyKey { context: Option<Cow<'static, str>> },

    /// The input contains no PEM encoded block.
    #[error("No key found in input{}", format_context(.context))]
    NoKeyFound { context: Option<Cow<'static, str>> },

    /// The input contains more than one PEM block or trailing data.
    #[error("Multiple keys found in input{}", format_context(.context))]
    MultipleKeysFound { context: Option<Cow<'static, str>> },

    /// The PEM or DER structure of a key could not be parsed.
    #[error("Invalid key encoding{}: {message}", format_context(.context))]
    InvalidKeyEncoding { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The decoded key is not an RSA key.
    #[error("Key type is not supported{}", format_context(.context))]
    UnsupportedKeyType { context: Option<Cow<'static, str>> },

    /// Exporting a key to its canonical encoding failed.
    #[error("Key export failed{}: {message}", format_context(.context))]
    KeyExport { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Raw key material has the wrong length.
    #[error("Invalid key length{}: {message}", format_context(.context))]
    InvalidKeyLength { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An encoded ciphertext carries a different algorithm tag than the one expected.
    #[error("Wrong ciphertext algorithm{}: expected {expected}", format_context(.context))]
    WrongAlgorithm { expected: &'static str, context: Option<Cow<'static, str>> },

    /// An encoded ciphertext does not follow the `ALG$DATA$META` grammar.
    #[error("Malformed ciphertext{}: {message}", format_context(.context))]
    MalformedCiphertext { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A metadata entry required by the algorithm is absent.
    #[error("Missing ciphertext metadata `{key}`{}", format_context(.context))]
    MissingMetadata { key: &'static str, context: Option<Cow<'static, str>> },

    /// A base64 segment could not be decoded.
    #[error("Invalid base64{}: {source}", format_context(.context))]
    InvalidBase64 { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal crypto error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CryptoError {
    pub(crate) const fn decryption_failed() -> Self {
        Self::DecryptionFailed { context: None }
    }

    pub(crate) const fn signature_not_verified() -> Self {
        Self::SignatureNotVerified { context: None }
    }
}

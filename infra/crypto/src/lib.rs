//! Cryptographic core of the Sigil trust layer.
//!
//! This crate provides the primitives used to authenticate requests and to protect secret
//! content end-to-end:
//!
//! * [`symmetric`]: AES-256-GCM keys with fresh random nonces and HMAC-SHA256 indexing.
//! * [`asymmetric`]: RSA key pairs with PEM export/import, fingerprints, PKCS#1 v1.5 signatures
//!   and RSA-OAEP encryption.
//! * [`envelope`]: the self-describing ciphertext wire format.
//! * [`hybrid`]: RSA-OAEP wrapped AES-GCM payloads.
//!
//! ## Envelope Format
//!
//! Every ciphertext travels as a single string, typically inside a JSON field:
//!
//! ```text
//! ALGORITHM$BASE64(data)$key1=BASE64(v1),key2=BASE64(v2)
//! ```
//!
//! | Tag                | Metadata       |
//! |--------------------|----------------|
//! | `AES-GCM`          | `nonce`        |
//! | `RSA-OAEP`         | none           |
//! | `RSA-OAEP+AES-GCM` | `key`, `nonce` |
//!
//! Decoding always checks the tag against the expected ciphertext kind before trusting the
//! payload shape.
//!
//! ## Nonce Policy
//!
//! Symmetric keys are generated per hybrid encryption and every encryption draws a fresh
//! **random 96-bit nonce** from the OS CSPRNG. A failing randomness source aborts the operation.
//!
//! ## Example
//!
//! ```rust
//! use sigil_crypto::prelude::*;
//!
//! # fn main() -> Result<(), CryptoError> {
//! let recipient = RsaPrivateKey::generate(1024)?;
//!
//! let sealed = encrypt_hybrid(b"db-password", recipient.public_key())?;
//! let wire = sealed.encode();
//! assert!(wire.starts_with("RSA-OAEP+AES-GCM$"));
//!
//! let decoded = HybridCiphertext::decode(&wire)?;
//! assert_eq!(decrypt_hybrid(&decoded, &recipient)?, b"db-password");
//! # Ok(())
//! # }
//! ```

pub mod asymmetric;
pub mod envelope;
mod error;
pub mod hybrid;
mod rng;
pub mod symmetric;

pub use asymmetric::{ACCOUNT_KEY_BITS, CREDENTIAL_KEY_BITS, RsaPrivateKey, RsaPublicKey};
pub use envelope::{
    Algorithm, AsymmetricCiphertext, Envelope, HybridCiphertext, SymmetricCiphertext,
};
pub use error::{CryptoError, CryptoErrorExt};
pub use hybrid::{decrypt_hybrid, encrypt_hybrid};
pub use symmetric::SymmetricKey;

pub mod prelude {
    pub use crate::asymmetric::{RsaPrivateKey, RsaPublicKey};
    pub use crate::envelope::{
        AsymmetricCiphertext, Envelope, HybridCiphertext, SymmetricCiphertext,
    };
    pub use crate::error::{CryptoError, CryptoErrorExt};
    pub use crate::hybrid::{decrypt_hybrid, encrypt_hybrid};
    pub use crate::symmetric::SymmetricKey;
}

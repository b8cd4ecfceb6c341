//! # Request Authentication
//!
//! HTTP requests are authenticated with asymmetric signatures instead of passwords.
//!
//! ## Architecture
//!
//! 1. **Signing ([`credential`]):** a [`Credential`] adds a `Date` header (when absent) and an
//!    `Authorization: sigil-sig-v1 <fingerprint>:<base64 signature>` header to an outgoing
//!    request.
//! 2. **Verification ([`authenticator`]):** the [`Authenticator`] parses the headers, rejects
//!    superseded protocol versions, looks the fingerprint up through a [`CredentialGetter`]
//!    and checks the signature over the canonical request string ([`signature`]).
//!
//! An unknown fingerprint and a wrong signature are reported with the same
//! [`AuthError::SignatureNotVerified`], so callers cannot probe which fingerprints exist.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sigil_auth::prelude::*;
//! use sigil_crypto::RsaPrivateKey;
//! use sigil_domain::Credential as CredentialRecord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! struct Single(CredentialRecord);
//!
//! impl CredentialGetter for Single {
//!     fn get_credential(&self, fingerprint: &str) -> Result<CredentialRecord, LookupError> {
//!         if fingerprint == self.0.fingerprint {
//!             Ok(self.0.clone())
//!         } else {
//!             Err(LookupError::NotFound { context: None })
//!         }
//!     }
//! }
//!
//! let credential = RsaCredential::new(RsaPrivateKey::generate(1024)?);
//! let record = CredentialRecord {
//!     account_id: "acct-1".into(),
//!     fingerprint: credential.fingerprint().to_owned(),
//!     verifier: credential.verifier().to_vec(),
//! };
//!
//! let authenticator = Authenticator::new(MethodSignature::new(Arc::new(Single(record))));
//!
//! let mut request = http::Request::get("https://api.example.com/repos/jdoe").body(Vec::new())?;
//! credential.add_authentication(&mut request)?;
//!
//! let result = authenticator.verify(&request)?;
//! assert_eq!(result.account_id.as_str(), "acct-1");
//! # Ok(())
//! # }
//! ```

pub mod authenticator;
pub mod credential;
mod error;
pub mod lookup;
pub mod signature;

pub use crate::authenticator::{Authenticator, MethodSignature, VerificationMethod};
pub use crate::credential::{Credential, Decrypter, RsaCredential};
pub use crate::error::{AuthError, AuthErrorExt};
pub use crate::lookup::{CredentialGetter, LookupError, LookupErrorExt};

/// The request type signed and verified by this crate.
pub type HttpRequest = http::Request<Vec<u8>>;

pub mod prelude {
    pub use crate::authenticator::{Authenticator, MethodSignature, VerificationMethod};
    pub use crate::credential::{Credential, Decrypter, RsaCredential};
    pub use crate::error::{AuthError, AuthErrorExt};
    pub use crate::lookup::{CredentialGetter, LookupError};
    pub use crate::HttpRequest;
}

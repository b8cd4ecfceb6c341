//! # Account Keys
//!
//! Every account owns one RSA key pair, the *account key*, that encrypts its secrets. The
//! private half is never stored in the clear: it is hybrid-encrypted for each credential that
//! may use it, one [`EncryptedAccountKey`] per (account, credential) pair.
//!
//! * [`AccountKeyService::create`] generates the account key for the first credential.
//! * [`AccountKeyService::get`] unwraps it with a credential.
//! * [`AccountKeyService::share`] wraps it for another credential without the plaintext
//!   leaving the call.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sigil_account_key::{AccountKeyService, MemoryAccountKeyStore};
//! use sigil_auth::RsaCredential;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryAccountKeyStore::new();
//! let laptop = RsaCredential::generate(1024)?;
//! let account = store.register_credential(&laptop);
//!
//! let service = AccountKeyService::new(Arc::new(store.clone())).with_account_key_bits(1024);
//! service.create(&laptop)?;
//!
//! let phone = RsaCredential::generate(1024)?;
//! store.register_credential_for(account, &phone);
//! service.share(&laptop, phone.public_key())?;
//!
//! assert_eq!(service.get(&phone)?.fingerprint(), service.get(&laptop)?.fingerprint());
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod model;
mod service;
mod store;

pub use crate::error::{AccountKeyError, AccountKeyErrorExt};
pub use crate::memory::MemoryAccountKeyStore;
pub use crate::model::{CreateAccountKeyRequest, EncryptedAccountKey};
pub use crate::service::AccountKeyService;
pub use crate::store::AccountKeyStore;

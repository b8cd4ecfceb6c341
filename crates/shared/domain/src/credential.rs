use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// A registered credential as the server knows it.
///
/// `verifier` is the exported public key used to check signatures and `fingerprint` is the
/// hex SHA-256 of that export. The private signing key never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub account_id: AccountId,
    pub fingerprint: String,
    pub verifier: Vec<u8>,
}

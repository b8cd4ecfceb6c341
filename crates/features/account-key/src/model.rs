use serde::{Deserialize, Serialize};
use sigil_crypto::HybridCiphertext;
use sigil_domain::AccountId;

use crate::error::AccountKeyError;

/// An account key wrapped for one credential.
///
/// There is one record per (account, credential) pair. All records of an account share the
/// same `public_key`; only the wrapping differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedAccountKey {
    pub account: AccountId,
    /// PEM of the account public key.
    pub public_key: Vec<u8>,
    pub encrypted_private_key: HybridCiphertext,
    /// Fingerprint of the credential the private key is wrapped for.
    pub credential: String,
}

/// Submission of a wrapped account key for a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountKeyRequest {
    pub encrypted_private_key: HybridCiphertext,
    pub public_key: Vec<u8>,
}

impl CreateAccountKeyRequest {
    /// # Errors
    /// * [`AccountKeyError::InvalidPublicKey`] If `public_key` is empty.
    pub const fn validate(&self) -> Result<(), AccountKeyError> {
        if self.public_key.is_empty() {
            return Err(AccountKeyError::InvalidPublicKey { context: None });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_public_key() {
        let request = CreateAccountKeyRequest {
            encrypted_private_key: HybridCiphertext::default(),
            public_key: Vec::new(),
        };

        assert_eq!(request.validate().unwrap_err().code(), "invalid_public_key");
    }

    #[test]
    fn test_empty_ciphertext_serializes_as_empty_string() {
        let record = EncryptedAccountKey {
            account: "acct".into(),
            public_key: b"pem".to_vec(),
            encrypted_private_key: HybridCiphertext::default(),
            credential: "fp".into(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["encrypted_private_key"], "");
        assert_eq!(json["account"], "acct");
        assert_eq!(serde_json::from_value::<EncryptedAccountKey>(json).unwrap(), record);
    }
}

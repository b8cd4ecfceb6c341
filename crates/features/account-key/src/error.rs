use std::borrow::Cow;

#[sigil_derive::sigil_error]
pub enum AccountKeyError {
    /// No account key is stored for the credential.
    #[error("Account has not been keyed yet{}", format_context(.context))]
    AccountNotKeyed { context: Option<Cow<'static, str>> },

    /// The credential already holds an account key; records are never replaced.
    #[error("Account key already exists{}", format_context(.context))]
    AlreadyKeyed { context: Option<Cow<'static, str>> },

    /// The fingerprint is not a registered credential.
    #[error("Unknown credential{}", format_context(.context))]
    UnknownCredential { context: Option<Cow<'static, str>> },

    /// The public half of the account key is missing or inconsistent.
    #[error("Invalid account public key{}", format_context(.context))]
    InvalidPublicKey { context: Option<Cow<'static, str>> },

    /// The backing store failed.
    #[error("Account key store failure{}: {message}", format_context(.context))]
    Store { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Crypto error{}: {source}", format_context(.context))]
    Crypto { source: sigil_crypto::CryptoError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal account key error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

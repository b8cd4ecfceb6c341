//! Facade crate for the Sigil trust core.
//! Re-exports the crypto, auth and account-key crates and wires them from one configuration.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! ```rust
//! use std::sync::Arc;
//! use sigil::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = SigilConfig::default();
//! config.keys.account_key_bits = 1024;
//! config.keys.credential_bits = 1024;
//! config.logging.console = false;
//!
//! let store = Arc::new(MemoryAccountKeyStore::new());
//! let core = TrustCore::from_config(&config, store.clone(), store.clone())?;
//!
//! let credential = core.generate_credential()?;
//! store.register_credential(&credential);
//! core.account_keys().create(&credential)?;
//!
//! let mut request = http::Request::get("/secrets").body(Vec::new())?;
//! credential.add_authentication(&mut request)?;
//! assert_eq!(core.authenticator().verify(&request)?.fingerprint, credential.fingerprint());
//! # Ok(())
//! # }
//! ```

mod error;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sigil_domain::config::{LoggingConfig, SigilConfig};
use sigil_logger::{LevelFilter, Telemetry};
use tracing::info;

pub use crate::error::{SigilError, SigilErrorExt};
pub use sigil_account_key as account_key;
pub use sigil_auth as auth;
pub use sigil_crypto as crypto;
pub use sigil_domain as domain;
pub use sigil_kernel as kernel;
pub use sigil_logger as logger;

use sigil_account_key::{AccountKeyService, AccountKeyStore};
use sigil_auth::{Authenticator, CredentialGetter, MethodSignature, RsaCredential};

/// The verifier and the account-key service, sharing one [`Telemetry`] handle.
#[derive(Debug)]
pub struct TrustCore {
    telemetry: Telemetry,
    authenticator: Authenticator,
    account_keys: AccountKeyService,
    credential_bits: usize,
}

impl TrustCore {
    /// Assembles a core from `config` and the two storage collaborators.
    ///
    /// # Errors
    /// * [`SigilError::InvalidSetting`] If the log level is unknown.
    /// * [`SigilError::Telemetry`] If the telemetry handle cannot be built.
    pub fn from_config(
        config: &SigilConfig,
        credentials: Arc<dyn CredentialGetter>,
        store: Arc<dyn AccountKeyStore>,
    ) -> Result<Self, SigilError> {
        let telemetry = telemetry_from_config(&config.logging)?;

        let authenticator =
            Authenticator::from_config(&config.signing, MethodSignature::new(credentials))
                .with_telemetry(telemetry.clone());
        let account_keys =
            AccountKeyService::from_config(&config.keys, store).with_telemetry(telemetry.clone());

        telemetry.in_scope(|| {
            info!(
                max_clock_skew = ?config.signing.max_clock_skew_secs.map(Duration::from_secs),
                account_key_bits = config.keys.account_key_bits,
                "Trust core ready"
            );
        });

        Ok(Self {
            telemetry,
            authenticator,
            account_keys,
            credential_bits: config.keys.credential_bits,
        })
    }

    /// Loads the configuration from `path` (plus `SIGIL__*` overrides) and assembles a core.
    ///
    /// # Errors
    /// * [`SigilError::Config`] If the configuration cannot be loaded.
    /// * Any error of [`TrustCore::from_config`].
    pub fn load(
        path: Option<impl AsRef<std::path::Path>>,
        credentials: Arc<dyn CredentialGetter>,
        store: Arc<dyn AccountKeyStore>,
    ) -> Result<Self, SigilError> {
        let config: SigilConfig = kernel::config::load_config(path)?;
        Self::from_config(&config, credentials, store)
    }

    /// Generates a new signing credential with the configured key size.
    ///
    /// # Errors
    /// * [`sigil_crypto::CryptoError::KeyGeneration`] If key generation fails.
    pub fn generate_credential(&self) -> Result<RsaCredential, sigil_crypto::CryptoError> {
        self.telemetry.in_scope(|| -> Result<_, sigil_crypto::CryptoError> {
            let credential = RsaCredential::generate(self.credential_bits)?;
            info!(fingerprint = sigil_auth::Credential::fingerprint(&credential), "Credential generated");
            Ok(credential)
        })
    }

    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[must_use]
    pub const fn account_keys(&self) -> &AccountKeyService {
        &self.account_keys
    }

    #[must_use]
    pub const fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }
}

/// Builds the [`Telemetry`] handle described by `config`.
///
/// With neither console nor file output configured the handle is [`Telemetry::disabled`].
///
/// # Errors
/// * [`SigilError::InvalidSetting`] If `level` is not a tracing level.
/// * [`SigilError::Telemetry`] If the builder rejects the settings.
pub fn telemetry_from_config(config: &LoggingConfig) -> Result<Telemetry, SigilError> {
    if !config.console && config.path.is_none() {
        return Ok(Telemetry::disabled());
    }

    let level = LevelFilter::from_str(&config.level).map_err(|e| SigilError::InvalidSetting {
        message: e.to_string().into(),
        context: Some(format!("logging.level = {:?}", config.level).into()),
    })?;

    let mut builder = Telemetry::builder().name(&config.name).level(level).console(config.console);
    if let Some(filter) = &config.env_filter {
        builder = builder.env_filter(filter);
    }

    let telemetry = match &config.path {
        Some(path) => builder.path(path).json(config.json).build()?,
        None => builder.build()?,
    };
    Ok(telemetry)
}

pub mod prelude {
    pub use crate::{SigilError, TrustCore};
    pub use sigil_account_key::{AccountKeyService, AccountKeyStore, MemoryAccountKeyStore};
    pub use sigil_auth::prelude::*;
    pub use sigil_crypto::prelude::*;
    pub use sigil_domain::config::SigilConfig;
    pub use sigil_domain::{AccountId, AuthResult};
}

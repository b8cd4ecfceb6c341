use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration of the trust core.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SigilConfig {
    pub signing: SigningConfig,
    pub keys: KeyConfig,
    pub logging: LoggingConfig,
}

/// Request verification policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Maximum distance between a request's `Date` and the verifier's clock.
    /// `None` disables the freshness check.
    pub max_clock_skew_secs: Option<u64>,
}

/// RSA modulus sizes for generated keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub credential_bits: usize,
    pub account_key_bits: usize,
}

/// Telemetry handle settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    pub level: String,
    pub console: bool,
    pub json: bool,
    pub path: Option<PathBuf>,
    pub env_filter: Option<String>,
}

// --- Default ---

impl Default for SigningConfig {
    fn default() -> Self {
        Self { max_clock_skew_secs: Some(300) }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self { credential_bits: 4096, account_key_bits: 4096 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "sigil".to_owned(),
            level: "info".to_owned(),
            console: true,
            json: false,
            path: None,
            env_filter: None,
        }
    }
}

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment variables overriding file settings.
pub const ENV_PREFIX: &str = "SIGIL";

const DEFAULT_CONFIG_FILE: &str = "sigil";

/// Custom error type for config loading.
#[sigil_derive::sigil_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file layered with environment overrides.
///
/// 1. **Base File**: settings from `path` (any format the `config` crate recognises by
///    extension). Defaults to `sigil` in the working directory.
/// 2. **Environment Overrides**: variables prefixed with `SIGIL__`. Nested structures use
///    double underscores, e.g. `SIGIL__SIGNING__MAX_CLOCK_SKEW_SECS` maps to
///    `signing.max_clock_skew_secs`.
///
/// # Errors
/// * [`ConfigError::Config`] If the file is missing, an override is malformed, or the merged
///   settings do not match `T`.
///
/// # Example
/// ```rust
/// use sigil_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

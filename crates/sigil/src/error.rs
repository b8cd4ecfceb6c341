use std::borrow::Cow;

/// Errors raised while assembling a [`crate::TrustCore`].
#[sigil_derive::sigil_error]
pub enum SigilError {
    #[error("Configuration error{}: {source}", format_context(.context))]
    Config { source: sigil_kernel::config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Telemetry error{}: {source}", format_context(.context))]
    Telemetry { source: sigil_logger::LoggerError, context: Option<Cow<'static, str>> },

    /// A setting has an unusable value.
    #[error("Invalid setting{}: {message}", format_context(.context))]
    InvalidSetting { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

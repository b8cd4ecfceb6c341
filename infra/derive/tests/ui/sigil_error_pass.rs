use sigil_derive::sigil_error;
use std::borrow::Cow;

#[sigil_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Signature not verified{}", format_context(.context))]
    SignatureNotVerified { context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err(std::io::Error::other("disk")).context("reading key file")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.code(), "io");
    assert!(err.to_string().contains("reading key file"));

    let err = DemoError::SignatureNotVerified { context: None };
    assert_eq!(err.code(), "signature_not_verified");

    let err: DemoError = "boom".into();
    assert_eq!(err.code(), "internal");
}

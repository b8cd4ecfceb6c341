#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Sigil crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! sigil-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// Turns a plain enum into an error type wired into the rest of the workspace.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Error Kinds**: Generates `code(&self) -> &'static str`, a stable snake_case identifier
///   per variant (e.g. `SignatureNotVerified` -> `"signature_not_verified"`), so callers can
///   branch on the kind without matching on display strings.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()` to any
///   `Result` whose error converts into this enum.
/// * **Standard Conversions**: Implements `From<T>` for variants carrying a `source` field
///   (or a field marked `#[source]`/`#[from]`), enabling `?` on upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal` variant exists.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with **named-field** variants.
/// 2. Context-aware variants carry `context: Option<Cow<'static, str>>`.
/// 3. Variants with a source must also carry a context field.
///
/// # Example
///
/// ```rust,ignore
/// use sigil_derive::sigil_error;
/// use std::borrow::Cow;
///
/// #[sigil_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Record not found{}", format_context(.context))]
///     NotFound { context: Option<Cow<'static, str>> },
/// }
///
/// assert_eq!(StoreError::NotFound { context: None }.code(), "not_found");
/// ```
#[proc_macro_attribute]
pub fn sigil_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

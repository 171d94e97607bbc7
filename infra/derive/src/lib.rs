#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the Accelade infrastructure crates.
//!
//! The only macro today is [`macro@accelade_error`], which every crate in the
//! workspace uses to declare its error enum.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! accelade-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for declaring a crate-level error enum.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped source error.
/// * **Standard Conversions**: Implements `From<Source>` for variants with a `source`
///   field (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Internal Fallback**: Implements `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant exists.
/// * **Formatting Helper**: Emits a module-local `format_context` used by `#[error(...)]`
///   strings to render the optional context as ` (context)`.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with **named-field** variants.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Every variant wrapping a source error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use accelade_derive::accelade_error;
/// use std::borrow::Cow;
///
/// #[accelade_error]
/// pub enum SharedDataError {
///     #[error("Malformed payload{}: {source}", format_context(.context))]
///     Json { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn decode(raw: &str) -> Result<serde_json::Value, SharedDataError> {
///     serde_json::from_str(raw).context("Decoding bootstrap payload")
/// }
/// ```
#[proc_macro_attribute]
pub fn accelade_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

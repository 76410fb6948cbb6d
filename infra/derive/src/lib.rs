#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared by the phonebook crates.
//!
//! At the moment the crate exposes a single attribute, [`macro@phonebook_error`], which
//! turns a plain enum into a `thiserror` error with context support.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! phonebook-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for declaring crate-level error enums.
///
/// # Features
///
/// * **Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context**: Generates a companion `<Name>Ext` trait adding `.context(...)` to
///   `Result<T, Name>` and to `Result<T, Source>` for every variant with a source.
/// * **Conversions**: Implements `From<Source>` for variants carrying a `source` field
///   (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Internal fallback**: When an `Internal { message, context }` variant exists,
///   `From<&'static str>` and `From<String>` are generated for it.
/// * **Formatting**: A module-private `format_context` helper renders the optional
///   context as ` (context)` for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums with named-field variants (or unit-free struct-like variants) are accepted.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants with a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use phonebook_derive::phonebook_error;
/// use std::borrow::Cow;
///
/// #[phonebook_error]
/// pub enum StoreError {
///     #[error("Database error{}: {source}", format_context(.context))]
///     Database { source: surrealdb::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<(), StoreError> {
///     query().context("Loading persons")?;
///     Err("unreachable".into())
/// }
/// ```
#[proc_macro_attribute]
pub fn phonebook_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

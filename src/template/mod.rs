//! Placeholder templates for generated test suites.
//!
//! A [`Template`] is opaque text loaded from a file, an inline string or a
//! compiled-in builtin. Rendering substitutes `$NAME` / `${NAME}`
//! placeholders from a [`CaseRecord`](crate::case::CaseRecord) per case and
//! treats `$$` as an escaped dollar sign.

mod builtin;
mod error;
mod render;
mod store;

pub use error::TemplateError;
pub use store::{Template, TemplateSet, TemplateSource};

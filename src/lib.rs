//! Infer Go struct declarations from a JSON sample.
//!
//! ```
//! let go = json2struct::convert(r#"{"title": "j2s"}"#).unwrap();
//! assert_eq!(go, "type J2S1 struct {\n\tTitle string `json:\"title\"`\n}");
//! ```
//!
//! Pipeline: parse → [`inference`] (arena of per-id contributions) →
//! [`lower`] (merge) → [`codegen`] (emit) → [`gofmt`] (canonical format).
//! Every call is self-contained; nothing is cached between calls.
pub mod codegen;
pub mod config;
pub mod error;
pub mod gofmt;
pub mod ident;
pub mod inference;
pub mod ir;
pub mod lower;
pub mod value;

pub use config::{OmitEmpty, Options};
pub use error::{Error, Result};
pub use ident::derive_identifier;
pub use inference::Inference;
pub use value::Value;

/// Convert with default [`Options`]: json tags, no `omitempty`.
pub fn convert(text: &str) -> Result<String> {
    convert_with_options(text, &Options::default())
}

/// Convert JSON text using `options`. Fails on malformed JSON before any
/// inference happens.
pub fn convert_with_options(text: &str, options: &Options) -> Result<String> {
    let value = Value::parse(text)?;
    convert_value(&value, options)
}

/// Convert an already parsed document.
pub fn convert_value(value: &Value, options: &Options) -> Result<String> {
    let decls = Inference::new().solve(value);
    Ok(codegen::render(&decls, options)?)
}

/// Legacy structural formatting: every object becomes its own declaration and
/// nothing is merged, so arrays of several objects degrade to `[]interface{}`.
pub fn format_only(text: &str) -> Result<String> {
    let value = Value::parse(text)?;
    format_value(&value)
}

/// [`format_only`] for an already parsed document.
pub fn format_value(value: &Value) -> Result<String> {
    let decls = Inference::legacy().solve(value);
    Ok(codegen::render(&decls, &Options::default())?)
}

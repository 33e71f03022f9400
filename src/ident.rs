//! Go field identifiers from arbitrary JSON keys.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A leading letter, or a letter right after `_` / `-`.
static WORD_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^[A-Za-z])|_([A-Za-z])|-([A-Za-z])").expect("static pattern compiles")
});

/// `snake_case` → `SnakeCase`, `kebab-case` → `KebabCase`.
///
/// Only separators followed by an ASCII letter are dropped; any other character
/// (digits, unicode, existing case) passes through unchanged. Pure: the result
/// depends on `key` alone.
pub fn derive_identifier(key: &str) -> String {
    WORD_START
        .replace_all(key, |caps: &Captures| caps[0].replace(['_', '-'], "").to_uppercase())
        .into_owned()
}

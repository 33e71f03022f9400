use serde::{Deserialize, Serialize};

pub const DEFAULT_TAG_NAME: &str = "json";

/// When to append `,omitempty` inside a field tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OmitEmpty {
    #[default]
    None,
    AllFields,
    /// only fields missing from some merged object
    OptionalFieldsOnly,
}

/// Rendering options for one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// emit a struct tag on every field
    pub use_tag: bool,
    /// tag key; empty falls back to [`DEFAULT_TAG_NAME`]. Unused without `use_tag`.
    pub tag_name: String,
    pub omit_empty: OmitEmpty,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_tag: true,
            tag_name: DEFAULT_TAG_NAME.to_owned(),
            omit_empty: OmitEmpty::None,
        }
    }
}

impl Options {
    pub fn tag_name(&self) -> &str {
        if self.tag_name.is_empty() { DEFAULT_TAG_NAME } else { &self.tag_name }
    }
}

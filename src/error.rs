use thiserror::Error;

use crate::gofmt::FormatError;

/// Conversion failure. Either kind aborts the whole conversion.
#[derive(Debug, Error)]
pub enum Error {
    #[error("json unmarshal Error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("code format error: {0}")]
    Render(#[from] FormatError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type shared by the library modules.
//!
//! Whole-input failures (`Configuration`, `NoData`) abort a run. Line-level
//! `MalformedRecord` errors are produced by the single-line parsers and are
//! usually counted and skipped by the bulk loaders.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no cracked accounts, nothing to report")]
    NoData,

    #[error("malformed record ({reason}): {line}")]
    MalformedRecord { line: String, reason: &'static str },
}

impl Error {
    pub(crate) fn malformed(line: &str, reason: &'static str) -> Self {
        Self::MalformedRecord {
            line: line.to_string(),
            reason,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types for the loader.
//!
//! Per-line failures (`MalformedLine`, `RequiredFieldMissing`, `DateParse`) are
//! handled at the line boundary by the driver. `FileAccess` and `Store` end the
//! phase they occur in.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Dump file missing or unreadable.
    #[error("cannot open dump file {path:?}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `{` on the line, or the text from it is not a JSON object.
    #[error("malformed line: {0}")]
    MalformedLine(String),

    /// A structurally required field is absent.
    #[error("required field missing: {0}")]
    RequiredFieldMissing(&'static str),

    /// `created.value` does not match the fixed timestamp layout.
    #[error("unparsable timestamp {value:?}: {source}")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The store rejected a write.
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl Error {
    /// True for errors that only invalidate the current line.
    pub fn is_line_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedLine(_) | Error::RequiredFieldMissing(_) | Error::DateParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_errors_are_recoverable() {
        assert!(Error::MalformedLine("x".into()).is_line_error());
        assert!(Error::RequiredFieldMissing("key").is_line_error());
        let source = chrono::NaiveDate::parse_from_str("nope", "%Y").unwrap_err();
        assert!(Error::DateParse {
            value: "nope".into(),
            source
        }
        .is_line_error());
    }

    #[test]
    fn phase_errors_are_not_line_errors() {
        let err = Error::FileAccess {
            path: PathBuf::from("/missing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_line_error());
        assert!(err.to_string().contains("/missing"));
        assert!(!Error::Store(anyhow::anyhow!("down")).is_line_error());
    }
}

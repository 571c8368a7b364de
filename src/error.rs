//! Application error types.
//!
//! Malformed reference text is never an error: the parser returns `None` and
//! the extractor reports unparsed fragments. These variants cover wiring
//! mistakes and the file-backed collaborators around the parsing core.

use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<std::path::PathBuf>,
    },

    /// Configuration or wiring error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Translation or alias file parsing error
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<std::path::PathBuf>,
        /// Description of the parse failure.
        message: String,
    },

    /// Requested translation is not loaded or not present on disk
    #[error("Translation not found: {0}")]
    Translation(String),

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Msg(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Msg(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn config_error_carries_hint() {
        let err = Error::config("No reference parser supplied", "Call ExtractorBuilder::parser");
        let text = err.to_string();
        assert!(text.contains("No reference parser supplied"));
        assert!(text.contains("ExtractorBuilder::parser"));
    }

    #[test]
    fn parse_error_mentions_file() {
        let err = Error::parse("no verses", Some(std::path::PathBuf::from("kjv.xml")));
        match err {
            Error::Parse { file: Some(f), message } => {
                assert_eq!(f, std::path::PathBuf::from("kjv.xml"));
                assert_eq!(message, "no verses");
            }
            _ => panic!("Expected Parse error with file"),
        }
    }
}

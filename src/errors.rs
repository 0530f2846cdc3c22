//! Shared error types for kbstats.
//!
//! Library code returns [`Result`] with the [`Error`] enum below. The binary
//! and the `init` command work with `anyhow` at the edge and attach context
//! there.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for kbstats operations
#[derive(Debug, Error)]
pub enum Error {
    /// A named benchmark identifier that the catalog does not know.
    #[error("The knowledge base is not supported: {0}")]
    UnsupportedKnowledgeBase(String),

    /// The report destination could not be opened, written or flushed.
    #[error("Output error on {destination}: {message}")]
    Output {
        message: String,
        destination: String,
        #[source]
        source: std::io::Error,
    },

    /// An input (model file or directory) could not be read.
    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No parser is registered for the file's extension.
    #[error("Unsupported feature model format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Malformed feature model content.
    #[error("Parse error in {}: {message}", location(.path, .line))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    /// The consistency check ran out of budget before reaching a verdict.
    #[error("Consistency check interrupted for {name}")]
    SolveInterrupted { name: String },

    /// Invalid configuration file or option combination.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn location(path: &Path, line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("{}:{}", path.display(), line),
        None => path.display().to_string(),
    }
}

impl Error {
    /// Create a parse error pointing at a line of the model file
    pub fn parse_at(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line: Some(line),
            message: message.into(),
        }
    }

    /// Create a parse error without line information
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn output(
        message: impl Into<String>,
        destination: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Output {
            message: message.into(),
            destination: destination.into(),
            source,
        }
    }

    /// Whether the error belongs to a single model file rather than the run.
    ///
    /// Only these errors may be skipped when the batch runs with the
    /// `continue` failure policy.
    pub fn is_item_local(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::UnsupportedFormat { .. } | Self::Parse { .. }
        )
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_includes_line_when_known() {
        let err = Error::parse_at("models/a.sxfm", 7, "unexpected group member");
        assert_eq!(
            err.to_string(),
            "Parse error in models/a.sxfm:7: unexpected group member"
        );

        let err = Error::parse("models/a.json", "missing tree");
        assert_eq!(err.to_string(), "Parse error in models/a.json: missing tree");
    }

    #[test]
    fn unsupported_knowledge_base_message() {
        let err = Error::UnsupportedKnowledgeBase("Boeing".into());
        assert_eq!(err.to_string(), "The knowledge base is not supported: Boeing");
    }

    #[test]
    fn item_local_classification() {
        assert!(Error::parse("a.xml", "bad").is_item_local());
        assert!(Error::UnsupportedFormat {
            path: "a.uvl".into()
        }
        .is_item_local());
        assert!(!Error::UnsupportedKnowledgeBase("X".into()).is_item_local());
        assert!(!Error::Configuration("bad".into()).is_item_local());
        assert!(!Error::SolveInterrupted { name: "pc".into() }.is_item_local());
    }
}

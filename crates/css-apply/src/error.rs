//! Error types for property-set processing.
//!
//! These are hard failures: the input could not be parsed, a file could not
//! be read, or the options are invalid. Problems with the property sets
//! themselves are reported as [`Warning`](crate::Warning)s instead.

use std::path::PathBuf;

use css_apply_syntax::{ParseError, TreeError};

/// Result type alias for css-apply operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while processing a stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stylesheet is not valid CSS.
    #[error(transparent)]
    Syntax(#[from] ParseError),

    /// A tree operation failed.
    #[error("Syntax tree error: {0}")]
    Tree(#[from] TreeError),

    /// File I/O error.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The options file is not valid TOML or has the wrong shape.
    #[error("Invalid options: {0}")]
    Options(#[from] toml::de::Error),

    /// A predefined property set has a name that can never be applied.
    #[error("Invalid property set name '{0}'")]
    InvalidSetName(String),

    /// A property set supplied through the options could not be parsed.
    #[error("Invalid predefined property set '--{name}': {source}")]
    PredefinedSet {
        name: String,
        #[source]
        source: ParseError,
    },
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

//! Error types for the compliance engine.

use std::{error::Error, fmt, io};

/// Error type for compliance engine operations.
///
/// Only configuration errors escape an evaluation; content failures are
/// folded into the report as warning issues.
#[derive(Debug)]
pub enum ComplianceError {
    /// An underlying I/O error while reading repository content.
    Io(io::Error),
    /// A rule set document could not be parsed or compiled.
    InvalidRuleSet(serde_json::Error),
    /// A rule value could not be compiled into a matcher.
    InvalidPattern(regex::Error),
    /// A rule set identifier that is not one of the known names.
    UnknownRuleSet(String),
    /// The content source has no content for the requested path.
    ContentUnavailable(String),
}

impl fmt::Display for ComplianceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::InvalidRuleSet(err) => write!(f, "invalid rule set: {err}"),
            Self::InvalidPattern(err) => write!(f, "invalid pattern: {err}"),
            Self::UnknownRuleSet(name) => write!(f, "unknown rule set: {name}"),
            Self::ContentUnavailable(path) => write!(f, "content unavailable for {path}"),
        }
    }
}

impl Error for ComplianceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidRuleSet(err) => Some(err),
            Self::InvalidPattern(err) => Some(err),
            Self::UnknownRuleSet(_) | Self::ContentUnavailable(_) => None,
        }
    }
}

impl From<io::Error> for ComplianceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ComplianceError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidRuleSet(value)
    }
}

impl From<regex::Error> for ComplianceError {
    fn from(value: regex::Error) -> Self {
        Self::InvalidPattern(value)
    }
}

/// Convenience result type for the compliance engine.
pub type Result<T> = std::result::Result<T, ComplianceError>;

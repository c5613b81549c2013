//! Line-local parse errors
//!
//! Every variant describes a problem with a single log line. None of them
//! abort a parse pass: [`crate::parser::SessionParser::parse_session`] records
//! the error and moves on to the next line.

use thiserror::Error;

/// Errors raised while decoding one session log line
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// `AnalyzeStartTime` carried a timestamp not in `YYYY-MM-DD HH:MM:SS.ffffff` form
    #[error("malformed session start timestamp: {0:?}")]
    MalformedTimestamp(String),

    /// Relative offset was missing, non-numeric or not finite
    #[error("malformed time offset: {0:?}")]
    MalformedOffset(String),

    /// A value field of a recognized record was missing or non-numeric
    #[error("malformed {field} field: {value:?}")]
    MalformedField { field: &'static str, value: String },
}

impl ParseError {
    /// Shorthand for a field that is absent from the line
    pub(crate) fn missing(field: &'static str) -> Self {
        ParseError::MalformedField {
            field,
            value: String::new(),
        }
    }
}

//! Error types shared across the RCDB crates.

use thiserror::Error;

/// Failure while turning database text into a timestamp.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTimestampError {
    /// The stored text was blank.
    #[error("empty timestamp")]
    Empty,
    /// The text is not a complete, valid timestamp.
    #[error("invalid timestamp \"{input}\": {source}")]
    ChronoError {
        /// Text that was parsed.
        input: String,
        /// Reason reported by chrono.
        #[source]
        source: chrono::ParseError,
    },
}

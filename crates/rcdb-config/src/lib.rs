//! Parser for the DAQ configuration files archived in RCDB.
//!
//! Files are plain text: decoration lines starting with `#`, `----` or `====` are
//! ignored, section keywords (or repeating slot headers such as `FADC250_SLOTS 3`)
//! open sections, and every other line is a row of whitespace-separated tokens.
//! Two-token rows are name/value pairs and longer rows are name/vector entries.
//!
//! ```
//! let text = "TRIGGER\nBLOCKLEVEL 1\nTRIG_EQ PS 35 10 1\n";
//! let result = rcdb_config::parse_config(text, &["TRIGGER"]);
//! let trigger = result.section("TRIGGER").unwrap();
//! assert_eq!(trigger.value("BLOCKLEVEL"), Some("1"));
//! assert_eq!(trigger.vector("TRIG_EQ").unwrap().len(), 4);
//! ```

pub mod lexer;
pub mod sections;

pub use lexer::{tokenize_line, tokenize_line_without_comments, Lexer};
pub use sections::{
    find_slot_sections, parse, parse_with_slots, ConfigSection, ParseResult, SlotSection,
};

use thiserror::Error;

/// Errors raised while parsing configuration text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigParseError {
    /// A slot header did not carry an integer slot number.
    #[error("invalid slot number {token:?} on line {line_number}: {line}")]
    InvalidSlotNumber {
        /// One-based line number within the parsed input.
        line_number: usize,
        /// The offending header line.
        line: String,
        /// The token that failed to parse.
        token: String,
    },
    /// A section value could not be converted to the requested type.
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        /// Row name.
        name: String,
        /// Raw token.
        value: String,
        /// Conversion error message.
        reason: String,
    },
}

/// Parses configuration text, opening a section at each line whose first token is
/// one of `expected_sections`.
pub fn parse_config<N: AsRef<str>>(text: &str, expected_sections: &[N]) -> ParseResult {
    let lines: Vec<&str> = text.lines().collect();
    parse(&lines, expected_sections, false)
}

/// Parses configuration text sectioned by `<slot_prefix> <slot> ...` header lines.
///
/// # Errors
///
/// Returns [`ConfigParseError::InvalidSlotNumber`] if a header's slot is not an integer.
pub fn parse_config_with_slots(
    text: &str,
    slot_prefix: &str,
) -> Result<ParseResult, ConfigParseError> {
    let lines: Vec<&str> = text.lines().collect();
    parse_with_slots(&lines, slot_prefix)
}

/// Re-exports for the most common types.
pub mod prelude {
    pub use crate::{
        parse_config, parse_config_with_slots, ConfigParseError, ConfigSection, ParseResult,
    };
}

//! Shared identifiers and timestamp handling used by the RCDB client crates.

pub mod errors;
pub mod parsers;

/// Primary integer identifier type used for database rows.
pub type Id = i64;

/// Run number type as stored in RCDB.
pub type RunNumber = i64;

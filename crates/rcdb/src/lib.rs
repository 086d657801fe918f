//! Client for the Run Conditions Database (RCDB).
//!
//! A [`Connection`] opens a database from a connection string, loads the
//! condition type registry, and serves typed per-run [`Condition`] values and
//! archived configuration files.
//!
//! ```no_run
//! use rcdb::prelude::*;
//!
//! # fn main() -> RCDBResult<()> {
//! let connection = Connection::open("sqlite:////data/rcdb.sqlite")?;
//! if let Some(condition) = connection.get_condition(30000, "event_count")? {
//!     println!("run 30000 recorded {} events", condition.as_int()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod connection_string;
pub mod data;
pub mod models;
pub mod provider;
pub mod registry;

pub use connection::{Connection, RCDB_CONNECTION_ENV};
pub use connection_string::{ConnectionParams, ConnectionStringError, MySqlConnectionInfo};
pub use data::{Condition, Value, ValueKindMismatchError};
pub use models::{ConditionType, RcdbFile, ValueType};
pub use provider::{Backend, ConditionKey, ConditionProvider, SqliteProvider};
pub use registry::ConditionTypeRegistry;

use rcdb_config::ConfigParseError;
use rcdb_core::{errors::ParseTimestampError, RunNumber};
use thiserror::Error;

/// Convenience alias for results returned from RCDB operations.
pub type RCDBResult<T> = Result<T, RCDBError>;

/// Errors that can occur while talking to RCDB or decoding its values.
#[derive(Error, Debug)]
pub enum RCDBError {
    /// Wrapper around rusqlite errors.
    #[error("{0}")]
    SqliteError(#[from] rusqlite::Error),
    /// The database could not be opened.
    #[error("failed to connect to {location}: {source}")]
    ConnectionFailed {
        /// Path or host that was being opened.
        location: String,
        /// Underlying driver error.
        #[source]
        source: rusqlite::Error,
    },
    /// The connection string could not be parsed.
    #[error("{0}")]
    ConnectionString(#[from] ConnectionStringError),
    /// The connection string names a backend this build cannot reach.
    #[error("the {0} backend is not supported")]
    UnsupportedBackend(Backend),
    /// A query was made on a closed connection.
    #[error("not connected to RCDB")]
    NotConnected,
    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingEnvironment(&'static str),
    /// Requested condition name does not exist.
    #[error("condition type not found: {0}")]
    ConditionTypeNotFound(String),
    /// The SQLite file does not contain the expected schema version entry.
    #[error("schema_versions table does not contain version 2")]
    MissingSchemaVersion,
    /// Timestamp parsing failed while decoding a `time` condition.
    #[error("{0}")]
    ParseTimestampError(#[from] ParseTimestampError),
    /// Encountered a value type identifier we do not understand.
    #[error("unknown RCDB value type identifier: {0}")]
    UnknownValueType(String),
    /// A value was read through an accessor its kind does not support.
    #[error("{0}")]
    ValueKindMismatch(#[from] ValueKindMismatchError),
    /// A stored value does not have the storage class its type calls for.
    #[error("condition {condition_name} at run {run_number} holds {found} where {value_type} was expected")]
    UnexpectedStorage {
        /// Condition type name.
        condition_name: String,
        /// Run being read.
        run_number: RunNumber,
        /// Declared kind.
        value_type: ValueType,
        /// Description of what was found.
        found: String,
    },
    /// A `json` value is not valid JSON.
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
    /// An archived configuration file could not be parsed.
    #[error("{0}")]
    ConfigParseError(#[from] ConfigParseError),
}

/// Re-exports for the most common types.
pub mod prelude {
    pub use crate::{
        connection::Connection,
        connection_string::ConnectionParams,
        data::{Condition, Value},
        models::{ConditionType, RcdbFile, ValueType},
        provider::ConditionProvider,
        registry::ConditionTypeRegistry,
        RCDBError, RCDBResult,
    };
    pub use rcdb_config::prelude::*;
    pub use rcdb_core::RunNumber;
}

//! Connection string parsing.
//!
//! Two forms are recognised:
//!
//! - `sqlite:///<path>`: everything after the third slash is the file path, so
//!   `sqlite:////data/rcdb.sqlite` names the absolute path `/data/rcdb.sqlite`.
//! - `mysql://[user[:password]@]host[:port][/database]`.

use std::{fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;

const SQLITE_PREFIX: &str = "sqlite:///";
const MYSQL_PREFIX: &str = "mysql://";

/// Errors raised while parsing a connection string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStringError {
    /// The string starts with neither `sqlite:///` nor `mysql://`.
    #[error("connection string must start with 'sqlite:///' or 'mysql://': {0}")]
    UnknownScheme(String),
    /// `sqlite:///` was given without a path.
    #[error("sqlite connection string has an empty path")]
    EmptySqlitePath,
    /// The port is not an unsigned 16-bit integer.
    #[error("invalid port in mysql connection string: {0:?}")]
    InvalidPort(String),
}

/// Server coordinates for a MySQL-backed RCDB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MySqlConnectionInfo {
    /// Account name, empty if omitted.
    pub user: String,
    /// Account password, empty if omitted.
    pub password: String,
    /// Server host name.
    pub host: String,
    /// Server port, `None` to use the server default.
    pub port: Option<u16>,
    /// Database name, empty if omitted.
    pub database: String,
}

impl MySqlConnectionInfo {
    fn parse(rest: &str) -> Result<Self, ConnectionStringError> {
        let mut info = Self::default();
        // the password may itself contain '@', the host never does
        let rest = match rest.rsplit_once('@') {
            Some((credentials, rest)) => {
                match credentials.split_once(':') {
                    Some((user, password)) => {
                        info.user = user.to_string();
                        info.password = password.to_string();
                    }
                    None => info.user = credentials.to_string(),
                }
                rest
            }
            None => rest,
        };
        let rest = match rest.split_once('/') {
            Some((rest, database)) => {
                info.database = database.to_string();
                rest
            }
            None => rest,
        };
        match rest.split_once(':') {
            Some((host, port)) => {
                info.host = host.to_string();
                info.port = Some(
                    port.parse()
                        .map_err(|_| ConnectionStringError::InvalidPort(port.to_string()))?,
                );
            }
            None => info.host = rest.to_string(),
        }
        Ok(info)
    }
}

/// A parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionParams {
    /// SQLite database file.
    Sqlite {
        /// File path.
        path: PathBuf,
    },
    /// MySQL server.
    MySql(MySqlConnectionInfo),
}

impl ConnectionParams {
    /// Points at an SQLite file.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::Sqlite { path: path.into() }
    }
}

impl FromStr for ConnectionParams {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix(SQLITE_PREFIX) {
            if path.is_empty() {
                return Err(ConnectionStringError::EmptySqlitePath);
            }
            return Ok(Self::sqlite(path));
        }
        if let Some(rest) = s.strip_prefix(MYSQL_PREFIX) {
            return Ok(Self::MySql(MySqlConnectionInfo::parse(rest)?));
        }
        Err(ConnectionStringError::UnknownScheme(s.to_string()))
    }
}

/// Renders the connection string with any password left out.
impl Display for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite { path } => write!(f, "{SQLITE_PREFIX}{}", path.display()),
            Self::MySql(info) => {
                write!(f, "{MYSQL_PREFIX}")?;
                if !info.user.is_empty() {
                    write!(f, "{}@", info.user)?;
                }
                write!(f, "{}", info.host)?;
                if let Some(port) = info.port {
                    write!(f, ":{port}")?;
                }
                if !info.database.is_empty() {
                    write!(f, "/{}", info.database)?;
                }
                Ok(())
            }
        }
    }
}

//! Thread-safe entry point that owns a provider.

use parking_lot::Mutex;
use rcdb_config::ParseResult;
use rcdb_core::RunNumber;
use tracing::{debug, info};

use crate::{
    connection_string::ConnectionParams,
    data::Condition,
    models::RcdbFile,
    provider::{Backend, ConditionKey, ConditionProvider, SqliteProvider},
    registry::ConditionTypeRegistry,
    RCDBError, RCDBResult,
};

/// Environment variable read by [`Connection::from_env`].
pub const RCDB_CONNECTION_ENV: &str = "RCDB_CONNECTION";

/// Primary entry point for reading an RCDB database.
///
/// Every call locks the connection, so one `Connection` may be shared between
/// threads. Calls made while disconnected fail with [`RCDBError::NotConnected`].
pub struct Connection {
    params: ConnectionParams,
    provider: Mutex<Option<Box<dyn ConditionProvider>>>,
}

impl Connection {
    /// Creates a disconnected handle. Call [`Connection::connect`] before querying.
    pub fn new(params: ConnectionParams) -> Self {
        Self {
            params,
            provider: Mutex::new(None),
        }
    }

    /// Parses `connection_string` and connects.
    ///
    /// # Errors
    ///
    /// Fails if the string cannot be parsed or the connection cannot be made.
    pub fn open(connection_string: &str) -> RCDBResult<Self> {
        Self::open_params(connection_string.parse()?)
    }

    /// Connects using already parsed parameters.
    ///
    /// # Errors
    ///
    /// Fails if the connection cannot be made.
    pub fn open_params(params: ConnectionParams) -> RCDBResult<Self> {
        let connection = Self::new(params);
        connection.connect()?;
        Ok(connection)
    }

    /// Connects using the connection string in `RCDB_CONNECTION`.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::MissingEnvironment`] if the variable is unset, and
    /// otherwise fails as [`Connection::open`] does.
    pub fn from_env() -> RCDBResult<Self> {
        let connection_string = std::env::var(RCDB_CONNECTION_ENV)
            .map_err(|_| RCDBError::MissingEnvironment(RCDB_CONNECTION_ENV))?;
        Self::open(&connection_string)
    }

    /// Wraps a provider that is already connected.
    pub fn from_provider(params: ConnectionParams, provider: Box<dyn ConditionProvider>) -> Self {
        Self {
            params,
            provider: Mutex::new(Some(provider)),
        }
    }

    /// Parameters this connection was created with.
    pub fn connection_params(&self) -> &ConnectionParams {
        &self.params
    }

    /// (Re)connects, replacing any existing provider. If connecting fails the
    /// connection is left closed.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::UnsupportedBackend`] for MySQL locators, and otherwise
    /// whatever opening the backend fails with.
    pub fn connect(&self) -> RCDBResult<()> {
        let mut guard = self.provider.lock();
        *guard = None;
        let provider = connect_provider(&self.params)?;
        info!(
            connection = %self.params,
            condition_types = provider.condition_types().len(),
            "connected to RCDB"
        );
        *guard = Some(provider);
        Ok(())
    }

    /// Returns `true` while a provider is attached.
    pub fn is_connected(&self) -> bool {
        self.provider.lock().is_some()
    }

    /// Drops the provider. Closing twice is a no-op.
    pub fn close(&self) {
        if self.provider.lock().take().is_some() {
            debug!(connection = %self.params, "closed RCDB connection");
        }
    }

    /// Backend of the attached provider.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::NotConnected`] if the connection is closed.
    pub fn backend(&self) -> RCDBResult<Backend> {
        self.with_provider(|provider| Ok(provider.backend()))
    }

    /// Snapshot of the loaded condition types.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::NotConnected`] if the connection is closed.
    pub fn condition_types(&self) -> RCDBResult<ConditionTypeRegistry> {
        self.with_provider(|provider| Ok(provider.condition_types().clone()))
    }

    /// Re-reads the condition types from the database.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::NotConnected`] if the connection is closed, or the
    /// error raised while loading.
    pub fn reload_condition_types(&self) -> RCDBResult<()> {
        let mut guard = self.provider.lock();
        let provider = guard.as_deref_mut().ok_or(RCDBError::NotConnected)?;
        provider.reload_condition_types()
    }

    /// Fetches one condition by name or by [`crate::ConditionType`]. `Ok(None)`
    /// means the run has no value for it.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::NotConnected`] if the connection is closed,
    /// [`RCDBError::ConditionTypeNotFound`] for unknown names, and query or
    /// decoding errors from the provider.
    pub fn get_condition<K>(&self, run_number: RunNumber, key: &K) -> RCDBResult<Option<Condition>>
    where
        K: ConditionKey + ?Sized,
    {
        self.with_provider(|provider| {
            let condition_type = key.resolve_in(provider.condition_types())?;
            provider.get_condition(run_number, condition_type)
        })
    }

    /// Fetches the newest file archived under `path` for `run_number`.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::NotConnected`] if the connection is closed, or the
    /// query error.
    pub fn get_file(&self, run_number: RunNumber, path: &str) -> RCDBResult<Option<RcdbFile>> {
        self.with_provider(|provider| provider.get_file(run_number, path))
    }

    /// Lists the files attached to `run_number`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::NotConnected`] if the connection is closed, or the
    /// query error.
    pub fn get_file_names(&self, run_number: RunNumber) -> RCDBResult<Vec<String>> {
        self.with_provider(|provider| provider.get_file_names(run_number))
    }

    /// Fetches a configuration file and splits it into keyword sections.
    ///
    /// # Errors
    ///
    /// Fails as [`Connection::get_file`] does.
    pub fn get_config_sections<N: AsRef<str>>(
        &self,
        run_number: RunNumber,
        path: &str,
        section_names: &[N],
    ) -> RCDBResult<Option<ParseResult>> {
        Ok(self
            .get_file(run_number, path)?
            .map(|file| file.parse_sections(section_names)))
    }

    /// Fetches a configuration file and splits it into slot sections.
    ///
    /// # Errors
    ///
    /// Fails as [`Connection::get_file`] does, or with
    /// [`RCDBError::ConfigParseError`] if a slot header is malformed.
    pub fn get_config_slots(
        &self,
        run_number: RunNumber,
        path: &str,
        slot_prefix: &str,
    ) -> RCDBResult<Option<ParseResult>> {
        self.get_file(run_number, path)?
            .map(|file| file.parse_slot_sections(slot_prefix))
            .transpose()
            .map_err(RCDBError::from)
    }

    fn with_provider<T>(
        &self,
        f: impl FnOnce(&dyn ConditionProvider) -> RCDBResult<T>,
    ) -> RCDBResult<T> {
        let guard = self.provider.lock();
        let provider = guard.as_deref().ok_or(RCDBError::NotConnected)?;
        f(provider)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("params", &self.params.to_string())
            .finish_non_exhaustive()
    }
}

fn connect_provider(params: &ConnectionParams) -> RCDBResult<Box<dyn ConditionProvider>> {
    match params {
        ConnectionParams::Sqlite { path } => Ok(Box::new(SqliteProvider::open(path)?)),
        ConnectionParams::MySql(_) => Err(RCDBError::UnsupportedBackend(Backend::MySql)),
    }
}

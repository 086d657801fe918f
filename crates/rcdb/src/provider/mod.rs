//! Storage backends behind a [`crate::Connection`].

mod sqlite;

pub use sqlite::SqliteProvider;

use rcdb_core::RunNumber;
use strum::Display;

use crate::{
    data::Condition,
    models::{ConditionType, RcdbFile},
    registry::ConditionTypeRegistry,
    RCDBResult,
};

/// Kind of database a provider talks to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    /// SQLite file.
    Sqlite,
    /// MySQL server.
    MySql,
}

/// Read access to one RCDB database.
///
/// A provider loads the condition type registry when it is created and answers
/// queries against it. Absence of a value is `Ok(None)`, never an error.
pub trait ConditionProvider: Send {
    /// Backend this provider is attached to.
    fn backend(&self) -> Backend;

    /// Condition types loaded at construction or by the last reload.
    fn condition_types(&self) -> &ConditionTypeRegistry;

    /// Re-reads the condition type registry. On failure the previous registry is kept.
    ///
    /// # Errors
    ///
    /// Fails if the query fails or a row carries an unknown type identifier.
    fn reload_condition_types(&mut self) -> RCDBResult<()>;

    /// Fetches the value of `condition_type` for `run_number`.
    ///
    /// # Errors
    ///
    /// Fails on query errors or if the stored value cannot be decoded.
    fn get_condition(
        &self,
        run_number: RunNumber,
        condition_type: &ConditionType,
    ) -> RCDBResult<Option<Condition>>;

    /// Fetches a condition by type name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RCDBError::ConditionTypeNotFound`] for unknown names, and
    /// otherwise fails as [`ConditionProvider::get_condition`] does.
    fn get_condition_by_name(
        &self,
        run_number: RunNumber,
        name: &str,
    ) -> RCDBResult<Option<Condition>> {
        let condition_type = self.condition_types().resolve(name)?;
        self.get_condition(run_number, condition_type)
    }

    /// Fetches the newest file archived under `path` for `run_number`.
    ///
    /// # Errors
    ///
    /// Fails on query errors.
    fn get_file(&self, run_number: RunNumber, path: &str) -> RCDBResult<Option<RcdbFile>>;

    /// Lists the paths of every file attached to `run_number`, newest first.
    ///
    /// # Errors
    ///
    /// Fails on query errors.
    fn get_file_names(&self, run_number: RunNumber) -> RCDBResult<Vec<String>>;
}

/// Anything that can name a condition type: a name or the type itself.
pub trait ConditionKey {
    /// Finds the condition type this key refers to.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RCDBError::ConditionTypeNotFound`] for unknown names.
    fn resolve_in<'a>(&'a self, registry: &'a ConditionTypeRegistry)
        -> RCDBResult<&'a ConditionType>;
}

impl ConditionKey for str {
    fn resolve_in<'a>(
        &'a self,
        registry: &'a ConditionTypeRegistry,
    ) -> RCDBResult<&'a ConditionType> {
        registry.resolve(self)
    }
}

impl ConditionKey for String {
    fn resolve_in<'a>(
        &'a self,
        registry: &'a ConditionTypeRegistry,
    ) -> RCDBResult<&'a ConditionType> {
        registry.resolve(self)
    }
}

impl ConditionKey for ConditionType {
    fn resolve_in<'a>(
        &'a self,
        _registry: &'a ConditionTypeRegistry,
    ) -> RCDBResult<&'a ConditionType> {
        Ok(self)
    }
}

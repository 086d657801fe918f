use std::path::{Path, PathBuf};

use chrono::DateTime;
use rcdb_core::{parsers::parse_timestamp, Id, RunNumber};
use rusqlite::{params, types::Value as SqlValue, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, trace};

use crate::{
    data::{widen_exact, Condition, Value},
    models::{ConditionType, RcdbFile, ValueType},
    provider::{Backend, ConditionProvider},
    registry::ConditionTypeRegistry,
    RCDBError, RCDBResult,
};

const FILE_SELECT: &str = "SELECT files.id, files.path, files.sha256, files.content FROM files \
     INNER JOIN files_have_runs ON files.id = files_have_runs.files_id \
     WHERE files_have_runs.run_number = ?1 AND files.path = ?2 \
     ORDER BY files.id DESC LIMIT 1";

const FILE_NAMES_SELECT: &str = "SELECT files.path FROM files \
     INNER JOIN files_have_runs ON files.id = files_have_runs.files_id \
     WHERE files_have_runs.run_number = ?1 \
     ORDER BY files.id DESC";

/// Provider backed by a read-only RCDB SQLite file.
pub struct SqliteProvider {
    connection: Connection,
    path: PathBuf,
    condition_types: ConditionTypeRegistry,
}

impl SqliteProvider {
    /// Opens `path` read-only, checks the schema version and loads the condition
    /// type registry.
    ///
    /// # Errors
    ///
    /// Returns [`RCDBError::ConnectionFailed`] if the file cannot be opened,
    /// [`RCDBError::MissingSchemaVersion`] for foreign or outdated files, and
    /// [`RCDBError::UnknownValueType`] if a condition type cannot be decoded.
    pub fn open(path: impl AsRef<Path>) -> RCDBResult<Self> {
        let path = path.as_ref().to_path_buf();
        let connection = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| RCDBError::ConnectionFailed {
            location: path.display().to_string(),
            source,
        })?;
        ensure_schema_version(&connection)?;
        let condition_types = load_condition_types(&connection)?;
        debug!(
            path = %path.display(),
            condition_types = condition_types.len(),
            "opened sqlite provider"
        );
        Ok(Self {
            connection,
            path,
            condition_types,
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConditionProvider for SqliteProvider {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn condition_types(&self) -> &ConditionTypeRegistry {
        &self.condition_types
    }

    fn reload_condition_types(&mut self) -> RCDBResult<()> {
        self.condition_types = load_condition_types(&self.connection)?;
        debug!(
            condition_types = self.condition_types.len(),
            "reloaded condition types"
        );
        Ok(())
    }

    fn get_condition(
        &self,
        run_number: RunNumber,
        condition_type: &ConditionType,
    ) -> RCDBResult<Option<Condition>> {
        let sql = format!(
            "SELECT id, {} FROM conditions WHERE run_number = ?1 AND condition_type_id = ?2 \
             ORDER BY id DESC LIMIT 1",
            condition_type.value_type().column_name()
        );
        let mut stmt = self.connection.prepare_cached(&sql)?;
        let row = stmt
            .query_row(params![run_number, condition_type.id()], |row| {
                Ok((row.get::<_, Id>(0)?, row.get::<_, SqlValue>(1)?))
            })
            .optional()?;
        let Some((id, raw)) = row else {
            trace!(
                run_number,
                condition = condition_type.name(),
                "no condition row"
            );
            return Ok(None);
        };
        let Some(value) = decode_value(raw, condition_type, run_number)? else {
            trace!(
                run_number,
                condition = condition_type.name(),
                "condition value is NULL"
            );
            return Ok(None);
        };
        Ok(Some(Condition::new(
            id,
            run_number,
            condition_type.clone(),
            value,
        )?))
    }

    fn get_file(&self, run_number: RunNumber, path: &str) -> RCDBResult<Option<RcdbFile>> {
        let mut stmt = self.connection.prepare_cached(FILE_SELECT)?;
        let file = stmt
            .query_row(params![run_number, path], |row| {
                Ok(RcdbFile {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    sha256: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    content: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })
            .optional()?;
        Ok(file)
    }

    fn get_file_names(&self, run_number: RunNumber) -> RCDBResult<Vec<String>> {
        let mut stmt = self.connection.prepare_cached(FILE_NAMES_SELECT)?;
        let names = stmt
            .query_map(params![run_number], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

fn ensure_schema_version(connection: &Connection) -> RCDBResult<()> {
    let mut stmt = connection.prepare("SELECT 1 FROM schema_versions WHERE version = 2 LIMIT 1")?;
    if stmt.exists([])? {
        Ok(())
    } else {
        Err(RCDBError::MissingSchemaVersion)
    }
}

fn load_condition_types(connection: &Connection) -> RCDBResult<ConditionTypeRegistry> {
    let mut stmt =
        connection.prepare("SELECT id, name, value_type, created, description FROM condition_types")?;
    let mut rows = stmt.query([])?;
    let mut loaded = Vec::new();
    while let Some(row) = rows.next()? {
        let id: Id = row.get(0)?;
        let name: String = row.get(1)?;
        let value_type_name: String = row.get(2)?;
        let value_type = ValueType::from_identifier(&value_type_name)
            .ok_or(RCDBError::UnknownValueType(value_type_name))?;
        let created: Option<String> = row.get(3)?;
        let description: Option<String> = row.get(4)?;
        loaded.push(ConditionType {
            id,
            name,
            value_type,
            created: created.unwrap_or_default(),
            description: description.unwrap_or_default(),
        });
    }
    Ok(ConditionTypeRegistry::new(loaded))
}

/// Maps the raw column onto a [`Value`]. `NULL` means the value is absent.
fn decode_value(
    raw: SqlValue,
    condition_type: &ConditionType,
    run_number: RunNumber,
) -> RCDBResult<Option<Value>> {
    let value_type = condition_type.value_type();
    let unexpected = |found: String| RCDBError::UnexpectedStorage {
        condition_name: condition_type.name().to_string(),
        run_number,
        value_type,
        found,
    };
    let value = match (value_type, raw) {
        (_, SqlValue::Null) => return Ok(None),
        (ValueType::Bool, SqlValue::Integer(v)) => Value::Bool(v != 0),
        (ValueType::Int, SqlValue::Integer(v)) => Value::Int(v),
        (ValueType::Float, SqlValue::Real(v)) => Value::Float(v),
        // whole numbers may come back as INTEGER without REAL affinity
        (ValueType::Float, SqlValue::Integer(v)) => Value::Float(
            widen_exact(v).ok_or_else(|| unexpected(format!("integer {v} with no exact float")))?,
        ),
        (ValueType::Time, SqlValue::Text(text)) => Value::Time(parse_timestamp(&text)?),
        (ValueType::Time, SqlValue::Integer(seconds)) => Value::Time(
            DateTime::from_timestamp(seconds, 0)
                .ok_or_else(|| unexpected(format!("unix time {seconds} out of range")))?,
        ),
        (value_type, SqlValue::Text(text)) => {
            Value::text(value_type, text).ok_or_else(|| unexpected("text".to_string()))?
        }
        (value_type, SqlValue::Blob(bytes)) if value_type.is_textual() => {
            let text =
                String::from_utf8(bytes).map_err(|_| unexpected("non-UTF-8 blob".to_string()))?;
            return decode_value(SqlValue::Text(text), condition_type, run_number);
        }
        (_, other) => return Err(unexpected(other.data_type().to_string().to_lowercase())),
    };
    Ok(Some(value))
}

//! Decoded condition values and their typed accessors.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rcdb_core::{parsers::format_timestamp, Id, RunNumber};
use thiserror::Error;

use crate::{models::ConditionType, models::ValueType, RCDBResult};

/// Raised when a value is read through an accessor its kind does not support.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot read a {actual} value as {requested}")]
pub struct ValueKindMismatchError {
    /// Name of the requested representation.
    pub requested: &'static str,
    /// Kind of the stored value.
    pub actual: ValueType,
}

/// A single decoded condition value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Double precision float.
    Float(f64),
    /// Plain text.
    String(String),
    /// JSON document kept as text.
    Json(String),
    /// Opaque text payload.
    Blob(String),
    /// UTC timestamp.
    Time(DateTime<Utc>),
}

impl Value {
    /// Kind of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Json(_) => ValueType::Json,
            Self::Blob(_) => ValueType::Blob,
            Self::Time(_) => ValueType::Time,
        }
    }

    /// Wraps text in the variant matching a textual `value_type`. Returns `None` for
    /// non-textual kinds.
    pub fn text(value_type: ValueType, text: String) -> Option<Self> {
        match value_type {
            ValueType::String => Some(Self::String(text)),
            ValueType::Json => Some(Self::Json(text)),
            ValueType::Blob => Some(Self::Blob(text)),
            _ => None,
        }
    }

    fn mismatch(&self, requested: &'static str) -> ValueKindMismatchError {
        ValueKindMismatchError {
            requested,
            actual: self.value_type(),
        }
    }

    /// Reads an `int` value.
    ///
    /// # Errors
    ///
    /// Fails for every other kind.
    pub fn as_int(&self) -> Result<i64, ValueKindMismatchError> {
        match self {
            Self::Int(v) => Ok(*v),
            _ => Err(self.mismatch("int")),
        }
    }

    /// Reads a `bool` value. `int` values are accepted as `value != 0`.
    ///
    /// # Errors
    ///
    /// Fails for every other kind.
    pub fn as_bool(&self) -> Result<bool, ValueKindMismatchError> {
        match self {
            Self::Bool(v) => Ok(*v),
            Self::Int(v) => Ok(*v != 0),
            _ => Err(self.mismatch("bool")),
        }
    }

    /// Reads a `float` value. `int` values are widened when the result is exact.
    ///
    /// # Errors
    ///
    /// Fails for an `int` with no exact `f64` representation and for every other kind.
    pub fn as_float(&self) -> Result<f64, ValueKindMismatchError> {
        match self {
            Self::Float(v) => Ok(*v),
            Self::Int(v) => widen_exact(*v).ok_or_else(|| self.mismatch("exact float")),
            _ => Err(self.mismatch("float")),
        }
    }

    /// Borrows the text of a `string`, `json` or `blob` value.
    ///
    /// # Errors
    ///
    /// Fails for every other kind.
    pub fn as_str(&self) -> Result<&str, ValueKindMismatchError> {
        match self {
            Self::String(v) | Self::Json(v) | Self::Blob(v) => Ok(v),
            _ => Err(self.mismatch("string")),
        }
    }

    /// Reads a `time` value.
    ///
    /// # Errors
    ///
    /// Fails for every other kind.
    pub fn as_time(&self) -> Result<DateTime<Utc>, ValueKindMismatchError> {
        match self {
            Self::Time(v) => Ok(*v),
            _ => Err(self.mismatch("time")),
        }
    }

    /// Parses a `json` value into a document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RCDBError::ValueKindMismatch`] for other kinds and
    /// [`crate::RCDBError::JsonError`] if the text is not valid JSON.
    pub fn as_json(&self) -> RCDBResult<serde_json::Value> {
        match self {
            Self::Json(text) => Ok(serde_json::from_str(text)?),
            _ => Err(self.mismatch("json").into()),
        }
    }
}

/// Converts `value` to `f64` only if the conversion does not round.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub(crate) fn widen_exact(value: i64) -> Option<f64> {
    let widened = value as f64;
    // i64::MAX rounds up to 2^63, which saturates back to i64::MAX
    (widened < 9_223_372_036_854_775_808.0 && widened as i64 == value).then_some(widened)
}

/// Renders the value the way RCDB stores it as text.
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", u8::from(*v)),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) | Self::Json(v) | Self::Blob(v) => write!(f, "{v}"),
            Self::Time(v) => write!(f, "{}", format_timestamp(v)),
        }
    }
}

/// The value of one condition type for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    id: Id,
    run_number: RunNumber,
    condition_type: ConditionType,
    value: Value,
}

impl Condition {
    /// Pairs a value with its condition type.
    ///
    /// # Errors
    ///
    /// Fails if the value's kind differs from the type's declared kind.
    pub fn new(
        id: Id,
        run_number: RunNumber,
        condition_type: ConditionType,
        value: Value,
    ) -> Result<Self, ValueKindMismatchError> {
        if value.value_type() != condition_type.value_type() {
            return Err(ValueKindMismatchError {
                requested: condition_type.value_type().identifier(),
                actual: value.value_type(),
            });
        }
        Ok(Self {
            id,
            run_number,
            condition_type,
            value,
        })
    }

    /// Database identifier of the row.
    pub fn id(&self) -> Id {
        self.id
    }
    /// Run the value belongs to.
    pub fn run_number(&self) -> RunNumber {
        self.run_number
    }
    /// Type this value was stored under.
    pub fn condition_type(&self) -> &ConditionType {
        &self.condition_type
    }
    /// Shorthand for the condition type's name.
    pub fn name(&self) -> &str {
        self.condition_type.name()
    }
    /// Kind of the stored value.
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }
    /// Decoded value.
    pub fn value(&self) -> &Value {
        &self.value
    }
    /// Consumes the condition and returns the value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// See [`Value::as_int`].
    ///
    /// # Errors
    ///
    /// Fails unless the value is an `int`.
    pub fn as_int(&self) -> Result<i64, ValueKindMismatchError> {
        self.value.as_int()
    }
    /// See [`Value::as_bool`].
    ///
    /// # Errors
    ///
    /// Fails unless the value is a `bool` or `int`.
    pub fn as_bool(&self) -> Result<bool, ValueKindMismatchError> {
        self.value.as_bool()
    }
    /// See [`Value::as_float`].
    ///
    /// # Errors
    ///
    /// Fails unless the value is a `float` or `int`.
    pub fn as_float(&self) -> Result<f64, ValueKindMismatchError> {
        self.value.as_float()
    }
    /// See [`Value::as_str`].
    ///
    /// # Errors
    ///
    /// Fails unless the value is textual.
    pub fn as_str(&self) -> Result<&str, ValueKindMismatchError> {
        self.value.as_str()
    }
    /// See [`Value::as_time`].
    ///
    /// # Errors
    ///
    /// Fails unless the value is a `time`.
    pub fn as_time(&self) -> Result<DateTime<Utc>, ValueKindMismatchError> {
        self.value.as_time()
    }
    /// See [`Value::as_json`].
    ///
    /// # Errors
    ///
    /// Fails unless the value is a well-formed `json` document.
    pub fn as_json(&self) -> RCDBResult<serde_json::Value> {
        self.value.as_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn int_widens_to_bool_and_float() {
        let value = Value::Int(5);
        assert_eq!(value.as_int(), Ok(5));
        assert_eq!(value.as_bool(), Ok(true));
        assert_eq!(Value::Int(0).as_bool(), Ok(false));
        assert_eq!(value.as_float(), Ok(5.0));
        assert_eq!(
            value.as_str(),
            Err(ValueKindMismatchError {
                requested: "string",
                actual: ValueType::Int
            })
        );
    }

    #[test]
    fn int_widens_to_float_only_when_exact() {
        let limit = 1_i64 << 53;
        assert_eq!(Value::Int(limit).as_float(), Ok(9_007_199_254_740_992.0));
        assert_eq!(Value::Int(-limit).as_float(), Ok(-9_007_199_254_740_992.0));
        assert_eq!(
            Value::Int(limit + 1).as_float(),
            Err(ValueKindMismatchError {
                requested: "exact float",
                actual: ValueType::Int
            })
        );
        assert_eq!(Value::Int(1_i64 << 60).as_float(), Ok(2f64.powi(60)));
        assert!(Value::Int(i64::MAX).as_float().is_err());
        assert_eq!(Value::Int(i64::MIN).as_float(), Ok(-(2f64.powi(63))));
    }

    #[test]
    fn narrowing_is_rejected() {
        assert!(Value::Float(1.5).as_int().is_err());
        assert!(Value::Bool(true).as_int().is_err());
        assert!(Value::Float(0.0).as_bool().is_err());
        assert!(Value::String("1".into()).as_int().is_err());
    }

    #[test]
    fn textual_kinds_read_as_str() {
        for value_type in [ValueType::String, ValueType::Json, ValueType::Blob] {
            let value = Value::text(value_type, "text".to_string()).expect("textual kind");
            assert_eq!(value.value_type(), value_type);
            assert_eq!(value.as_str(), Ok("text"));
        }
        assert_eq!(Value::text(ValueType::Int, "1".to_string()), None);
        assert_eq!(Value::String(String::new()).as_str(), Ok(""));
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
    }

    #[test]
    fn json_documents_parse() {
        let value = Value::Json(r#"{"a": [1, 2]}"#.to_string());
        let doc = value.as_json().expect("valid json");
        assert_eq!(doc["a"][1], 2);
        assert!(Value::Json("{".to_string()).as_json().is_err());
        assert!(Value::String("{}".to_string()).as_json().is_err());
    }

    #[test]
    fn time_reads_only_as_time() {
        let stamp = Utc.with_ymd_and_hms(2016, 2, 10, 8, 0, 0).unwrap();
        let value = Value::Time(stamp);
        assert_eq!(value.as_time(), Ok(stamp));
        assert!(value.as_str().is_err());
        assert_eq!(value.to_string(), "2016-02-10 08:00:00");
    }

    #[test]
    fn condition_rejects_mismatched_value() {
        let int_type = ConditionType::new(1, "event_count", ValueType::Int);
        assert!(Condition::new(1, 2, int_type.clone(), Value::Float(1.0)).is_err());
        let condition = Condition::new(1, 2, int_type, Value::Int(9)).expect("matching kind");
        assert_eq!(condition.name(), "event_count");
        assert_eq!(condition.as_int(), Ok(9));
    }
}

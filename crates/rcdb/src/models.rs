//! Condition type and archived file records.

use rcdb_config::{ConfigParseError, ParseResult};
use rcdb_core::Id;
use strum::{Display, EnumString, IntoStaticStr};

/// Storage kind of a condition, as named in the `condition_types.value_type` column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    /// `bool`, stored in `bool_value`.
    Bool,
    /// `json`, text stored in `text_value`.
    Json,
    /// `string`, stored in `text_value`.
    String,
    /// `float`, stored in `float_value`.
    Float,
    /// `int`, stored in `int_value`.
    Int,
    /// `time`, stored in `time_value`.
    Time,
    /// `blob`, text stored in `text_value`.
    Blob,
}

impl ValueType {
    /// Maps an RCDB type identifier onto a [`ValueType`]. Matching is exact and
    /// case-sensitive.
    pub fn from_identifier(value: &str) -> Option<Self> {
        value.parse().ok()
    }

    /// Identifier used by the database for this type.
    pub fn identifier(&self) -> &'static str {
        self.into()
    }

    /// Column of the `conditions` table that holds values of this type.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool_value",
            Self::Float => "float_value",
            Self::Int => "int_value",
            Self::Time => "time_value",
            Self::String | Self::Json | Self::Blob => "text_value",
        }
    }

    /// Returns `true` for kinds held in the text column.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Json | Self::Blob)
    }
}

/// A named, typed kind of per-run value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionType {
    pub(crate) id: Id,
    pub(crate) name: String,
    pub(crate) value_type: ValueType,
    pub(crate) created: String,
    pub(crate) description: String,
}

impl ConditionType {
    /// Builds a condition type with empty creation time and description.
    pub fn new(id: Id, name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id,
            name: name.into(),
            value_type,
            created: String::new(),
            description: String::new(),
        }
    }

    /// Database identifier.
    pub fn id(&self) -> Id {
        self.id
    }
    /// Unique condition name.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Storage kind of the condition's values.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
    /// Raw creation timestamp, empty when unknown.
    pub fn created(&self) -> &str {
        &self.created
    }
    /// Free-form description, empty when unknown.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A text file archived in RCDB and attached to one or more runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcdbFile {
    pub(crate) id: Id,
    pub(crate) path: String,
    pub(crate) sha256: String,
    pub(crate) content: String,
}

impl RcdbFile {
    /// Builds a file record.
    pub fn new(
        id: Id,
        path: impl Into<String>,
        sha256: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            path: path.into(),
            sha256: sha256.into(),
            content: content.into(),
        }
    }

    /// Database identifier.
    pub fn id(&self) -> Id {
        self.id
    }
    /// Path the file had when it was archived.
    pub fn path(&self) -> &str {
        &self.path
    }
    /// Hex digest of the content.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
    /// Full text of the file.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Parses the content as a configuration file with keyword sections.
    pub fn parse_sections<N: AsRef<str>>(&self, section_names: &[N]) -> ParseResult {
        rcdb_config::parse_config(&self.content, section_names)
    }

    /// Parses the content as a configuration file with slot header sections.
    ///
    /// # Errors
    ///
    /// Fails if a slot header does not carry an integer slot number.
    pub fn parse_slot_sections(&self, slot_prefix: &str) -> Result<ParseResult, ConfigParseError> {
        rcdb_config::parse_config_with_slots(&self.content, slot_prefix)
    }
}

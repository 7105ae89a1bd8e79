//! Physical columns and their semantic types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a column; decides how filter text is coerced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    /// Offset-aware timestamp
    Timestamp,
    /// Local date-time
    Datetime,
    /// Local date
    Date,
    /// Enumeration; the position of a variant is its ordinal
    Enum { variants: Vec<String> },
}

impl ColumnType {
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnType::Enum {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Uuid => "uuid",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Datetime => "datetime",
            ColumnType::Date => "date",
            ColumnType::Enum { .. } => "enum",
        }
    }
}

/// A column of a mapped table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Column {
    table: String,
    name: String,
    column_type: ColumnType,
    identity: bool,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            column_type,
            identity: false,
        }
    }

    /// Marks the column as (part of) the table's identity
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// `table.column`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

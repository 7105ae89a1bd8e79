//! # Value Coercion
//!
//! Converts raw filter text into a typed value for the column it is compared
//! against.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::mapping::{Column, ColumnType};
use crate::query::PredicateOperator;

use super::errors::{CompileError, CompileResult};

/// A typed value bound into a compiled query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<FixedOffset>),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    /// Enumeration member with its position in the declared variants
    Enum { name: String, ordinal: usize },
}

/// Coerces `raw` to the semantic type of `column`.
///
/// `like` patterns stay text whatever the column type.
pub fn coerce(
    field: &str,
    column: &Column,
    operator: PredicateOperator,
    raw: &str,
) -> CompileResult<SqlValue> {
    if operator == PredicateOperator::Like {
        return Ok(SqlValue::Text(raw.to_string()));
    }

    let column_type = column.column_type();
    let fail = |reason: &str| CompileError::Coercion {
        field: field.to_string(),
        value: raw.to_string(),
        target: column_type.type_name().to_string(),
        reason: reason.to_string(),
    };

    match column_type {
        ColumnType::Text => Ok(SqlValue::Text(raw.to_string())),
        ColumnType::Integer => raw
            .parse()
            .map(SqlValue::Integer)
            .map_err(|_| fail("not an integer")),
        ColumnType::Float => raw
            .parse()
            .map(SqlValue::Float)
            .map_err(|_| fail("not a number")),
        ColumnType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(SqlValue::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(SqlValue::Boolean(false))
            } else {
                Err(fail("expected true or false"))
            }
        }
        ColumnType::Uuid => Uuid::parse_str(raw)
            .map(SqlValue::Uuid)
            .map_err(|_| fail("not a UUID")),
        ColumnType::Timestamp | ColumnType::Datetime | ColumnType::Date => coerce_temporal(raw)
            .ok_or_else(|| fail("expected an offset timestamp, local date-time or local date")),
        ColumnType::Enum { variants } => coerce_enum(variants, raw)
            .ok_or_else(|| fail(&format!("not one of [{}]", variants.join(", ")))),
    }
}

/// Offset-aware timestamp, then local date-time, then local date
fn coerce_temporal(raw: &str) -> Option<SqlValue> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(SqlValue::Timestamp(timestamp));
    }
    if let Ok(datetime) = raw.parse::<NaiveDateTime>() {
        return Some(SqlValue::DateTime(datetime));
    }
    raw.parse::<NaiveDate>().ok().map(SqlValue::Date)
}

/// Member name first; a numeric value is taken as an ordinal
fn coerce_enum(variants: &[String], raw: &str) -> Option<SqlValue> {
    let ordinal = match variants.iter().position(|v| v == raw) {
        Some(ordinal) => ordinal,
        None => raw.parse::<usize>().ok().filter(|&i| i < variants.len())?,
    };
    Some(SqlValue::Enum {
        name: variants[ordinal].clone(),
        ordinal,
    })
}

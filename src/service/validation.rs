//! Request validation: turns a JSON body into typed column values for one resource.

use crate::catalog::{Column, ColumnKind, Resource};
use crate::error::AppError;
use crate::sql::SqlValue;
use crate::time::ClockTime;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// How strictly columns must be present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Required columns must be present; the rest fall back to defaults or NULL.
    Create,
    /// Every mutable column must be present (full replace).
    Replace,
}

/// Validated body.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    pub values: Vec<(&'static str, SqlValue)>,
    /// Association member ids when the association field was supplied; duplicates collapsed.
    pub members: Option<BTreeSet<i32>>,
}

impl Payload {
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Keys that are not columns of the resource are ignored.
    pub fn validate(body: &Map<String, Value>, resource: &Resource, mode: Mode) -> Result<Payload, AppError> {
        let mut values = Vec::with_capacity(resource.columns.len());
        for c in resource.columns {
            match (body.get(c.name), mode) {
                (None, Mode::Replace) => {
                    return Err(AppError::Validation(format!(
                        "{} is required (PUT replaces every field)",
                        c.name
                    )))
                }
                (None, Mode::Create) if c.required => {
                    return Err(AppError::Validation(format!("{} is required", c.name)))
                }
                (None, Mode::Create) if c.has_default => {}
                (None, Mode::Create) => values.push((c.name, SqlValue::Null)),
                (Some(Value::Null), _) if c.nullable => values.push((c.name, SqlValue::Null)),
                (Some(Value::Null), _) => {
                    return Err(AppError::Validation(format!("{} must not be null", c.name)))
                }
                (Some(v), _) => values.push((c.name, coerce(c, v)?)),
            }
        }
        let payload = Payload {
            members: match &resource.association {
                Some(assoc) => body.get(assoc.field).map(|v| member_ids(assoc.field, v)).transpose()?,
                None => None,
            },
            values,
        };
        check_time_window(resource, &payload)?;
        Ok(payload)
    }
}

fn coerce(c: &Column, v: &Value) -> Result<SqlValue, AppError> {
    let invalid = |expected: &str| AppError::Validation(format!("{} must be {}", c.name, expected));
    match c.kind {
        ColumnKind::Text => match v {
            Value::String(s) => Ok(SqlValue::Text(s.clone())),
            Value::Number(n) => Ok(SqlValue::Text(n.to_string())),
            _ => Err(invalid("a string")),
        },
        ColumnKind::Int => v
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(SqlValue::Int)
            .ok_or_else(|| invalid("a 32-bit integer")),
        ColumnKind::Flag => match v {
            Value::Bool(b) => Ok(SqlValue::SmallInt(i16::from(*b))),
            Value::Number(n) if n.as_i64() == Some(0) || n.as_i64() == Some(1) => {
                Ok(SqlValue::SmallInt(n.as_i64().unwrap_or(0) as i16))
            }
            _ => Err(invalid("a boolean or 0/1")),
        },
        ColumnKind::Time => v
            .as_str()
            .and_then(|s| s.parse::<ClockTime>().ok())
            .map(|t| SqlValue::Time(t.as_naive()))
            .ok_or_else(|| invalid("a time as HH:MM (seconds, if given, must be 00)")),
    }
}

fn member_ids(field: &str, v: &Value) -> Result<BTreeSet<i32>, AppError> {
    let invalid = || AppError::Validation(format!("{} must be an array of integers", field));
    let items = v.as_array().ok_or_else(invalid)?;
    items
        .iter()
        .map(|item| item.as_i64().and_then(|n| i32::try_from(n).ok()).ok_or_else(invalid))
        .collect()
}

fn check_time_window(resource: &Resource, payload: &Payload) -> Result<(), AppError> {
    let Some((start_col, end_col)) = resource.time_window else {
        return Ok(());
    };
    if let (Some(SqlValue::Time(start)), Some(SqlValue::Time(end))) = (payload.get(start_col), payload.get(end_col)) {
        if start >= end {
            return Err(AppError::Validation(format!("{} must be before {}", start_col, end_col)));
        }
    }
    Ok(())
}

//! Static per-entity allow-lists for partial updates.
//!
//! Every updatable column is declared once as a [`Field`]. Incoming JSON keys
//! are matched against that list; matched values are coerced to the column's
//! kind, unmatched keys are dropped with a warning.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use sqlx::{types::Json, Postgres, QueryBuilder};
use tracing::warn;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text whose trimmed length is within `min..=max` characters.
    Text { min: usize, max: usize },
    /// Integer constrained to `min..=max`.
    Int { min: i64, max: i64 },
    /// Reference to another row's id.
    ForeignId,
    Bool,
    /// String to string map, stored as JSONB.
    StringMap,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i32),
    Id(i64),
    Bool(bool),
    StringMap(BTreeMap<String, String>),
}

impl FieldValue {
    pub fn coerce(field: &Field, value: &Value) -> AppResult<Self> {
        let bad = |expected: &str| {
            AppError::validation(format!("'{}' must be {expected}", field.name))
        };
        match field.kind {
            FieldKind::Text { min, max } => match value {
                Value::String(s) => {
                    let s = s.trim();
                    let len = s.chars().count();
                    if len < min || len > max {
                        return Err(AppError::validation(format!(
                            "'{}' must be {min}-{max} characters",
                            field.name
                        )));
                    }
                    Ok(FieldValue::Text(s.to_string()))
                }
                _ => Err(bad("a string")),
            },
            FieldKind::Int { min, max } => {
                let n = as_integer(value).ok_or_else(|| bad("an integer"))?;
                if n < min || n > max {
                    return Err(AppError::validation(format!(
                        "'{}' must be between {min} and {max}",
                        field.name
                    )));
                }
                i32::try_from(n).map(FieldValue::Int).map_err(|_| bad("an integer"))
            }
            FieldKind::ForeignId => match as_integer(value) {
                Some(n) if n > 0 => Ok(FieldValue::Id(n)),
                _ => Err(bad("a positive id")),
            },
            FieldKind::Bool => match value {
                Value::Bool(b) => Ok(FieldValue::Bool(*b)),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(FieldValue::Bool(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(FieldValue::Bool(false)),
                _ => Err(bad("a boolean")),
            },
            FieldKind::StringMap => match value {
                Value::Object(obj) => obj
                    .iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => Ok((k.clone(), s.clone())),
                        Value::Number(n) => Ok((k.clone(), n.to_string())),
                        Value::Bool(b) => Ok((k.clone(), b.to_string())),
                        _ => Err(bad("an object of scalar values")),
                    })
                    .collect::<AppResult<BTreeMap<_, _>>>()
                    .map(FieldValue::StringMap),
                _ => Err(bad("an object")),
            },
        }
    }

    fn push_bind(self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            FieldValue::Text(v) => qb.push_bind(v),
            FieldValue::Int(v) => qb.push_bind(v),
            FieldValue::Id(v) => qb.push_bind(v),
            FieldValue::Bool(v) => qb.push_bind(v),
            FieldValue::StringMap(v) => qb.push_bind(Json(v)),
        };
    }
}

/// Applies the bounds declared for `name` in `fields` to a create payload value.
pub fn check_int(fields: &[Field], name: &str, n: i64) -> AppResult<()> {
    match fields.iter().find(|f| f.name == name) {
        Some(field) if matches!(field.kind, FieldKind::Int { .. }) => {
            FieldValue::coerce(field, &Value::from(n)).map(|_| ())
        }
        _ => Ok(()),
    }
}

/// Applies the length bounds declared for `name` in `fields` to a create payload value.
pub fn check_text(fields: &[Field], name: &str, value: &str) -> AppResult<()> {
    match fields.iter().find(|f| f.name == name) {
        Some(field) if matches!(field.kind, FieldKind::Text { .. }) => {
            FieldValue::coerce(field, &Value::from(value)).map(|_| ())
        }
        _ => Ok(()),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validated column assignments for one row.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdatePlan {
    assignments: Vec<(&'static str, FieldValue)>,
}

impl UpdatePlan {
    /// Applies the allow-list to `payload`. An empty payload is rejected;
    /// unknown keys are logged and skipped; a known key with an unusable
    /// value rejects the whole update.
    pub fn build(entity: &str, allowed: &[Field], payload: &Map<String, Value>) -> AppResult<Self> {
        if payload.is_empty() {
            return Err(AppError::validation("request body must not be empty"));
        }
        let mut assignments = Vec::with_capacity(payload.len());
        for (key, value) in payload {
            match allowed.iter().find(|f| f.name == key.as_str()) {
                Some(field) => assignments.push((field.name, FieldValue::coerce(field, value)?)),
                None => warn!(entity, key = %key, "not an updatable attribute, ignoring"),
            }
        }
        Ok(Self { assignments })
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.assignments.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Splits off the assignments whose field is in `names`.
    pub fn take(&mut self, names: &[&str]) -> UpdatePlan {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.assignments)
            .into_iter()
            .partition(|(n, _)| names.contains(n));
        self.assignments = rest;
        UpdatePlan { assignments: taken }
    }

    /// `UPDATE {table} SET a = $1, b = $2 WHERE {id_column} = $3`
    pub fn into_query(self, table: &str, id_column: &str, id: i64) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("UPDATE {table} SET "));
        for (i, (column, value)) in self.assignments.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column).push(" = ");
            value.push_bind(&mut qb);
        }
        qb.push(format!(" WHERE {id_column} = ")).push_bind(id);
        qb
    }
}

//! JSON records ⇄ [`RecordSet`].
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"region":"A","value":1.5,"unit":"GWh"}, ...]`
//! - Newline-delimited JSON (NDJSON): one object per line
//!
//! Output is always an array of objects keyed by column name, in schema order. Chart and table
//! collaborators consume this shape.

use std::fs;
use std::path::Path;

use serde_json::{Map, Number};

use crate::error::{RecordError, RecordResult};
use crate::types::{DataType, RecordSet, Schema, Value};

/// Read a JSON record file into a [`RecordSet`].
pub fn records_from_json_path(path: impl AsRef<Path>, schema: &Schema) -> RecordResult<RecordSet> {
    let text = fs::read_to_string(path)?;
    records_from_json_str(&text, schema)
}

/// Parse JSON records from an in-memory string.
///
/// Every schema field must be present in every object; `null` becomes [`Value::Null`].
pub fn records_from_json_str(input: &str, schema: &Schema) -> RecordResult<RecordSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RecordError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => records_from_json_values(&items, schema),
            serde_json::Value::Object(_) => records_from_json_values(&[v], schema),
            _ => Err(RecordError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                RecordError::SchemaMismatch {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            values.push(v);
        }
        records_from_json_values(&values, schema)
    }
}

/// Convert already-parsed JSON objects into a [`RecordSet`].
pub fn records_from_json_values(values: &[serde_json::Value], schema: &Schema) -> RecordResult<RecordSet> {
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| RecordError::SchemaMismatch {
            message: format!("row {row_num} is not a json object"),
        })?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let jv = obj.get(&field.name).ok_or_else(|| RecordError::SchemaMismatch {
                message: format!("row {row_num} missing required field '{}'", field.name),
            })?;
            row.push(convert_json_value(row_num, &field.name, field.data_type, jv)?);
        }
        rows.push(row);
    }

    Ok(RecordSet::new(schema.clone(), rows))
}

/// Render a [`RecordSet`] as an array of JSON objects.
pub fn records_to_json(records: &RecordSet) -> serde_json::Value {
    let rows = records
        .rows
        .iter()
        .map(|row| {
            let obj: Map<String, serde_json::Value> = records
                .schema
                .field_names()
                .zip(row)
                .map(|(name, cell)| (name.to_string(), value_to_json(cell)))
                .collect();
            serde_json::Value::Object(obj)
        })
        .collect();
    serde_json::Value::Array(rows)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Int64(v) => serde_json::Value::from(*v),
        // non-finite floats have no JSON representation
        Value::Float64(v) => Number::from_f64(*v).map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::Utf8(s) => serde_json::Value::String(s.clone()),
        Value::List(items) | Value::Set(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Series(points) => serde_json::Value::Array(
            points
                .iter()
                .map(|p| Number::from_f64(*p).map_or(serde_json::Value::Null, serde_json::Value::Number))
                .collect(),
        ),
    }
}

fn parse_error(row: usize, column: &str, v: &serde_json::Value, message: &str) -> RecordError {
    RecordError::ParseError {
        row,
        column: column.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    }
}

fn convert_json_value(
    row: usize,
    column: &str,
    data_type: DataType,
    v: &serde_json::Value,
) -> RecordResult<Value> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Utf8 => v
            .as_str()
            .map(|s| Value::Utf8(s.to_string()))
            .ok_or_else(|| parse_error(row, column, v, "expected string")),
        DataType::Bool => v
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| parse_error(row, column, v, "expected bool")),
        DataType::Int64 => {
            if let Some(n) = v.as_i64() {
                Ok(Value::Int64(n))
            } else if let Some(n) = v.as_u64() {
                i64::try_from(n)
                    .map(Value::Int64)
                    .map_err(|_| parse_error(row, column, v, "u64 out of range for i64"))
            } else {
                Err(parse_error(row, column, v, "expected integer number"))
            }
        }
        DataType::Float64 => v
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| parse_error(row, column, v, "expected number")),
        DataType::List | DataType::Set => {
            let items = v
                .as_array()
                .ok_or_else(|| parse_error(row, column, v, "expected array"))?;
            let items = items
                .iter()
                .map(|item| scalar_from_json(item).ok_or_else(|| parse_error(row, column, item, "expected scalar element")))
                .collect::<RecordResult<Vec<Value>>>()?;
            Ok(if data_type == DataType::Set {
                Value::set_from(items)
            } else {
                Value::List(items)
            })
        }
        DataType::Series => {
            let items = v
                .as_array()
                .ok_or_else(|| parse_error(row, column, v, "expected array of numbers"))?;
            items
                .iter()
                .map(|item| item.as_f64().ok_or_else(|| parse_error(row, column, item, "expected number")))
                .collect::<RecordResult<Vec<f64>>>()
                .map(Value::Series)
        }
    }
}

fn scalar_from_json(v: &serde_json::Value) -> Option<Value> {
    match v {
        serde_json::Value::Null => Some(Value::Null),
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::String(s) => Some(Value::Utf8(s.clone())),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int64)
            .or_else(|| n.as_f64().map(Value::Float64)),
        _ => None,
    }
}

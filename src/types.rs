//! Core data model for scenario result tables.
//!
//! A [`RecordSet`] is an ordered, rectangular collection of rows described by a [`Schema`] (a list
//! of typed [`Field`]s). Scalar result rows carry a `value` and a `unit`; timeseries rows carry a
//! `series` and a `unit`.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RecordResult};

/// Name of the scalar measurement column.
pub const VALUE_COLUMN: &str = "value";
/// Name of the embedded timeseries column.
pub const SERIES_COLUMN: &str = "series";
/// Name of the unit column that qualifies `value` and `series`.
pub const UNIT_COLUMN: &str = "unit";

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Ordered multi-valued column (e.g. tag lists).
    List,
    /// Order-independent multi-valued column.
    Set,
    /// Embedded ordered sequence of floats (timeseries).
    Series,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of a [`RecordSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed cell in a [`RecordSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Sorted, deduplicated values. Build with [`Value::set_from`].
    Set(Vec<Value>),
    /// Timeseries.
    Series(Vec<f64>),
}

impl Value {
    /// Build a [`Value::Set`] from arbitrary values, sorting and deduplicating them.
    pub fn set_from(values: impl IntoIterator<Item = Value>) -> Self {
        let mut items: Vec<Value> = values.into_iter().collect();
        items.sort_by(Value::total_cmp);
        items.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
        Value::Set(items)
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of scalar numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// String view of [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Total order used for sorting and for set normalization.
    ///
    /// Numbers compare numerically across `Int64`/`Float64`, strings lexicographically, and
    /// `Null` sorts after everything else. Values of different kinds compare by kind.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Int64(_) | Value::Float64(_), Value::Int64(_) | Value::Float64(_)) => {
                // both sides are numeric here
                let a = self.as_f64().unwrap_or(f64::NAN);
                let b = other.as_f64().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            }
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Utf8(a), Value::Utf8(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) | (Value::Set(a), Value::Set(b)) => cmp_slices(a, b),
            (Value::Series(a), Value::Series(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.total_cmp(y) {
                        Ordering::Equal => {}
                        non_eq => return non_eq,
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int64(_) | Value::Float64(_) => 1,
            Value::Utf8(_) => 2,
            Value::List(_) => 3,
            Value::Set(_) => 4,
            Value::Series(_) => 5,
            Value::Null => 6,
        }
    }
}

fn cmp_slices(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => {}
            non_eq => return non_eq,
        }
    }
    a.len().cmp(&b.len())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
            Value::List(items) | Value::Set(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Series(points) => write!(f, "<series len={}>", points.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

/// In-memory tabular record set.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields, and in the
/// order the query returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl RecordSet {
    /// Create a record set from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Create a record set with no rows.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Number of rows in the record set.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.index_of(name)
    }

    /// Index of a column by name, or [`RecordError::MissingColumn`].
    pub fn require_column(&self, name: &str) -> RecordResult<usize> {
        self.column_index(name).ok_or_else(|| RecordError::MissingColumn {
            column: name.to_string(),
        })
    }

    /// Cell lookup by row number and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Iterate the values of one column in row order.
    pub fn column_values<'a>(
        &'a self,
        name: &str,
    ) -> RecordResult<impl Iterator<Item = &'a Value> + use<'a>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().filter_map(move |row| row.get(idx)))
    }

    /// Checks that a `unit` column accompanies `value`/`series` columns.
    pub fn check_unit_column(&self) -> RecordResult<()> {
        if self.column_index(UNIT_COLUMN).is_some() {
            return Ok(());
        }
        for column in [VALUE_COLUMN, SERIES_COLUMN] {
            if self.column_index(column).is_some() {
                return Err(RecordError::MissingUnitColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Checks that every row has exactly one cell per schema field.
    pub fn check_shape(&self) -> RecordResult<()> {
        let expected = self.schema.fields.len();
        match self.rows.iter().position(|row| row.len() != expected) {
            Some(idx) => Err(RecordError::SchemaMismatch {
                message: format!(
                    "row {} has {} cells, schema has {} fields",
                    idx + 1,
                    self.rows[idx].len(),
                    expected
                ),
            }),
            None => Ok(()),
        }
    }

    /// The single unit shared by every row, if there is exactly one.
    pub fn common_unit(&self) -> Option<&str> {
        let idx = self.column_index(UNIT_COLUMN)?;
        let units: BTreeSet<&str> = self
            .rows
            .iter()
            .filter_map(|row| row.get(idx).and_then(Value::as_str))
            .collect();
        if units.len() == 1 {
            units.into_iter().next()
        } else {
            None
        }
    }

    /// Create a new record set containing only rows that match `predicate`.
    ///
    /// The returned record set preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new record set by applying `mapper` to every row.
    ///
    /// The returned record set preserves the original schema.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema field count.
    pub fn map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Value>,
    {
        let expected_len = self.schema.fields.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();

        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}

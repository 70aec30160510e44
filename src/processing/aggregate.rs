//! Group-by aggregation of `value` and `series`.
//!
//! Rows are partitioned by the grouping columns plus the `unit` column, so quantities in different
//! units are never summed together. Within a group, `value` is summed and `series` is summed
//! element-wise; every other column is dropped because it has no single value per group.

use std::collections::HashMap;

use crate::error::AggregationError;
use crate::types::{
    DataType, Field, RecordSet, Schema, Value, SERIES_COLUMN, UNIT_COLUMN, VALUE_COLUMN,
};

/// Aggregate `records` by the `group_by` columns.
///
/// - An empty `group_by` returns the input unchanged.
/// - List-valued grouping columns are compared as sets (order and duplicates are ignored) and are
///   returned as [`Value::Set`].
/// - `value` sums ignore nulls; a group with only null values yields [`Value::Null`]. Integer
///   columns stay integer.
/// - Groups appear in order of their first row.
///
/// # Errors
///
/// - [`AggregationError::MissingColumn`] if a grouping column does not exist
/// - [`AggregationError::RaggedSeries`] if series in one group differ in length
/// - [`AggregationError::NonNumeric`] if a `value` or `series` cell cannot be summed
pub fn aggregate(records: &RecordSet, group_by: &[String]) -> Result<RecordSet, AggregationError> {
    if group_by.is_empty() {
        return Ok(records.clone());
    }

    let mut key_columns: Vec<usize> = Vec::with_capacity(group_by.len() + 1);
    for column in group_by {
        let idx = records
            .column_index(column)
            .ok_or_else(|| AggregationError::MissingColumn {
                column: column.clone(),
            })?;
        if !key_columns.contains(&idx) {
            key_columns.push(idx);
        }
    }
    if let Some(idx) = records.column_index(UNIT_COLUMN) {
        if !key_columns.contains(&idx) {
            key_columns.push(idx);
        }
    }
    let value_idx = records.column_index(VALUE_COLUMN);
    let series_idx = records.column_index(SERIES_COLUMN);

    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for (row_no, row) in records.rows.iter().enumerate() {
        let key_cells: Vec<Value> = key_columns.iter().map(|&i| normalize(cell(row, i))).collect();
        let key = GroupKey(key_cells.iter().map(KeyPart::from).collect());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Group::new(key_cells));
            groups.len() - 1
        });
        let group = &mut groups[slot];

        if let Some(idx) = value_idx {
            group.add_value(cell(row, idx), row_no)?;
        }
        if let Some(idx) = series_idx {
            group.add_series(cell(row, idx), row_no)?;
        }
    }

    // an overflowed integer sum turns the whole value column into floats
    let widen = value_idx.is_some_and(|i| records.schema.fields[i].data_type == DataType::Int64)
        && groups.iter().any(|g| matches!(g.sum, Sum::Float(_)));

    let keep: Vec<usize> = (0..records.schema.fields.len())
        .filter(|i| key_columns.contains(i) || Some(*i) == value_idx || Some(*i) == series_idx)
        .collect();
    let schema = Schema::new(
        keep.iter()
            .map(|&i| {
                let field = &records.schema.fields[i];
                match field.data_type {
                    DataType::List if key_columns.contains(&i) => Field::new(field.name.clone(), DataType::Set),
                    DataType::Int64 if widen && Some(i) == value_idx => {
                        Field::new(field.name.clone(), DataType::Float64)
                    }
                    _ => field.clone(),
                }
            })
            .collect(),
    );

    let rows = groups
        .into_iter()
        .map(|group| {
            let Group { key_cells, sum, series } = group;
            keep.iter()
                .map(|&i| {
                    if let Some(pos) = key_columns.iter().position(|&k| k == i) {
                        key_cells[pos].clone()
                    } else if Some(i) == value_idx {
                        sum.into_value(widen)
                    } else {
                        series.clone().map(Value::Series).unwrap_or(Value::Null)
                    }
                })
                .collect()
        })
        .collect();

    Ok(RecordSet::new(schema, rows))
}

/// Missing cells read as null.
fn cell(row: &[Value], idx: usize) -> &Value {
    row.get(idx).unwrap_or(&Value::Null)
}

/// Lists become order-independent sets so they can be grouped on.
fn normalize(cell: &Value) -> Value {
    match cell {
        Value::List(items) => Value::set_from(items.iter().cloned()),
        other => other.clone(),
    }
}

#[derive(Debug, Clone, Copy)]
enum Sum {
    Empty,
    Int(i64),
    Float(f64),
}

impl Sum {
    fn add(self, cell: &Value) -> Option<Self> {
        Some(match (self, cell) {
            (s, Value::Null) => s,
            (Sum::Empty, Value::Int64(v)) => Sum::Int(*v),
            (Sum::Int(a), Value::Int64(v)) => match a.checked_add(*v) {
                Some(total) => Sum::Int(total),
                None => Sum::Float(a as f64 + *v as f64),
            },
            (Sum::Float(a), Value::Int64(v)) => Sum::Float(a + *v as f64),
            (Sum::Empty, Value::Float64(v)) => Sum::Float(*v),
            (Sum::Int(a), Value::Float64(v)) => Sum::Float(a as f64 + v),
            (Sum::Float(a), Value::Float64(v)) => Sum::Float(a + v),
            _ => return None,
        })
    }

    fn into_value(self, as_float: bool) -> Value {
        match self {
            Sum::Empty => Value::Null,
            Sum::Int(v) if as_float => Value::Float64(v as f64),
            Sum::Int(v) => Value::Int64(v),
            Sum::Float(v) => Value::Float64(v),
        }
    }
}

struct Group {
    key_cells: Vec<Value>,
    sum: Sum,
    series: Option<Vec<f64>>,
}

impl Group {
    fn new(key_cells: Vec<Value>) -> Self {
        Self {
            key_cells,
            sum: Sum::Empty,
            series: None,
        }
    }

    fn add_value(&mut self, cell: &Value, row: usize) -> Result<(), AggregationError> {
        self.sum = self.sum.add(cell).ok_or_else(|| AggregationError::NonNumeric {
            column: VALUE_COLUMN.to_string(),
            row,
        })?;
        Ok(())
    }

    fn add_series(&mut self, cell: &Value, row: usize) -> Result<(), AggregationError> {
        let points = match cell {
            Value::Null => return Ok(()),
            Value::Series(points) => points,
            _ => {
                return Err(AggregationError::NonNumeric {
                    column: SERIES_COLUMN.to_string(),
                    row,
                })
            }
        };
        match &mut self.series {
            None => self.series = Some(points.clone()),
            Some(acc) if acc.len() != points.len() => {
                return Err(AggregationError::RaggedSeries {
                    group: describe(&self.key_cells),
                    expected: acc.len(),
                    found: points.len(),
                });
            }
            Some(acc) => acc.iter_mut().zip(points).for_each(|(a, p)| *a += p),
        }
        Ok(())
    }
}

fn describe(key_cells: &[Value]) -> String {
    let parts: Vec<String> = key_cells.iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(", "))
}

/// Hashable projection of the grouping cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey(Vec<KeyPart>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
    Seq(Vec<KeyPart>),
    Points(Vec<u64>),
}

fn float_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

impl From<&Value> for KeyPart {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => KeyPart::Null,
            Value::Bool(b) => KeyPart::Bool(*b),
            Value::Int64(v) => KeyPart::Int(*v),
            Value::Float64(v) => KeyPart::Float(float_bits(*v)),
            Value::Utf8(s) => KeyPart::Str(s.clone()),
            Value::List(items) | Value::Set(items) => KeyPart::Seq(items.iter().map(KeyPart::from).collect()),
            Value::Series(points) => KeyPart::Points(points.iter().map(|p| float_bits(*p)).collect()),
        }
    }
}

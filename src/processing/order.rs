//! Final row ordering.

use crate::error::RecordResult;
use crate::types::{RecordSet, Value};

/// Stable ascending sort of `records` by `column`.
///
/// Numbers sort numerically, strings lexicographically and nulls last (see
/// [`crate::types::Value::total_cmp`]). Rows with equal keys keep their relative order. With no
/// column, or no rows, the input is returned unchanged.
///
/// Whether `column` is allowed (it must survive aggregation) is decided by
/// [`crate::config::PipelineConfig::validate`]; here it only has to exist.
pub fn order_by(records: &RecordSet, column: Option<&str>) -> RecordResult<RecordSet> {
    let Some(column) = column else {
        return Ok(records.clone());
    };
    if records.is_empty() {
        return Ok(records.clone());
    }
    let idx = records.require_column(column)?;

    let mut out = records.clone();
    out.rows.sort_by(|a, b| sort_key(a, idx).total_cmp(sort_key(b, idx)));
    Ok(out)
}

// short rows sort like nulls
fn sort_key(row: &[Value], idx: usize) -> &Value {
    row.get(idx).unwrap_or(&Value::Null)
}

//! Row filtering for [`crate::types::RecordSet`].

use crate::types::{RecordSet, Value};

/// Returns a new [`RecordSet`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`RecordSet::filter_rows`].
pub fn filter<F>(records: &RecordSet, predicate: F) -> RecordSet
where
    F: FnMut(&[Value]) -> bool,
{
    records.filter_rows(predicate)
}

/// Returns `true` if `cell` matches one of `allowed`, compared as text.
///
/// Multi-valued cells (lists and sets) match when any of their elements does. Nulls never match.
pub fn cell_matches(cell: &Value, allowed: &[String]) -> bool {
    match cell {
        Value::Null => false,
        Value::List(items) | Value::Set(items) => items.iter().any(|item| cell_matches(item, allowed)),
        other => {
            let text = other.to_string();
            allowed.iter().any(|a| *a == text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{cell_matches, filter};
    use crate::types::{DataType, Field, RecordSet, Schema, Value};

    fn sample() -> RecordSet {
        let schema = Schema::new(vec![
            Field::new("year", DataType::Int64),
            Field::new("groups", DataType::List),
        ]);
        RecordSet::new(
            schema,
            vec![
                vec![Value::Int64(2020), Value::List(vec!["res".into(), "pv".into()])],
                vec![Value::Int64(2030), Value::List(vec!["wind".into()])],
                vec![Value::Int64(2030), Value::Null],
            ],
        )
    }

    fn allowed(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn filter_rows_by_numeric_text() {
        let rs = sample();
        let out = filter(&rs, |row| cell_matches(&row[0], &allowed(&["2030"])));
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.schema, rs.schema);
        // input unchanged
        assert_eq!(rs.row_count(), 3);
    }

    #[test]
    fn list_cells_match_on_any_element() {
        let rs = sample();
        let out = filter(&rs, |row| cell_matches(&row[1], &allowed(&["pv", "hydro"])));
        assert_eq!(out.rows, vec![rs.rows[0].clone()]);
    }

    #[test]
    fn filter_rows_can_return_empty_record_set() {
        let rs = sample();
        let out = rs.filter_rows(|_| false);
        assert_eq!(out.schema, rs.schema);
        assert!(out.rows.is_empty());
    }
}

//! Label substitution for categorical cells.

use crate::config::LabelMap;
use crate::types::{RecordSet, Value};

/// Returns a new [`RecordSet`] where every string cell matching a key of `labels` is replaced by
/// its display label.
///
/// Non-string cells (numbers, nulls, lists, sets, series) are passed through untouched. Row
/// count and schema are always preserved.
///
/// The `unit` column is relabelled like any other string column, and labels run before unit
/// conversion. A unit relabelled to a name the registry does not know (`GW` to `Gigawatt`) is
/// therefore reported as unknown and left unconverted. Label units for display after the
/// pipeline instead, e.g. with [`unit_axis_label`].
pub fn substitute_labels(records: &RecordSet, labels: &LabelMap) -> RecordSet {
    if labels.is_empty() {
        return records.clone();
    }
    records.map_rows(|row| {
        row.iter()
            .map(|cell| match cell {
                Value::Utf8(raw) => match labels.get(raw) {
                    Some(label) => Value::Utf8(label.to_string()),
                    None => cell.clone(),
                },
                other => other.clone(),
            })
            .collect()
    })
}

/// Axis/legend label with the unit appended, e.g. `"Capacity [GW]"`.
///
/// The unit is only appended when every row shares the same unit.
pub fn unit_axis_label(label: &str, records: &RecordSet) -> String {
    match records.common_unit() {
        Some(unit) => format!("{label} [{unit}]"),
        None => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field, Schema};

    fn sample() -> RecordSet {
        let schema = Schema::new(vec![
            Field::new("region", DataType::Utf8),
            Field::new("groups", DataType::List),
            Field::new("value", DataType::Float64),
            Field::new("unit", DataType::Utf8),
        ]);
        RecordSet::new(
            schema,
            vec![
                vec![
                    "BB".into(),
                    Value::List(vec!["BB".into()]),
                    1.0.into(),
                    "GW".into(),
                ],
                vec![Value::Null, Value::Null, 2.0.into(), "GW".into()],
            ],
        )
    }

    #[test]
    fn replaces_matching_strings_and_skips_lists() {
        let rs = sample();
        let labels: LabelMap = [("BB", "Brandenburg")].into_iter().collect();
        let out = substitute_labels(&rs, &labels);

        assert_eq!(out.schema, rs.schema);
        assert_eq!(out.row_count(), rs.row_count());
        assert_eq!(out.rows[0][0], Value::from("Brandenburg"));
        assert_eq!(out.rows[0][1], Value::List(vec!["BB".into()]));
        assert_eq!(out.rows[1][0], Value::Null);
    }

    #[test]
    fn unit_cells_are_relabelled_too() {
        let rs = sample();
        let out = substitute_labels(&rs, &LabelMap::new().with("GW", "Gigawatt"));
        assert_eq!(out.rows[0][3], Value::from("Gigawatt"));
        assert_eq!(out.rows[1][3], Value::from("Gigawatt"));
    }

    #[test]
    fn empty_map_is_identity() {
        let rs = sample();
        assert_eq!(substitute_labels(&rs, &LabelMap::new()), rs);
    }

    #[test]
    fn axis_label_carries_single_unit() {
        let mut rs = sample();
        assert_eq!(unit_axis_label("Capacity", &rs), "Capacity [GW]");
        rs.rows[1][3] = "MW".into();
        assert_eq!(unit_axis_label("Capacity", &rs), "Capacity");
    }
}

//! Unit conversion of the `value` and `series` columns.

use crate::types::{
    DataType, RecordSet, Value, SERIES_COLUMN, UNIT_COLUMN, VALUE_COLUMN,
};
use crate::units::UnitRegistry;

/// Result of [`convert_units`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    /// Converted record set (same rows, same columns).
    pub records: RecordSet,
    /// Number of rows whose unit was rewritten at least once.
    pub converted_rows: usize,
    /// Units found in the data that the registry does not know, in order of first appearance.
    pub unknown_units: Vec<String>,
    /// Requested target units that the registry does not know.
    pub unknown_targets: Vec<String>,
}

impl ConversionOutcome {
    fn unchanged(records: &RecordSet) -> Self {
        Self {
            records: records.clone(),
            converted_rows: 0,
            unknown_units: Vec::new(),
            unknown_targets: Vec::new(),
        }
    }
}

/// Convert `value` (and every element of `series`) into the requested target units.
///
/// Each target is applied independently across all rows:
///
/// - rows whose unit is unknown to `registry` are left unchanged and reported in
///   [`ConversionOutcome::unknown_units`]
/// - rows whose unit measures a different quantity than the target are left unchanged
/// - all other rows are scaled and their `unit` is set to the target
///
/// Rows already expressed in the target are not touched, so converting twice is the same as
/// converting once. An `Int64` value column becomes `Float64` when any target is applied.
pub fn convert_units(records: &RecordSet, registry: &UnitRegistry, targets: &[String]) -> ConversionOutcome {
    if records.is_empty() || targets.is_empty() {
        return ConversionOutcome::unchanged(records);
    }
    let Some(unit_idx) = records.column_index(UNIT_COLUMN) else {
        return ConversionOutcome::unchanged(records);
    };
    let value_idx = records.column_index(VALUE_COLUMN);
    let series_idx = records.column_index(SERIES_COLUMN);

    let mut out = records.clone();
    let mut unknown_units: Vec<String> = Vec::new();
    for row in &out.rows {
        if let Some(unit) = row.get(unit_idx).and_then(Value::as_str) {
            if !registry.is_known(unit) && !unknown_units.iter().any(|u| u == unit) {
                unknown_units.push(unit.to_string());
            }
        }
    }

    if let Some(idx) = value_idx {
        promote_to_float(&mut out, idx);
    }

    let mut unknown_targets = Vec::new();
    let mut touched = vec![false; out.row_count()];
    for target in targets {
        if !registry.is_known(target) {
            unknown_targets.push(target.clone());
            continue;
        }
        for (row, touched) in out.rows.iter_mut().zip(touched.iter_mut()) {
            let factor = match row.get(unit_idx).and_then(Value::as_str) {
                Some(unit) if unit != target => registry.factor(unit, target).ok(),
                _ => None,
            };
            // unknown or incompatible units keep their original value and unit
            let Some(factor) = factor else { continue };

            for idx in [value_idx, series_idx].into_iter().flatten() {
                if let Some(cell) = row.get_mut(idx) {
                    scale_cell(cell, factor);
                }
            }
            if let Some(unit) = row.get_mut(unit_idx) {
                *unit = Value::Utf8(target.clone());
            }
            *touched = true;
        }
    }

    ConversionOutcome {
        converted_rows: touched.iter().filter(|t| **t).count(),
        records: out,
        unknown_units,
        unknown_targets,
    }
}

fn promote_to_float(records: &mut RecordSet, idx: usize) {
    if records.schema.fields[idx].data_type != DataType::Int64 {
        return;
    }
    records.schema.fields[idx].data_type = DataType::Float64;
    for row in &mut records.rows {
        if let Some(cell) = row.get_mut(idx) {
            if let Value::Int64(v) = *cell {
                *cell = Value::Float64(v as f64);
            }
        }
    }
}

fn scale_cell(cell: &mut Value, factor: f64) {
    match cell {
        Value::Float64(v) => *v *= factor,
        Value::Int64(v) => {
            let scaled = *v as f64 * factor;
            *cell = Value::Float64(scaled);
        }
        Value::Series(points) => points.iter_mut().for_each(|p| *p *= factor),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, Schema};

    fn scalar_rows(rows: &[(f64, &str)]) -> RecordSet {
        let schema = Schema::new(vec![
            Field::new("value", DataType::Float64),
            Field::new("unit", DataType::Utf8),
        ]);
        RecordSet::new(
            schema,
            rows.iter()
                .map(|(v, u)| vec![Value::Float64(*v), Value::from(*u)])
                .collect(),
        )
    }

    fn value_at(rs: &RecordSet, row: usize) -> f64 {
        rs.rows[row][0].as_f64().unwrap()
    }

    fn targets(units: &[&str]) -> Vec<String> {
        units.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn converts_compatible_rows_and_skips_the_rest() {
        let reg = UnitRegistry::energy_system();
        let rs = scalar_rows(&[(1.0, "kWh"), (1.0, "MW"), (2.0, "GWh")]);
        let out = convert_units(&rs, &reg, &targets(&["MWh"]));

        assert!((value_at(&out.records, 0) - 0.001).abs() < 1e-15);
        assert_eq!(out.records.rows[0][1], Value::from("MWh"));
        // power row is untouched
        assert_eq!(out.records.rows[1], rs.rows[1]);
        assert!((value_at(&out.records, 2) - 2000.0).abs() < 1e-9);
        assert_eq!(out.converted_rows, 2);
        assert!(out.unknown_units.is_empty());
    }

    #[test]
    fn applies_each_target_to_its_own_family() {
        let reg = UnitRegistry::energy_system();
        let rs = scalar_rows(&[(1.0, "MW"), (5.0, "GWh")]);
        let out = convert_units(&rs, &reg, &targets(&["TWh", "kW"]));
        assert!((value_at(&out.records, 0) - 1000.0).abs() < 1e-9);
        assert_eq!(out.records.rows[0][1], Value::from("kW"));
        assert!((value_at(&out.records, 1) - 0.005).abs() < 1e-15);
        assert_eq!(out.records.rows[1][1], Value::from("TWh"));
    }

    #[test]
    fn unknown_units_pass_through_and_are_reported_once() {
        let reg = UnitRegistry::energy_system();
        let rs = scalar_rows(&[(3.0, "EUR"), (4.0, "EUR"), (1.0, "GW")]);
        let out = convert_units(&rs, &reg, &targets(&["MW", "furlong"]));
        assert_eq!(out.records.rows[0], rs.rows[0]);
        assert_eq!(out.records.rows[1], rs.rows[1]);
        assert_eq!(out.unknown_units, vec!["EUR".to_string()]);
        assert_eq!(out.unknown_targets, vec!["furlong".to_string()]);
        assert_eq!(out.converted_rows, 1);
    }

    #[test]
    fn scales_every_series_element() {
        let reg = UnitRegistry::energy_system();
        let schema = Schema::new(vec![
            Field::new("series", DataType::Series),
            Field::new("unit", DataType::Utf8),
        ]);
        let rs = RecordSet::new(
            schema,
            vec![vec![Value::Series(vec![1.0, 2.0, 3.0]), "GW".into()]],
        );
        let out = convert_units(&rs, &reg, &targets(&["MW"]));
        assert_eq!(
            out.records.rows[0][0],
            Value::Series(vec![1000.0, 2000.0, 3000.0])
        );
        assert_eq!(out.records.rows[0][1], Value::from("MW"));
    }

    #[test]
    fn integer_values_are_promoted() {
        let reg = UnitRegistry::energy_system();
        let schema = Schema::new(vec![
            Field::new("value", DataType::Int64),
            Field::new("unit", DataType::Utf8),
        ]);
        let rs = RecordSet::new(schema, vec![vec![Value::Int64(2), "GW".into()]]);
        let out = convert_units(&rs, &reg, &targets(&["MW"]));
        assert_eq!(out.records.schema.fields[0].data_type, DataType::Float64);
        assert_eq!(out.records.rows[0][0], Value::Float64(2000.0));
    }

    #[test]
    fn empty_input_short_circuits() {
        let reg = UnitRegistry::energy_system();
        let rs = scalar_rows(&[]);
        let out = convert_units(&rs, &reg, &targets(&["MWh"]));
        assert_eq!(out.records, rs);
        assert_eq!(out.converted_rows, 0);
    }
}

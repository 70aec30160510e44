//! Record set transformations.
//!
//! The four pipeline stages live here as pure functions over [`crate::types::RecordSet`]; each
//! returns a new record set and leaves its input untouched. [`crate::pipeline::Pipeline`] runs
//! them in order.
//!
//! - [`substitute_labels()`]: replace categorical values with display labels
//! - [`convert_units()`]: convert `value`/`series` into requested units
//! - [`aggregate()`]: group by dimension columns and sum
//! - [`order_by()`]: stable sort by one column
//!
//! [`filter()`] is used by the query layer to select rows before the pipeline runs.
//!
//! ## Example: convert → aggregate → order
//!
//! ```rust
//! use scenario_comparison::processing::{aggregate, convert_units, order_by};
//! use scenario_comparison::types::{DataType, Field, RecordSet, Schema, Value};
//! use scenario_comparison::units::UnitRegistry;
//!
//! let registry = UnitRegistry::energy_system();
//! let schema = Schema::new(vec![
//!     Field::new("region", DataType::Utf8),
//!     Field::new("value", DataType::Float64),
//!     Field::new("unit", DataType::Utf8),
//! ]);
//! let records = RecordSet::new(
//!     schema,
//!     vec![
//!         vec!["B".into(), 3.0.into(), "GWh".into()],
//!         vec!["A".into(), 5.0.into(), "GWh".into()],
//!         vec!["A".into(), 7000.0.into(), "MWh".into()],
//!     ],
//! );
//!
//! let converted = convert_units(&records, &registry, &["GWh".to_string()]).records;
//! let grouped = aggregate(&converted, &["region".to_string()]).unwrap();
//! let ordered = order_by(&grouped, Some("region")).unwrap();
//!
//! assert_eq!(ordered.rows[0][0], Value::from("A"));
//! assert_eq!(ordered.rows[0][1], Value::Float64(12.0));
//! ```

pub mod aggregate;
pub mod convert;
pub mod filter;
pub mod labels;
pub mod order;

pub use aggregate::aggregate;
pub use convert::{convert_units, ConversionOutcome};
pub use filter::{cell_matches, filter};
pub use labels::{substitute_labels, unit_axis_label};
pub use order::order_by;

//! `scenario-comparison` prepares energy-system scenario results for side-by-side comparison.
//!
//! Results arrive as a tabular [`types::RecordSet`]: scalar rows with a `value` and a `unit`, or
//! timeseries rows with a `series` and a `unit`, plus categorical dimension columns (region, year,
//! technology, ...). The [`pipeline::Pipeline`] turns such a record set into chart-ready rows in
//! four stages:
//!
//! 1. **Label substitution** ([`processing::substitute_labels`]): replace raw categorical values
//!    with display labels.
//! 2. **Unit conversion** ([`processing::convert_units`]): convert values into the units the user
//!    selected, one target per unit family, using a [`units::UnitRegistry`]. Unknown units pass
//!    through with a warning; incompatible units are left alone.
//! 3. **Aggregation** ([`processing::aggregate`]): group by dimension columns (and unit) and sum.
//!    Timeseries of different lengths in one group are rejected.
//! 4. **Ordering** ([`processing::order_by`]): stable ascending sort by one column.
//!
//! ## Quick example
//!
//! ```rust
//! use scenario_comparison::config::{PipelineConfig, UnitSelection};
//! use scenario_comparison::pipeline::Pipeline;
//! use scenario_comparison::types::{DataType, Field, RecordSet, Schema, Value};
//! use scenario_comparison::units::UnitRegistry;
//!
//! # fn main() -> Result<(), scenario_comparison::PipelineError> {
//! // Built once per process, shared by reference.
//! let registry = UnitRegistry::energy_system();
//!
//! let schema = Schema::new(vec![
//!     Field::new("region", DataType::Utf8),
//!     Field::new("year", DataType::Int64),
//!     Field::new("value", DataType::Float64),
//!     Field::new("unit", DataType::Utf8),
//! ]);
//! let records = RecordSet::new(
//!     schema,
//!     vec![
//!         vec!["A".into(), Value::Int64(2020), 5.0.into(), "GWh".into()],
//!         vec!["A".into(), Value::Int64(2021), 7.0.into(), "GWh".into()],
//!         vec!["B".into(), Value::Int64(2020), 3.0.into(), "GWh".into()],
//!     ],
//! );
//!
//! let config = PipelineConfig {
//!     group_by: vec!["region".to_string()],
//!     order_by: Some("region".to_string()),
//!     units: UnitSelection::new().with("Energy", "TWh"),
//!     ..PipelineConfig::default()
//! };
//! config.validate(&registry)?;
//!
//! let out = Pipeline::new(&registry).run(&records, &config)?;
//! assert_eq!(out.records.row_count(), 2);
//! assert_eq!(out.records.get(0, "unit"), Some(&Value::from("TWh")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema, values and record sets
//! - [`units`]: unit registry and the built-in energy-system unit table
//! - [`processing`]: the pipeline stages as pure functions
//! - [`pipeline`]: orchestration, diagnostics and observer hooks
//! - [`config`]: per-request configuration and its validation
//! - [`query`]: query parameter parsing and row filters
//! - [`interchange`]: JSON records in and out
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod interchange;
pub mod pipeline;
pub mod processing;
pub mod query;
pub mod types;
pub mod units;

pub use error::{
    AggregationError, ConfigError, PipelineError, PipelineResult, RecordError, RecordResult, UnitError,
    UnitResult,
};

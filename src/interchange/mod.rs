//! Hand-off formats between the pipeline and its collaborators.
//!
//! The query layer produces records and the chart/table layers consume them; both sides speak
//! JSON records, typed against a [`crate::types::Schema`].

pub mod json;

pub use json::{records_from_json_path, records_from_json_str, records_from_json_values, records_to_json};

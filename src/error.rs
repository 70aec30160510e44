use thiserror::Error;

/// Convenience result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Convenience result type for record set construction and inspection.
pub type RecordResult<T> = Result<T, RecordError>;

/// Convenience result type for unit registry operations.
pub type UnitResult<T> = Result<T, UnitError>;

/// Top-level error returned by [`crate::pipeline::Pipeline::run`].
///
/// Only failures that abort the whole request end up here. Unit conversion problems are recovered
/// inside the conversion stage and reported as [`crate::pipeline::Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input or an intermediate record set is malformed.
    #[error("record set error: {0}")]
    Records(#[from] RecordError),

    /// Grouping could not produce a well-defined result.
    #[error("aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// The pipeline configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors about the shape or content of a [`crate::types::RecordSet`].
#[derive(Debug, Error)]
pub enum RecordError {
    /// Underlying I/O error while reading records.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A column referenced by name does not exist in the schema.
    #[error("column '{column}' does not exist")]
    MissingColumn { column: String },

    /// A `value` or `series` column is present without a `unit` column.
    #[error("record set has a '{column}' column but no 'unit' column")]
    MissingUnitColumn { column: String },

    /// The input does not conform to the provided schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Errors raised by the [`crate::units::UnitRegistry`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The unit has never been registered.
    #[error("unknown unit '{unit}'")]
    Unknown { unit: String },

    /// Both units are known but measure different quantities.
    #[error("incompatible units: cannot convert '{from}' to '{to}'")]
    Incompatible { from: String, to: String },

    /// A unit with this name is already registered.
    #[error("unit '{unit}' is already defined")]
    AlreadyDefined { unit: String },

    /// Scale factors must be finite and strictly positive.
    #[error("invalid scale factor {factor} for unit '{unit}'")]
    InvalidFactor { unit: String, factor: f64 },

    /// A family was registered with no units, or with a default outside its unit list.
    #[error("invalid unit family '{family}': {message}")]
    InvalidFamily { family: String, message: String },
}

/// Errors raised while grouping rows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    /// Timeseries inside one group have different lengths and cannot be summed.
    #[error("cannot sum timeseries of different length in group {group}: expected {expected}, found {found}")]
    RaggedSeries {
        group: String,
        expected: usize,
        found: usize,
    },

    /// A grouping column does not exist in the record set.
    #[error("cannot group by unknown column '{column}'")]
    MissingColumn { column: String },

    /// The `value` column holds something that cannot be summed.
    #[error("non-numeric value in column '{column}' at row {row}")]
    NonNumeric { column: String, row: usize },
}

/// Cross-field configuration problems, reported before the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The ordering column is not one of the grouping columns.
    #[error("order_by column '{order_by}' must be one of the group_by columns")]
    OrderNotGrouped { order_by: String },

    /// A plotting dimension is not one of the grouping columns.
    #[error("dimension '{dimension}' must be one of the group_by columns")]
    DimensionNotGrouped { dimension: String },

    /// The unit selection names a family the registry does not know.
    #[error("unknown unit family '{family}'")]
    UnknownFamily { family: String },

    /// The requested target unit is not selectable for its family.
    #[error("unit '{unit}' is not part of unit family '{family}'")]
    UnitNotInFamily { unit: String, family: String },

    /// A requested target unit does not belong to any family.
    #[error("unit '{unit}' does not belong to any unit family")]
    UnknownUnit { unit: String },

    /// A query parameter could not be interpreted.
    #[error("invalid query parameter '{key}': {message}")]
    InvalidQuery { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_error_converts_into_pipeline_error() {
        let err: PipelineError = AggregationError::RaggedSeries {
            group: "(A, MWh)".to_string(),
            expected: 24,
            found: 48,
        }
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("aggregation failed"));
        assert!(msg.contains("expected 24, found 48"));
    }

    #[test]
    fn config_error_message_names_the_column() {
        let err = ConfigError::OrderNotGrouped {
            order_by: "year".to_string(),
        };
        assert!(err.to_string().contains("'year'"));
    }
}

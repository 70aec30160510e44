//! Pipeline orchestration: labels → units → aggregation → ordering.
//!
//! [`Pipeline`] borrows the process-wide [`UnitRegistry`] and runs the four stages from
//! [`crate::processing`] over one request's [`RecordSet`]. It is synchronous and keeps no state
//! between runs, so one pipeline (or one registry) can serve many requests concurrently.
//!
//! Unit problems are reported as [`Diagnostic`]s and never stop a run; an aggregation failure
//! aborts it.

mod observer;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::processing::{aggregate, convert_units, order_by, substitute_labels};
use crate::types::RecordSet;
use crate::units::UnitRegistry;

pub use observer::{
    CompositeObserver, Diagnostic, PipelineEvent, PipelineObserver, Stage, StageStats, TracingObserver,
};

/// Summary of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub input_rows: usize,
    pub output_rows: usize,
    /// Rows whose unit was converted.
    pub converted_rows: usize,
    pub stages: Vec<StageStats>,
    pub elapsed: Duration,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Transformed rows, ready for charting or tabular display.
    pub records: RecordSet,
    /// Non-fatal findings, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
    pub report: PipelineReport,
}

/// The data preparation pipeline.
pub struct Pipeline<'r> {
    registry: &'r UnitRegistry,
    observer: Arc<dyn PipelineObserver>,
}

impl fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("families", &self.registry.families().len())
            .finish_non_exhaustive()
    }
}

impl<'r> Pipeline<'r> {
    /// Create a pipeline that logs through [`TracingObserver`].
    pub fn new(registry: &'r UnitRegistry) -> Self {
        Self {
            registry,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer for pipeline events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The registry used for unit conversion.
    pub fn registry(&self) -> &'r UnitRegistry {
        self.registry
    }

    /// Run all stages over `records`.
    ///
    /// `config` is expected to have passed [`PipelineConfig::validate`]; cross-field constraints
    /// are not re-checked here.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Records`] if a row does not match the schema length, `records` has a
    ///   `value`/`series` column without `unit`, or the ordering column does not exist
    /// - [`PipelineError::Aggregation`] if grouping fails (e.g. ragged timeseries)
    pub fn run(&self, records: &RecordSet, config: &PipelineConfig) -> PipelineResult<PipelineOutput> {
        let start = Instant::now();
        self.emit(PipelineEvent::RunStarted {
            input_rows: records.row_count(),
        });
        records
            .check_shape()
            .and_then(|()| records.check_unit_column())
            .inspect_err(|err| self.fail(Stage::Labels, err))?;

        let mut stages = Vec::with_capacity(4);
        let mut diagnostics = Vec::new();

        let t = Instant::now();
        let labeled = substitute_labels(records, &config.labels);
        self.finish_stage(&mut stages, Stage::Labels, &labeled, t);

        let t = Instant::now();
        let conversion = convert_units(&labeled, self.registry, &config.units.targets());
        for unit in conversion.unknown_units {
            diagnostics.push(Diagnostic::UnknownUnit { unit });
        }
        for unit in conversion.unknown_targets {
            diagnostics.push(Diagnostic::UnknownTargetUnit { unit });
        }
        for diagnostic in &diagnostics {
            self.emit(PipelineEvent::Diagnostic(diagnostic.clone()));
        }
        let converted = conversion.records;
        self.finish_stage(&mut stages, Stage::Units, &converted, t);

        let t = Instant::now();
        let grouped = aggregate(&converted, &config.group_by)
            .map_err(PipelineError::from)
            .inspect_err(|err| self.fail(Stage::Aggregation, err))?;
        self.finish_stage(&mut stages, Stage::Aggregation, &grouped, t);

        let t = Instant::now();
        let ordered = order_by(&grouped, config.order_by.as_deref())
            .map_err(PipelineError::from)
            .inspect_err(|err| self.fail(Stage::Ordering, err))?;
        self.finish_stage(&mut stages, Stage::Ordering, &ordered, t);

        let elapsed = start.elapsed();
        self.emit(PipelineEvent::RunFinished {
            output_rows: ordered.row_count(),
            elapsed,
        });

        Ok(PipelineOutput {
            report: PipelineReport {
                input_rows: records.row_count(),
                output_rows: ordered.row_count(),
                converted_rows: conversion.converted_rows,
                stages,
                elapsed,
            },
            records: ordered,
            diagnostics,
        })
    }

    fn finish_stage(&self, stages: &mut Vec<StageStats>, stage: Stage, out: &RecordSet, started: Instant) {
        let stats = StageStats {
            stage,
            output_rows: out.row_count(),
            elapsed: started.elapsed(),
        };
        self.emit(PipelineEvent::StageFinished(stats.clone()));
        stages.push(stats);
    }

    fn fail(&self, stage: Stage, err: &dyn std::error::Error) {
        self.emit(PipelineEvent::RunFailed {
            stage,
            message: err.to_string(),
        });
    }

    fn emit(&self, event: PipelineEvent) {
        self.observer.on_event(&event);
    }
}

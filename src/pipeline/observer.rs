use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Labels,
    Units,
    Aggregation,
    Ordering,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Labels => "labels",
            Stage::Units => "units",
            Stage::Aggregation => "aggregation",
            Stage::Ordering => "ordering",
        };
        f.write_str(name)
    }
}

/// Non-fatal findings that do not stop a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A row carries a unit the registry does not know; its value was left unconverted.
    UnknownUnit { unit: String },
    /// A requested target unit is not registered and was ignored.
    UnknownTargetUnit { unit: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownUnit { unit } => write!(f, "Unknown unit '{unit}' found in data."),
            Diagnostic::UnknownTargetUnit { unit } => {
                write!(f, "Unknown target unit '{unit}' requested; conversion skipped.")
            }
        }
    }
}

/// Timing and row count of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStats {
    pub stage: Stage,
    pub output_rows: usize,
    pub elapsed: Duration,
}

/// Events emitted by [`super::Pipeline::run`].
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    RunStarted { input_rows: usize },
    Diagnostic(Diagnostic),
    StageFinished(StageStats),
    RunFailed { stage: Stage, message: String },
    RunFinished { output_rows: usize, elapsed: Duration },
}

/// Observer hook for pipeline events.
///
/// Implementors can record metrics, logs, or surface warnings to users.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Forwards pipeline events to `tracing`.
///
/// Diagnostics are logged at `warn`, failures at `error`, everything else at `debug`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { input_rows } => {
                tracing::debug!(input_rows, "pipeline run started");
            }
            PipelineEvent::Diagnostic(diagnostic) => {
                tracing::warn!("{diagnostic}");
            }
            PipelineEvent::StageFinished(stats) => {
                tracing::debug!(
                    stage = %stats.stage,
                    output_rows = stats.output_rows,
                    elapsed = ?stats.elapsed,
                    "stage finished"
                );
            }
            PipelineEvent::RunFailed { stage, message } => {
                tracing::error!(stage = %stage, "pipeline run failed: {message}");
            }
            PipelineEvent::RunFinished { output_rows, elapsed } => {
                tracing::debug!(output_rows, elapsed = ?elapsed, "pipeline run finished");
            }
        }
    }
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_event(&self, event: &PipelineEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

//! Progress reporting for the provisioning workflow.

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// Steps reported while provisioning, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStep {
    CheckingExistence,
    Initializing,
    CreatingDatabase,
    AwaitingReadiness,
    ApplyingSchema,
    Completed,
}

impl ProgressStep {
    /// Rough completion percentage carried as the numeric progress code.
    pub fn code(self) -> i32 {
        match self {
            ProgressStep::CheckingExistence => 0,
            ProgressStep::Initializing => 10,
            ProgressStep::CreatingDatabase => 25,
            ProgressStep::AwaitingReadiness => 50,
            ProgressStep::ApplyingSchema => 75,
            ProgressStep::Completed => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub code: i32,
    pub message: String,
}

/// Receives (code, message) pairs. Observability only; a sink cannot fail the run.
pub trait ProgressSink: Send + Sync {
    fn report(&self, code: i32, message: &str);

    fn step(&self, step: ProgressStep, message: &str) {
        self.report(step.code(), message);
    }
}

impl<F> ProgressSink for F
where
    F: Fn(i32, &str) + Send + Sync,
{
    fn report(&self, code: i32, message: &str) {
        self(code, message)
    }
}

impl ProgressSink for UnboundedSender<Progress> {
    fn report(&self, code: i32, message: &str) {
        // A dropped receiver only means nobody is watching.
        let _ = self.send(Progress {
            code,
            message: message.to_string(),
        });
    }
}

/// Sink that writes every report to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, code: i32, message: &str) {
        info!(code, "{message}");
    }
}

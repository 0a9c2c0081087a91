pub mod core;
pub mod progress;
pub mod readiness;
pub mod server;
pub mod statements;

pub use core::{
    orchestrate_provision, orchestrate_provision_with, validate_descriptor, ExistenceCheck,
    ProvisionOutcome, ProvisionRequest, Provisioner,
};
pub use progress::{Progress, ProgressSink, ProgressStep, TracingProgress};
pub use readiness::ReadinessStrategy;
pub use server::{ServerError, ServerSession, SqlServer, TiberiusServer, TiberiusSession};

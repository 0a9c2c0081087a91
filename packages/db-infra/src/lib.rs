//! Database provisioning infrastructure for SQL Server: connection
//! descriptors, settings, the server seam and the provisioning workflow.
//! Used by the `sqlprov` CLI.

pub mod config;
pub mod error;
pub mod infra;

pub use config::descriptor::{ConnectionDescriptor, DescriptorError, Keyword};
pub use config::settings::ProvisionSettings;
pub use error::ProvisionError;
pub use infra::db::{
    orchestrate_provision, orchestrate_provision_with, validate_descriptor, ExistenceCheck,
    Progress, ProgressSink, ProgressStep, ProvisionOutcome, ProvisionRequest, Provisioner,
    ReadinessStrategy, ServerError, ServerSession, SqlServer, TiberiusServer, TracingProgress,
};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_support::logging::init();
}

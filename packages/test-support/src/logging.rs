//! Test logging for the provisioner crates

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Provisioning steps at `debug`, driver chatter only when it warns.
pub const DEFAULT_TEST_FILTER: &str = "warn,db_infra=debug,schema=debug,tiberius=warn";

/// Initialize structured logging for tests.
///
/// Idempotent and race-safe. Output goes through the test writer, so it only
/// shows up for failing tests (or with `--nocapture`).
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let directives = filter_directives(
            std::env::var("TEST_LOG").ok(),
            std::env::var("RUST_LOG").ok(),
        );

        fmt()
            .with_env_filter(EnvFilter::new(directives))
            .with_test_writer()
            .without_time()
            .with_target(false)
            .try_init()
            .ok();
    });
}

/// `TEST_LOG` wins over `RUST_LOG`; blank values are ignored.
fn filter_directives(test_log: Option<String>, rust_log: Option<String>) -> String {
    [test_log, rust_log]
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_FILTER.to_string())
}

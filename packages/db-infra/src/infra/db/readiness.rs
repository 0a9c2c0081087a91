use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::{info, trace, warn};

use crate::config::descriptor::ConnectionDescriptor;
use crate::error::ProvisionError;
use crate::infra::db::server::{close_quietly, ServerSession, SqlServer};

/// How to wait for a freshly created database to accept connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessStrategy {
    /// Sleep for a fixed interval and proceed.
    FixedDelay(Duration),
    /// Poll the database's collation on the administrative connection with
    /// exponential backoff until it is reported, failing after `timeout`.
    Poll {
        initial_backoff: Duration,
        max_backoff: Duration,
        timeout: Duration,
    },
}

impl Default for ReadinessStrategy {
    fn default() -> Self {
        ReadinessStrategy::FixedDelay(Duration::from_secs(5))
    }
}

impl ReadinessStrategy {
    pub fn poll(timeout: Duration) -> Self {
        ReadinessStrategy::Poll {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            timeout,
        }
    }

    /// Progress message announcing the wait.
    pub fn describe(&self, database: &str) -> String {
        match self {
            ReadinessStrategy::FixedDelay(delay) if delay.subsec_millis() == 0 => format!(
                "Awaiting {} seconds for database '{database}' to be ready...",
                delay.as_secs()
            ),
            ReadinessStrategy::FixedDelay(delay) => format!(
                "Awaiting {} milliseconds for database '{database}' to be ready...",
                delay.as_millis()
            ),
            ReadinessStrategy::Poll { .. } => {
                format!("Waiting for database '{database}' to be ready...")
            }
        }
    }
}

/// Delay before poll number `attempt + 1`: doubles from `initial`, capped at `max`.
pub fn backoff_delay(initial: Duration, max: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    initial.saturating_mul(factor).min(max)
}

/// Wait until `database` is usable according to `strategy`.
pub async fn await_ready<S: SqlServer>(
    server: &S,
    admin: &ConnectionDescriptor,
    database: &str,
    strategy: &ReadinessStrategy,
) -> Result<(), ProvisionError> {
    match *strategy {
        ReadinessStrategy::FixedDelay(delay) => {
            trace!(database, delay_ms = delay.as_millis(), "settling delay");
            tokio::time::sleep(delay).await;
            Ok(())
        }
        ReadinessStrategy::Poll {
            initial_backoff,
            max_backoff,
            timeout,
        } => poll_until_ready(server, admin, database, initial_backoff, max_backoff, timeout).await,
    }
}

async fn poll_until_ready<S: SqlServer>(
    server: &S,
    admin: &ConnectionDescriptor,
    database: &str,
    initial_backoff: Duration,
    max_backoff: Duration,
    timeout: Duration,
) -> Result<(), ProvisionError> {
    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        match probe(server, admin, database).await {
            Ok(true) => {
                info!(
                    database,
                    attempts,
                    elapsed_ms = start.elapsed().as_millis(),
                    "readiness=ready"
                );
                return Ok(());
            }
            Ok(false) => {
                trace!(database, attempts, "readiness=pending");
            }
            Err(e) => {
                warn!(
                    database,
                    attempts,
                    error = %e,
                    "readiness probe failed"
                );
            }
        }

        let base = backoff_delay(initial_backoff, max_backoff, attempts);
        let jitter_cap = (base.as_millis() as u64 / 4).max(1);
        let delay = base + Duration::from_millis(rand::rng().random_range(0..jitter_cap));

        if start.elapsed() + delay > timeout {
            return Err(ProvisionError::NotReady {
                database: database.to_string(),
                waited_ms: start.elapsed().as_millis(),
            });
        }

        tokio::time::sleep(delay).await;
    }
}

async fn probe<S: SqlServer>(
    server: &S,
    admin: &ConnectionDescriptor,
    database: &str,
) -> Result<bool, ProvisionError> {
    let mut session = server
        .connect(admin)
        .await
        .map_err(ProvisionError::connect)?;
    let collation = session.database_collation(database).await;
    close_quietly(session).await;

    Ok(collation.map_err(ProvisionError::server)?.is_some())
}

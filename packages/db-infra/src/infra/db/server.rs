// Standard library imports
use std::time::Duration;

// External crate imports
use async_trait::async_trait;
use thiserror::Error;
use tiberius::{Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, warn};

// Internal crate imports
use crate::config::descriptor::ConnectionDescriptor;
use crate::infra::db::statements::{
    BEGIN_SCRIPT_TRANSACTION, COMMIT_SCRIPT_TRANSACTION, DATABASE_COLLATION_QUERY,
    DATABASE_ID_QUERY, ROLLBACK_SCRIPT_TRANSACTION,
};

/// Error text reported by the driver or the server, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServerError {
    pub message: String,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<tiberius::error::Error> for ServerError {
    fn from(err: tiberius::error::Error) -> Self {
        Self::new(err.to_string())
    }
}

// ============================================================================
// SqlServer / ServerSession traits
// ============================================================================

/// Opens sessions against a SQL Server instance.
#[async_trait]
pub trait SqlServer: Send + Sync {
    type Session: ServerSession;

    /// Connect using `descriptor` exactly as given (its catalog included).
    async fn connect(&self, descriptor: &ConnectionDescriptor)
        -> Result<Self::Session, ServerError>;
}

/// One open connection. Sessions are short-lived: opened for a single step
/// and closed straight after.
#[async_trait]
pub trait ServerSession: Send {
    /// Run a statement that returns no rows.
    async fn execute(&mut self, sql: &str) -> Result<(), ServerError>;

    /// `database_id` from `sys.databases` for `name`, if such a database exists.
    async fn database_id(&mut self, name: &str) -> Result<Option<i32>, ServerError>;

    /// Collation of `name`; `None` while the server does not consider it usable.
    async fn database_collation(&mut self, name: &str) -> Result<Option<String>, ServerError>;

    /// Run `script` inside one transaction, committing only if all of it succeeds.
    async fn execute_in_transaction(&mut self, script: &str) -> Result<(), ServerError>;

    async fn close(self) -> Result<(), ServerError>
    where
        Self: Sized;
}

// ============================================================================
// Tiberius implementation
// ============================================================================

/// Upper bound used when a descriptor carries `Connect Timeout=0` (meaning "wait forever").
pub const MAX_CONNECT_WAIT: Duration = Duration::from_secs(600);

/// SQL Server reached over TCP with the tiberius TDS client.
#[derive(Debug, Default, Clone, Copy)]
pub struct TiberiusServer;

pub struct TiberiusSession {
    client: Client<Compat<TcpStream>>,
}

impl TiberiusServer {
    fn driver_config(descriptor: &ConnectionDescriptor) -> Result<Config, ServerError> {
        Ok(Config::from_ado_string(&descriptor.to_connection_string())?)
    }
}

#[async_trait]
impl SqlServer for TiberiusServer {
    type Session = TiberiusSession;

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<TiberiusSession, ServerError> {
        let config = Self::driver_config(descriptor)?;
        let timeout = match descriptor.connect_timeout() {
            t if t.is_zero() => MAX_CONNECT_WAIT,
            t => t,
        };

        debug!(
            server = descriptor.server().unwrap_or("<default>"),
            catalog = descriptor.catalog().unwrap_or("<default>"),
            timeout_s = timeout.as_secs(),
            "opening connection"
        );

        let connecting = async move {
            let tcp = TcpStream::connect_named(&config).await?;
            tcp.set_nodelay(true)?;
            let client = Client::connect(config, tcp.compat_write()).await?;
            Ok::<_, tiberius::error::Error>(client)
        };

        match tokio::time::timeout(timeout, connecting).await {
            Ok(Ok(client)) => Ok(TiberiusSession { client }),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ServerError::new(format!(
                "connection attempt timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }
}

impl TiberiusSession {
    async fn batch(&mut self, sql: &str) -> Result<(), ServerError> {
        self.client.simple_query(sql).await?.into_results().await?;
        Ok(())
    }
}

#[async_trait]
impl ServerSession for TiberiusSession {
    async fn execute(&mut self, sql: &str) -> Result<(), ServerError> {
        let result = self.client.execute(sql, &[]).await?;
        debug!(rows_affected = ?result.rows_affected(), "statement executed");
        Ok(())
    }

    async fn database_id(&mut self, name: &str) -> Result<Option<i32>, ServerError> {
        let row = self
            .client
            .query(DATABASE_ID_QUERY, &[&name])
            .await?
            .into_row()
            .await?;
        match row {
            Some(row) => Ok(row.try_get::<i32, _>(0)?),
            None => Ok(None),
        }
    }

    async fn database_collation(&mut self, name: &str) -> Result<Option<String>, ServerError> {
        let row = self
            .client
            .query(DATABASE_COLLATION_QUERY, &[&name])
            .await?
            .into_row()
            .await?;
        match row {
            Some(row) => Ok(row.try_get::<&str, _>(0)?.map(str::to_owned)),
            None => Ok(None),
        }
    }

    async fn execute_in_transaction(&mut self, script: &str) -> Result<(), ServerError> {
        self.batch(BEGIN_SCRIPT_TRANSACTION).await?;

        if let Err(e) = self.batch(script).await {
            // Best-effort rollback; preserve original error
            if let Err(rollback_err) = self.batch(ROLLBACK_SCRIPT_TRANSACTION).await {
                warn!(error = %rollback_err, "rollback after script failure also failed");
            }
            return Err(e);
        }

        self.batch(COMMIT_SCRIPT_TRANSACTION).await
    }

    async fn close(self) -> Result<(), ServerError> {
        self.client.close().await?;
        Ok(())
    }
}

/// Close a session, logging instead of failing: by the time a session is
/// closed its step has already succeeded or failed on its own.
pub async fn close_quietly<S: ServerSession>(session: S) {
    if let Err(e) = session.close().await {
        debug!(error = %e, "closing connection returned error (ignored)");
    }
}

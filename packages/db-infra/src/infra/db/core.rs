use std::path::Path;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::config::data_dir::resolve_data_dir;
use crate::config::descriptor::ConnectionDescriptor;
use crate::config::settings::ProvisionSettings;
use crate::error::ProvisionError;
use crate::infra::db::progress::{ProgressSink, ProgressStep};
use crate::infra::db::readiness::await_ready;
use crate::infra::db::server::{close_quietly, ServerSession, SqlServer, TiberiusServer};
use crate::infra::db::statements::{create_database_statement, DatabaseFiles};

/// Parse a connection string without touching the network. The parser's
/// message is surfaced unmodified inside [`ProvisionError::InvalidDescriptor`].
pub fn validate_descriptor(input: &str) -> Result<ConnectionDescriptor, ProvisionError> {
    let descriptor = ConnectionDescriptor::parse(input)?;

    // The driver has its own parser; refuse anything it would refuse later.
    tiberius::Config::from_ado_string(&descriptor.to_connection_string()).map_err(|e| {
        ProvisionError::InvalidDescriptor {
            message: e.to_string(),
        }
    })?;

    Ok(descriptor)
}

/// Outcome of looking a database up in server metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistenceCheck {
    Exists,
    Absent,
    /// The lookup itself failed (unreachable server, login refused, ...).
    CheckFailed(String),
}

impl ExistenceCheck {
    /// Compatibility view: a failed lookup counts as "does not exist".
    pub fn exists(&self) -> bool {
        matches!(self, ExistenceCheck::Exists)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created { database: String },
    Skipped { reason: String },
}

/// One provisioning run: what to connect to, what to run, who to tell.
pub struct ProvisionRequest<'a> {
    pub descriptor: ConnectionDescriptor,
    pub script: &'a str,
    pub progress: &'a dyn ProgressSink,
}

pub struct Provisioner<S> {
    server: S,
    settings: ProvisionSettings,
}

impl<S: SqlServer> Provisioner<S> {
    pub fn new(server: S, settings: ProvisionSettings) -> Self {
        Self { server, settings }
    }

    pub fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    /// Look the descriptor's catalog up in `sys.databases`, connecting with
    /// the descriptor as given.
    pub async fn check_exists(&self, descriptor: &ConnectionDescriptor) -> ExistenceCheck {
        let Some(database) = descriptor.catalog() else {
            return ExistenceCheck::CheckFailed("connection string names no database".to_string());
        };

        let mut session = match self.server.connect(descriptor).await {
            Ok(session) => session,
            Err(e) => return ExistenceCheck::CheckFailed(e.message),
        };
        let lookup = session.database_id(database).await;
        close_quietly(session).await;

        match lookup {
            Ok(Some(id)) if id > 0 => ExistenceCheck::Exists,
            Ok(_) => ExistenceCheck::Absent,
            Err(e) => ExistenceCheck::CheckFailed(e.message),
        }
    }

    /// Boolean existence check; any failure reads as "does not exist" so the
    /// creation step gets to report the real error.
    pub async fn database_exists(&self, descriptor: &ConnectionDescriptor) -> bool {
        match self.check_exists(descriptor).await {
            ExistenceCheck::CheckFailed(reason) => {
                warn!(
                    catalog = descriptor.catalog().unwrap_or(""),
                    reason = %reason,
                    "existence check failed; treating database as absent"
                );
                false
            }
            check => check.exists(),
        }
    }

    /// Create the database with its files under `data_dir`, wait for it, then
    /// run the schema script in one transaction. Nothing already executed is
    /// undone on failure; in particular the database stays in place.
    pub async fn create_database(
        &self,
        request: &ProvisionRequest<'_>,
        data_dir: &Path,
    ) -> Result<(), ProvisionError> {
        let progress = request.progress;
        let start = Instant::now();

        progress.step(
            ProgressStep::Initializing,
            "Initializing query for creating database",
        );
        let database = request
            .descriptor
            .catalog()
            .ok_or(ProvisionError::MissingCatalog)?;
        let files = DatabaseFiles::new(data_dir, database);
        let statement = create_database_statement(database, &files);
        let admin = request.descriptor.with_catalog(&self.settings.admin_catalog);

        progress.step(
            ProgressStep::CreatingDatabase,
            &format!("Executing query for creating database '{database}'"),
        );
        debug!(admin = %admin, statement = %statement, "create database");
        let mut session = self
            .server
            .connect(&admin)
            .await
            .map_err(ProvisionError::connect)?;
        let created = session.execute(&statement).await;
        close_quietly(session).await;
        created.map_err(ProvisionError::server)?;
        info!(
            database,
            data_file = %files.data_path.display(),
            log_file = %files.log_path.display(),
            "provision=database_created"
        );

        progress.step(
            ProgressStep::AwaitingReadiness,
            &self.settings.readiness.describe(database),
        );
        await_ready(&self.server, &admin, database, &self.settings.readiness).await?;

        progress.step(
            ProgressStep::ApplyingSchema,
            &format!("Executing query for creating tables in database '{database}'"),
        );
        let mut session = self
            .server
            .connect(&request.descriptor)
            .await
            .map_err(ProvisionError::connect)?;
        let applied = session.execute_in_transaction(request.script).await;
        close_quietly(session).await;
        applied.map_err(|e| ProvisionError::Schema {
            database: database.to_string(),
            message: e.message,
        })?;

        info!(
            database,
            elapsed_ms = start.elapsed().as_millis(),
            "provision=schema_committed"
        );
        progress.step(
            ProgressStep::Completed,
            "Database and tables created successfully!",
        );
        Ok(())
    }

    /// Full workflow for an already-validated descriptor: skip compact
    /// edition files, refuse existing databases, resolve the data directory,
    /// then create.
    pub async fn provision(
        &self,
        request: &ProvisionRequest<'_>,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let descriptor = &request.descriptor;

        if descriptor.is_compact_edition() {
            warn!(descriptor = %descriptor, "provision=skipped compact_edition=true");
            return Ok(ProvisionOutcome::Skipped {
                reason: "SQL Server Compact (.sdf) files are not provisioned".to_string(),
            });
        }

        let database = descriptor
            .catalog()
            .ok_or(ProvisionError::MissingCatalog)?
            .to_string();

        info!(descriptor = %descriptor, database = %database, "provision=start");

        request.progress.step(
            ProgressStep::CheckingExistence,
            "Checking if database already exists...",
        );
        if self.database_exists(descriptor).await {
            return Err(ProvisionError::AlreadyExists { database });
        }

        let data_dir = resolve_data_dir(&self.settings.data_dir)?;
        self.create_database(request, &data_dir).await?;

        info!(database = %database, "provision=done");
        Ok(ProvisionOutcome::Created { database })
    }
}

/// Validate `connection_string` and provision against a live SQL Server.
pub async fn orchestrate_provision(
    settings: ProvisionSettings,
    connection_string: &str,
    script: &str,
    progress: &dyn ProgressSink,
) -> Result<ProvisionOutcome, ProvisionError> {
    orchestrate_provision_with(TiberiusServer, settings, connection_string, script, progress).await
}

pub async fn orchestrate_provision_with<S: SqlServer>(
    server: S,
    settings: ProvisionSettings,
    connection_string: &str,
    script: &str,
    progress: &dyn ProgressSink,
) -> Result<ProvisionOutcome, ProvisionError> {
    let descriptor = validate_descriptor(connection_string)?;

    let provisioner = Provisioner::new(server, settings);
    let request = ProvisionRequest {
        descriptor,
        script,
        progress,
    };

    let result = provisioner.provision(&request).await;
    match &result {
        Err(e) if e.is_already_exists() => {
            info!(error = %e, "provision=refused");
        }
        Err(e) => {
            error!(error = %e, "provision=failed");
        }
        Ok(_) => {}
    }
    result
}

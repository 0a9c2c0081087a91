use std::path::PathBuf;

use thiserror::Error;

use crate::config::descriptor::DescriptorError;
use crate::infra::db::server::ServerError;

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The connection string could not be parsed; the parser message is kept verbatim.
    #[error("Invalid connection string. Reason - {message}")]
    InvalidDescriptor { message: String },

    #[error("Connection string does not name a database (Initial Catalog is missing)")]
    MissingCatalog,

    /// Raised deliberately when the existence check finds the target database.
    #[error("Database already exists: '{database}'")]
    AlreadyExists { database: String },

    #[error("Connection failed: {message}")]
    Connect { message: String },

    #[error("{message}")]
    Server { message: String },

    #[error("Schema script failed in database '{database}' (not committed): {message}")]
    Schema { database: String, message: String },

    #[error("Database '{database}' was not ready after {waited_ms}ms")]
    NotReady { database: String, waited_ms: u128 },

    #[error("Failed to prepare data directory {}: {source}", path.display())]
    DataDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ProvisionError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for the distinguished "database already exists" failure callers present specially.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ProvisionError::AlreadyExists { .. })
    }

    pub(crate) fn connect(err: ServerError) -> Self {
        Self::Connect {
            message: err.message,
        }
    }

    pub(crate) fn server(err: ServerError) -> Self {
        Self::Server {
            message: err.message,
        }
    }
}

impl From<DescriptorError> for ProvisionError {
    fn from(err: DescriptorError) -> Self {
        Self::InvalidDescriptor {
            message: err.message,
        }
    }
}

//! Schema script applied to a freshly provisioned database.
//!
//! The script is opaque to the provisioner: it is sent to the server as one
//! batch inside one transaction and never parsed or rewritten here.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Script embedded at build time (keep file name in sync with `sql/`).
pub const INIT_SCRIPT: &str = include_str!("../sql/init.sql");

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema script {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema script {} is empty", path.display())]
    Empty { path: PathBuf },
}

/// Where the schema script comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScriptSource {
    #[default]
    Embedded,
    File(PathBuf),
}

impl ScriptSource {
    pub fn from_option(path: Option<&Path>) -> Self {
        match path {
            Some(p) => ScriptSource::File(p.to_path_buf()),
            None => ScriptSource::Embedded,
        }
    }

    /// Load the script text. Files must contain something besides whitespace.
    pub fn load(&self) -> Result<Cow<'static, str>, SchemaError> {
        match self {
            ScriptSource::Embedded => Ok(Cow::Borrowed(INIT_SCRIPT)),
            ScriptSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
                    path: path.clone(),
                    source,
                })?;
                if text.trim().is_empty() {
                    return Err(SchemaError::Empty { path: path.clone() });
                }
                tracing::debug!(path = %path.display(), bytes = text.len(), "loaded schema script");
                Ok(Cow::Owned(text))
            }
        }
    }
}

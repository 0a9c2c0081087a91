use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ProvisionError;

/// Directory holding the running executable.
pub fn executable_dir() -> Result<PathBuf, ProvisionError> {
    let exe = std::env::current_exe().map_err(|e| ProvisionError::Config {
        message: format!("failed to locate the running executable: {e}"),
    })?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default())
}

/// Resolve the directory for physical database files relative to the
/// executable and create it when absent.
pub fn resolve_data_dir(configured: &Path) -> Result<PathBuf, ProvisionError> {
    resolve_data_dir_from(&executable_dir()?, configured)
}

/// Same as [`resolve_data_dir`] with an explicit base. An absolute
/// `configured` path ignores the base.
pub fn resolve_data_dir_from(base: &Path, configured: &Path) -> Result<PathBuf, ProvisionError> {
    let path = base.join(configured);

    if !path.is_dir() {
        std::fs::create_dir_all(&path).map_err(|source| ProvisionError::DataDirectory {
            path: path.clone(),
            source,
        })?;
        debug!(data_dir = %path.display(), "created data directory");
    }

    Ok(path)
}

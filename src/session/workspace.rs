use super::state::{SessionData, SESSION_DATA_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Get the default workspace file path (~/.config/pqd-score/session.json)
pub fn get_workspace_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("session.json"))
}

/// Load the CLI workspace from a JSON file
///
/// A missing file returns `None` (the caller resumes from the snapshot store).
/// A file with an unsupported version is an error.
pub fn load_workspace(path: &Path) -> Result<Option<SessionData>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open workspace file at {}", path.display()))?;

    let data: SessionData = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load workspace from {}", path.display()))?;

    if data.version != SESSION_DATA_VERSION {
        anyhow::bail!("Unsupported workspace version: {}", data.version);
    }

    Ok(Some(data))
}

/// Save the workspace atomically, creating its directory if needed
pub fn save_workspace(path: &Path, data: &SessionData) -> Result<()> {
    if let Some(parent) = path.parent() {
        crate::config::ensure_dir(parent)?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, data).context("Failed to serialize workspace")?;

    file.commit().context("Failed to save workspace")?;

    Ok(())
}

/// Delete the workspace file; a missing file is fine
pub fn remove_workspace(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to remove workspace file at {}", path.display())),
    }
}

use crate::core::error::{AuditError, AuditResult};
use std::path::{Path, PathBuf};

/// Get the lockaudit home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\lockaudit
/// - Linux: ~/.config/lockaudit
/// - macOS: ~/Library/Application Support/lockaudit
pub fn lockaudit_home() -> AuditResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AuditError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("lockaudit"))
}

/// Get the config file path (`<lockaudit home>/config.yaml`)
pub fn config_file() -> AuditResult<PathBuf> {
    Ok(lockaudit_home()?.join("config.yaml"))
}

/// Create a directory (and its parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> AuditResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Resolve `path` against the current directory without requiring it to exist.
pub fn absolute(path: &Path) -> AuditResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| AuditError::Path(format!("Failed to get current directory: {}", e)))?;
    Ok(cwd.join(path))
}

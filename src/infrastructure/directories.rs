use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::DirectoryConfig;

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    pub state_path: PathBuf,
}

/// Creates the log directory and the state file's directory, and checks the
/// latter is writable before any work starts.
pub fn ensure_directories(cfg: &DirectoryConfig) -> Result<ResolvedPaths> {
    let logs_dir = ensure_dir(Path::new(&cfg.logs_dir))?;

    let state_file = cfg.state_file();
    let state_dir = match state_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent)?,
        _ => ensure_dir(Path::new("."))?,
    };
    let file_name = state_file
        .file_name()
        .with_context(|| format!("state path {} has no file name", state_file.display()))?;

    let probe_file = state_dir.join(".write-test");
    fs::write(&probe_file, b"ok")
        .with_context(|| format!("state directory {} is not writable", state_dir.display()))?;
    fs::remove_file(&probe_file)?;

    Ok(ResolvedPaths {
        logs_dir,
        state_path: state_dir.join(file_name),
    })
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
        // Only tighten directories this process created.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = fs::metadata(dir) {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                let _ = fs::set_permissions(dir, perms);
            }
        }
    }
    Ok(dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()))
}

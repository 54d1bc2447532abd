//! Launching the application executable.
//!
//! The launcher only starts the child; it never waits on it. Post-launch
//! lifecycle belongs to the readiness prober.

use std::env::consts::EXE_SUFFIX;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::{Child, Command};

use crate::outcome::{EXIT_EXEC_NOT_FOUND, EXIT_SPAWN_FAILED};

/// Base name of the application executable, located next to the loader.
pub const TARGET_BASE_NAME: &str = "overture-app";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("application executable not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    /// Stable process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::NotFound(_) => EXIT_EXEC_NOT_FOUND,
            LaunchError::Spawn { .. } => EXIT_SPAWN_FAILED,
        }
    }
}

/// Path of the application executable: the loader's own install directory
/// plus the platform executable suffix.
pub fn target_executable() -> Result<PathBuf, LaunchError> {
    let exe = std::env::current_exe().map_err(|source| LaunchError::Spawn {
        path: PathBuf::from(TARGET_BASE_NAME),
        source,
    })?;
    let dir = exe
        .parent()
        .ok_or_else(|| LaunchError::NotFound(exe.clone()))?;
    Ok(dir.join(format!("{TARGET_BASE_NAME}{EXE_SUFFIX}")))
}

/// Starts the application as an independent child process, forwarding
/// `args` verbatim. Returns a live handle immediately; the child's stdio is
/// inherited so application output stays visible.
pub fn launch<S: AsRef<OsStr>>(path: &Path, args: &[S]) -> Result<Child, LaunchError> {
    if !path.is_file() {
        return Err(LaunchError::NotFound(path.to_path_buf()));
    }

    Command::new(path)
        .args(args)
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            path: path.to_path_buf(),
            source,
        })
}

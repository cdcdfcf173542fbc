//! Single-instance guard.
//!
//! A run file holding the current PID exists while the process runs. A
//! second instance refuses to start while the file is present, and the
//! main loop stops when the file disappears, which doubles as a manual
//! kill switch.

use std::{fs, io, path::PathBuf};

pub struct RunFile {
    path: PathBuf,
}

impl RunFile {
    /// Creates the run file, or returns `None` when another instance
    /// appears to hold it. `remove_stale` clears a leftover file first
    /// (DEV environments).
    pub fn acquire(path: impl Into<PathBuf>, remove_stale: bool) -> io::Result<Option<RunFile>> {
        let path = path.into();

        if remove_stale && path.is_file() {
            fs::remove_file(&path)?;
            tracing::info!("removed stale run file");
        }

        if path.is_file() {
            return Ok(None);
        }

        fs::write(&path, std::process::id().to_string())?;
        Ok(Some(RunFile { path }))
    }

    /// The loop keeps going only while the file is still there.
    pub fn still_held(&self) -> bool {
        self.path.is_file()
    }
}

impl Drop for RunFile {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!("failed to remove run file: {err}");
        }
    }
}

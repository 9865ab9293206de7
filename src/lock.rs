//! Single-instance lock file.
//!
//! Only one lumawall daemon may drive the wallpaper at a time. The lock file
//! holds the owner's PID and an exclusive `fs2` lock for as long as the
//! daemon runs.
//!
//! The file is opened without truncation and only rewritten once the lock is
//! held, so a second instance that fails to lock still sees the owner's PID.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::constants::LOCK_FILE_NAME;
use crate::logger::Log;

/// Held exclusive lock; released and removed on drop.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Default lock location: the user runtime dir, falling back to the temp dir.
    pub fn default_path() -> PathBuf {
        dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(LOCK_FILE_NAME)
    }

    /// Try to take the lock at `path`.
    ///
    /// # Returns
    /// - `Ok(Some(lock))` when this process now owns the lock
    /// - `Ok(None)` when another process holds it
    /// - `Err` when the file could not be opened or written
    pub fn acquire(path: &Path) -> Result<Option<Self>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create lock directory {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            return Ok(None);
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;

        Ok(Some(Self {
            file,
            path: path.to_path_buf(),
        }))
    }

    /// PID recorded in the lock file at `path`, if readable.
    pub fn owner_pid(path: &Path) -> Option<u32> {
        fs::read_to_string(path)
            .ok()?
            .lines()
            .next()?
            .trim()
            .parse()
            .ok()
    }

    /// PID of the daemon currently holding the lock at `path`.
    ///
    /// `None` when no file exists or nobody holds the lock, e.g. a file left
    /// behind by a crashed run.
    pub fn running_owner(path: &Path) -> Option<u32> {
        let file = OpenOptions::new().read(true).open(path).ok()?;
        if file.try_lock_exclusive().is_ok() {
            let _ = FileExt::unlock(&file);
            return None;
        }
        Self::owner_pid(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        if let Err(e) = fs::remove_file(&self.path) {
            Log::log_decorated(&format!("Warning: Failed to remove lock file: {}", e));
        }
    }
}

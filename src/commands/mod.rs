//! Command-line command handlers for lumawall.
//!
//! This module contains implementations for the one-shot CLI commands
//! (--once, --preview, --list, --set) and the library editing commands
//! (--add, --remove, --enable, --disable), plus the helpers they share with
//! the daemon.

use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::automation::{AutomationController, Evaluation, Schedule};
use crate::config::Config;
use crate::constants::PROGRESS_BAR_WIDTH;
use crate::library::Library;
use crate::lock::InstanceLock;
use crate::logger::Log;

pub mod add;
pub mod list;
pub mod once;
pub mod preview;
pub mod remove;
pub mod set;
pub mod toggle;

/// Load the configuration and resolve the library file it points at.
pub fn configured_library_path() -> Result<(Config, PathBuf)> {
    let config_path = Config::get_config_path()?;
    let config = Config::load()?;
    let library_path = config.library_path(&config_path);
    Ok((config, library_path))
}

/// The stored path of the library entry matching `path` as given or canonicalized.
pub fn find_entry(library: &Library, path: &Path) -> Option<PathBuf> {
    if let Some(image) = library.get(path) {
        return Some(image.path.clone());
    }
    let canonical = path.canonicalize().ok()?;
    library.get(&canonical).map(|image| image.path.clone())
}

/// Ask a running daemon to reload so a library edit takes effect now.
///
/// Returns the PID that was signalled, if any daemon holds the instance lock.
pub fn notify_daemon(lock_path: &Path) -> Option<u32> {
    let pid = InstanceLock::running_owner(lock_path)?;

    match send_reload(pid) {
        Ok(()) => {
            Log::log_decorated(&format!("Sent reload signal to lumawall (PID: {})", pid));
            Some(pid)
        }
        Err(e) => {
            Log::log_warning(&format!("Failed to signal running lumawall: {:#}", e));
            Log::log_indented("The change is picked up at its next check");
            None
        }
    }
}

#[cfg(unix)]
fn send_reload(pid: u32) -> Result<()> {
    use anyhow::Context;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let pid = i32::try_from(pid).context("PID out of range")?;
    kill(Pid::from_raw(pid), Signal::SIGUSR2).context("kill(SIGUSR2) failed")?;
    Ok(())
}

#[cfg(not(unix))]
fn send_reload(_pid: u32) -> Result<()> {
    anyhow::bail!("reload signals are not supported on this platform")
}

/// Load the library at `path`, prune entries whose file is gone, and save the
/// pruned manifest back.
pub fn refresh_library(path: &Path) -> Result<Library> {
    let mut library = Library::load_from_path(path)?;
    if !library.check_missing().is_empty() {
        library.save_to_path(path)?;
    }
    Ok(library)
}

/// Log the outcome of an evaluation and the countdown to the next change.
pub fn log_evaluation(controller: &AutomationController, evaluation: &Evaluation, now: NaiveDateTime) {
    Log::log_debug(&format!("Daylight value: {:.3}", evaluation.daylight));

    if let Some(current) = &controller.state().current_image {
        if !evaluation.changed() {
            Log::log_decorated(&format!("Current wallpaper: {}", current.file_name()));
        }
    }

    if let Schedule::Scheduled(next) = evaluation.schedule {
        let progress = controller.progress(now);
        Log::log_block_start(&format!(
            "Next wallpaper change at {}",
            next.format("%Y-%m-%d %H:%M:%S")
        ));
        Log::log_indented(&format!(
            "{} {}",
            progress.bar(PROGRESS_BAR_WIDTH),
            progress.message
        ));
    }
}

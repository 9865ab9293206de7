//! Implementation of the --enable and --disable commands.
//!
//! Disabled images stay in the library but are never selected by automation.

use anyhow::Result;
use std::path::Path;

use crate::commands::{configured_library_path, find_entry, notify_daemon};
use crate::library::Library;
use crate::lock::InstanceLock;
use crate::logger::Log;

/// Enable or disable `image` in the library at `library_path`.
///
/// Returns `false` when the image was already in the requested state; the
/// manifest is only rewritten when something changed.
pub fn set_image_enabled(library_path: &Path, image: &Path, enabled: bool) -> Result<bool> {
    let mut library = Library::load_from_path(library_path)?;
    let Some(key) = find_entry(&library, image) else {
        anyhow::bail!("{} is not in the library", image.display());
    };

    if library.get(&key).is_some_and(|entry| entry.enabled == enabled) {
        return Ok(false);
    }

    library.set_enabled(&key, enabled);
    library.save_to_path(library_path)?;
    Ok(true)
}

/// Handle the --enable / --disable commands.
pub fn handle_toggle_command(image: &Path, enabled: bool) -> Result<()> {
    Log::log_version();

    let (_, library_path) = configured_library_path()?;
    let state = if enabled { "enabled" } else { "disabled" };

    if set_image_enabled(&library_path, image, enabled)? {
        Log::log_block_start(&format!("{} is now {}", image.display(), state));
        notify_daemon(&InstanceLock::default_path());
    } else {
        Log::log_block_start(&format!("{} was already {}", image.display(), state));
    }
    Log::log_end();

    Ok(())
}

//! Implementation of the --remove command.

use anyhow::Result;
use std::path::Path;

use crate::commands::{configured_library_path, find_entry, notify_daemon};
use crate::library::{Library, LibraryImage};
use crate::lock::InstanceLock;
use crate::logger::Log;

/// Remove `image` from the library at `library_path`. The file itself is kept.
pub fn remove_image(library_path: &Path, image: &Path) -> Result<LibraryImage> {
    let mut library = Library::load_from_path(library_path)?;
    let Some(removed) = find_entry(&library, image).and_then(|key| library.remove(&key)) else {
        anyhow::bail!("{} is not in the library", image.display());
    };
    library.save_to_path(library_path)?;
    Ok(removed)
}

/// Handle the --remove command.
pub fn handle_remove_command(image: &Path) -> Result<()> {
    Log::log_version();

    let (_, library_path) = configured_library_path()?;
    let removed = remove_image(&library_path, image)?;

    Log::log_block_start(&format!("Removed {} from the library", removed.file_name()));
    notify_daemon(&InstanceLock::default_path());
    Log::log_end();

    Ok(())
}

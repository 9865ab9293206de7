//! Implementation of the --list command.

use anyhow::Result;

use crate::config::Config;
use crate::library::{Library, SortKey};
use crate::logger::Log;

/// One display line per image, brightest first.
pub fn format_library(library: &Library) -> Vec<String> {
    library
        .sorted_by(SortKey::Brightness, true)
        .into_iter()
        .map(|image| {
            let state = if image.enabled { "on " } else { "off" };
            let added = image
                .added
                .map(|added| format!("  added {}", added.format("%Y-%m-%d")))
                .unwrap_or_default();
            format!(
                "{:.2}  {}  {}{}",
                image.brightness,
                state,
                image.path.display(),
                added
            )
        })
        .collect()
}

/// Handle the --list command.
pub fn handle_list_command() -> Result<()> {
    Log::log_version();

    let config_path = Config::get_config_path()?;
    let config = Config::load()?;
    let library_path = config.library_path(&config_path);
    let library = Library::load_from_path(&library_path)?;

    Log::log_block_start(&format!(
        "{} image(s), {} enabled, from {}",
        library.len(),
        library.enabled_count(),
        crate::utils::path_for_display(&library_path)
    ));
    for line in format_library(&library) {
        Log::log_indented(&line);
    }
    Log::log_end();

    Ok(())
}

//! Implementation of the --set command.
//!
//! Puts a chosen library image on the desktop right away. Automation keeps
//! its own schedule: a running daemon replaces the image at its next
//! predicted change.

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use std::path::Path;

use crate::automation::{AutomationController, AutomationSettings, Evaluation};
use crate::backend::{WallpaperBackend, create_backend};
use crate::commands::{configured_library_path, find_entry, log_evaluation, refresh_library};
use crate::library::Library;
use crate::logger::Log;

/// Apply the library entry for `image` through `backend`.
///
/// Disabled images may be set by hand; they are only excluded from
/// automatic selection.
pub fn set_library_image(
    settings: AutomationSettings,
    library: &Library,
    image: &Path,
    now: NaiveDateTime,
    backend: &mut dyn WallpaperBackend,
) -> Result<(AutomationController, Evaluation)> {
    let Some(entry) = find_entry(library, image).and_then(|key| library.get(&key).cloned()) else {
        anyhow::bail!("{} is not in the library; add it with --add first", image.display());
    };

    let mut controller = AutomationController::new(settings, now);
    let evaluation = controller.set_current_image(&entry, now, library, backend);
    Ok((controller, evaluation))
}

/// Handle the --set command.
pub fn handle_set_command(image: &Path) -> Result<()> {
    Log::log_version();

    let (config, library_path) = configured_library_path()?;
    let library = refresh_library(&library_path)?;
    let mut backend = create_backend(&config)?;

    let now = Local::now().naive_local();
    let (controller, evaluation) = set_library_image(
        config.automation_settings()?,
        &library,
        image,
        now,
        backend.as_mut(),
    )?;
    log_evaluation(&controller, &evaluation, now);
    Log::log_end();

    match evaluation.backend_error {
        Some(e) => Err(e.context("Failed to apply wallpaper")),
        None => Ok(()),
    }
}

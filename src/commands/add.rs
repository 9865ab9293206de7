//! Implementation of the --add command.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use std::path::Path;

use crate::commands::{configured_library_path, notify_daemon};
use crate::library::{Library, LibraryImage};
use crate::lock::InstanceLock;
use crate::logger::Log;
use crate::utils::path_for_display;

/// Add `image` to the library at `library_path` with a known brightness.
///
/// The image is stored under its canonical path so later commands can name
/// it with any spelling.
pub fn add_image(
    library_path: &Path,
    image: &Path,
    brightness: f32,
    added: NaiveDateTime,
) -> Result<LibraryImage> {
    let path = image
        .canonicalize()
        .with_context(|| format!("Cannot add {}: file not found", image.display()))?;
    if !path.is_file() {
        anyhow::bail!("Cannot add {}: not a file", image.display());
    }

    let entry = LibraryImage::new(path, brightness)?.with_added(added);
    let mut library = Library::load_from_path(library_path)?;
    library.add(entry.clone())?;
    library.save_to_path(library_path)?;

    Ok(entry)
}

/// Handle the --add command.
pub fn handle_add_command(image: &Path, brightness: f32) -> Result<()> {
    Log::log_version();

    let (_, library_path) = configured_library_path()?;
    let entry = add_image(&library_path, image, brightness, Local::now().naive_local())?;

    Log::log_block_start(&format!(
        "Added {} (brightness {:.2})",
        entry.file_name(),
        entry.brightness
    ));
    Log::log_indented(&format!("Library: {}", path_for_display(&library_path)));
    notify_daemon(&InstanceLock::default_path());
    Log::log_end();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn added() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_add_image_saves_canonical_entry() {
        let temp_dir = tempdir().unwrap();
        let image = temp_dir.path().join("noon.png");
        std::fs::write(&image, b"png").unwrap();
        let library_path = temp_dir.path().join("library.toml");

        let entry = add_image(&library_path, &image, 0.85, added()).unwrap();
        assert_eq!(entry.path, image.canonicalize().unwrap());
        assert_eq!(entry.added, Some(added()));

        let library = Library::load_from_path(&library_path).unwrap();
        assert_eq!(library.images(), &[entry]);
    }

    #[test]
    fn test_add_image_rejects_bad_input() {
        let temp_dir = tempdir().unwrap();
        let image = temp_dir.path().join("noon.png");
        std::fs::write(&image, b"png").unwrap();
        let library_path = temp_dir.path().join("library.toml");

        assert!(add_image(&library_path, &temp_dir.path().join("gone.png"), 0.5, added()).is_err());
        assert!(add_image(&library_path, temp_dir.path(), 0.5, added()).is_err());
        assert!(add_image(&library_path, &image, 1.5, added()).is_err());
        assert!(!library_path.exists());

        add_image(&library_path, &image, 0.5, added()).unwrap();
        assert!(
            add_image(&library_path, &image, 0.7, added()).is_err(),
            "duplicate paths are rejected"
        );
    }
}

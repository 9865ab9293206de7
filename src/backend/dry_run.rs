//! Backend that only reports what it would set.
//!
//! Selected with `backend = "dry_run"`, so the selection logic can be watched
//! on systems without a supported desktop.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{WallpaperBackend, WallpaperStyle};
use crate::logger::Log;

#[derive(Debug, Default)]
pub struct DryRunBackend {
    last_applied: Option<(PathBuf, WallpaperStyle)>,
}

impl DryRunBackend {
    /// The most recent image and style handed to this backend.
    pub fn last_applied(&self) -> Option<(&Path, WallpaperStyle)> {
        self.last_applied
            .as_ref()
            .map(|(path, style)| (path.as_path(), *style))
    }
}

impl WallpaperBackend for DryRunBackend {
    fn set_wallpaper(&mut self, image: &Path, style: WallpaperStyle) -> Result<()> {
        Log::log_indented(&format!("[dry run] {} ({})", image.display(), style));
        self.last_applied = Some((image.to_path_buf(), style));
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Dry-run"
    }
}

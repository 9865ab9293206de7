//! Image library: the brightness-tagged wallpapers automation chooses from.
//!
//! The library is stored as `library.toml` next to the main configuration:
//!
//! ```toml
//! [[images]]
//! path = "/home/me/walls/noon.jpg"
//! brightness = 0.92
//! enabled = true
//! added = "2024-05-01T10:12:00"
//! ```
//!
//! Brightness is computed by whatever tool adds the image; the library only
//! checks that it lies in [0, 1]. Images are identified by their path.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{MAXIMUM_BRIGHTNESS, MINIMUM_BRIGHTNESS};
use crate::logger::Log;

fn default_enabled() -> bool {
    true
}

/// A single wallpaper in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryImage {
    /// Location of the original image; also the image's identity.
    pub path: PathBuf,
    /// Average brightness in [0, 1].
    pub brightness: f32,
    /// Disabled images stay in the library but are never selected.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<NaiveDateTime>,
}

impl LibraryImage {
    /// Create an enabled image, rejecting brightness values outside [0, 1].
    pub fn new(path: impl Into<PathBuf>, brightness: f32) -> Result<Self> {
        let image = Self {
            path: path.into(),
            brightness,
            enabled: true,
            added: None,
        };
        image.validate()?;
        Ok(image)
    }

    pub fn with_added(mut self, added: NaiveDateTime) -> Self {
        self.added = Some(added);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Two entries refer to the same wallpaper.
    pub fn is_same_image(&self, other: &LibraryImage) -> bool {
        self.path == other.path
    }

    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn validate(&self) -> Result<()> {
        if !self.brightness.is_finite()
            || !(MINIMUM_BRIGHTNESS..=MAXIMUM_BRIGHTNESS).contains(&self.brightness)
        {
            anyhow::bail!(
                "Brightness of {} must be between {} and {} (got {})",
                self.path.display(),
                MINIMUM_BRIGHTNESS,
                MAXIMUM_BRIGHTNESS,
                self.brightness
            );
        }
        Ok(())
    }
}

/// Sort orders offered when listing the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Brightness,
    DateAdded,
    Enabled,
}

/// The full set of wallpapers, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    images: Vec<LibraryImage>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from already validated images.
    pub fn from_images(images: Vec<LibraryImage>) -> Self {
        Self { images }
    }

    /// Load the library manifest. A missing file is an empty library.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            Log::log_debug(&format!(
                "No library found at {}, starting empty",
                path.display()
            ));
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read library from {}", path.display()))?;
        let library: Library = toml::from_str(&content)
            .with_context(|| format!("Failed to parse library from {}", path.display()))?;

        for image in &library.images {
            image
                .validate()
                .with_context(|| format!("Invalid entry in {}", path.display()))?;
        }

        Ok(library)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create library directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize library")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write library to {}", path.display()))?;
        Ok(())
    }

    pub fn images(&self) -> &[LibraryImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.images.iter().filter(|image| image.enabled).count()
    }

    pub fn get(&self, path: &Path) -> Option<&LibraryImage> {
        self.images.iter().find(|image| image.path == path)
    }

    /// Add an image unless one with the same path is already present.
    pub fn add(&mut self, image: LibraryImage) -> Result<()> {
        image.validate()?;
        if self.get(&image.path).is_some() {
            anyhow::bail!("{} is already in the library", image.file_name());
        }
        self.images.push(image);
        Ok(())
    }

    pub fn remove(&mut self, path: &Path) -> Option<LibraryImage> {
        let index = self.images.iter().position(|image| image.path == path)?;
        Some(self.images.remove(index))
    }

    /// Enable or disable an image. Returns `false` if the path is unknown.
    pub fn set_enabled(&mut self, path: &Path, enabled: bool) -> bool {
        match self.images.iter_mut().find(|image| image.path == path) {
            Some(image) => {
                image.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Drop entries whose file no longer exists.
    ///
    /// Returns the file names that were removed, and logs them as a warning.
    pub fn check_missing(&mut self) -> Vec<String> {
        let (present, missing): (Vec<_>, Vec<_>) = std::mem::take(&mut self.images)
            .into_iter()
            .partition(|image| image.path.exists());
        self.images = present;

        let names: Vec<String> = missing.iter().map(LibraryImage::file_name).collect();
        if !names.is_empty() {
            Log::log_warning(&format!(
                "Removed {} missing image(s) from the library:",
                names.len()
            ));
            for name in &names {
                Log::log_indented(name);
            }
        }
        names
    }

    /// Images ordered for display. Ties keep library order.
    pub fn sorted_by(&self, key: SortKey, descending: bool) -> Vec<&LibraryImage> {
        let mut sorted: Vec<&LibraryImage> = self.images.iter().collect();
        sorted.sort_by(|a, b| {
            let ordering = match key {
                SortKey::Brightness => a
                    .brightness
                    .partial_cmp(&b.brightness)
                    .unwrap_or(Ordering::Equal),
                SortKey::DateAdded => a.added.cmp(&b.added),
                SortKey::Enabled => a.enabled.cmp(&b.enabled),
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        sorted
    }
}

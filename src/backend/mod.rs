//! Backend abstraction layer for applying a wallpaper.
//!
//! This module provides a unified interface for setting the desktop wallpaper
//! through the `WallpaperBackend` trait. Automation treats the backend as an
//! opaque side effect: it hands over an image path and a style and only cares
//! whether the call succeeded.
//!
//! ## Supported Backends
//!
//! - **Command Backend**: Runs a user-supplied command such as `swww img {path}`
//! - **Windows Backend**: Native `SystemParametersInfoW` call plus the desktop
//!   style registry values (Windows only)
//! - **Dry-run Backend**: Logs what would be set without touching the desktop
//!
//! ## Backend Selection
//!
//! - **Auto-detection**: Windows backend on Windows, otherwise the command
//!   backend when `wallpaper_command` is configured
//! - **Explicit Configuration**: `backend = "command"`, `"windows"` or `"dry_run"`

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::config::{Backend, Config};
use crate::logger::Log;

pub mod command;
pub mod dry_run;
#[cfg(windows)]
pub mod windows;

/// How the image is laid out on the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperStyle {
    Tiled,
    Centered,
    Stretched,
    Fit,
    Fill,
}

impl WallpaperStyle {
    pub const ALL: [WallpaperStyle; 5] = [
        WallpaperStyle::Tiled,
        WallpaperStyle::Centered,
        WallpaperStyle::Stretched,
        WallpaperStyle::Fit,
        WallpaperStyle::Fill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WallpaperStyle::Tiled => "tiled",
            WallpaperStyle::Centered => "centered",
            WallpaperStyle::Stretched => "stretched",
            WallpaperStyle::Fit => "fit",
            WallpaperStyle::Fill => "fill",
        }
    }
}

impl fmt::Display for WallpaperStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for anything that can put an image on the desktop.
#[cfg_attr(test, mockall::automock)]
pub trait WallpaperBackend {
    /// Apply `image` as the desktop wallpaper using `style`.
    ///
    /// # Returns
    /// - `Ok(())` if the wallpaper was applied
    /// - `Err` if the underlying mechanism reported a failure
    fn set_wallpaper(&mut self, image: &Path, style: WallpaperStyle) -> Result<()>;

    /// Get a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;
}

/// Concrete backend chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendType {
    Command,
    Windows,
    DryRun,
}

/// Resolve the configured backend against the current platform.
pub fn detect_backend(config: &Config) -> Result<BackendType> {
    match config.backend.unwrap_or(crate::constants::DEFAULT_BACKEND) {
        Backend::Auto => {
            if cfg!(windows) {
                Ok(BackendType::Windows)
            } else if config.wallpaper_command.is_some() {
                Ok(BackendType::Command)
            } else {
                Log::log_pipe();
                anyhow::bail!(
                    "No wallpaper backend available on this platform.\n\
                    Set wallpaper_command in lumawall.toml, for example:\n\
                      • wallpaper_command = \"swww img {{path}}\"\n\
                      • wallpaper_command = \"feh --bg-{{style}} {{path}}\"\n\
                    or use backend = \"dry_run\" to only log the selection."
                );
            }
        }
        Backend::Command => {
            if config.wallpaper_command.is_none() {
                Log::log_pipe();
                anyhow::bail!(
                    "Configuration specifies backend=\"command\" but wallpaper_command is not set."
                );
            }
            Ok(BackendType::Command)
        }
        Backend::Windows => {
            if !cfg!(windows) {
                Log::log_pipe();
                anyhow::bail!(
                    "Configuration specifies backend=\"windows\" but this is not a Windows system.\n\
                    \n\
                    To fix this, either:\n\
                    • Switch to automatic detection: set backend=\"auto\" in lumawall.toml\n\
                    • Use a command: set backend=\"command\" and wallpaper_command"
                );
            }
            Ok(BackendType::Windows)
        }
        Backend::DryRun => Ok(BackendType::DryRun),
    }
}

/// Build the backend selected by `detect_backend`.
pub fn create_backend(config: &Config) -> Result<Box<dyn WallpaperBackend>> {
    let backend: Box<dyn WallpaperBackend> = match detect_backend(config)? {
        BackendType::Command => {
            let template = config.wallpaper_command.as_deref().unwrap_or_default();
            Box::new(command::CommandBackend::new(template)?)
        }
        BackendType::DryRun => Box::new(dry_run::DryRunBackend::default()),
        #[cfg(windows)]
        BackendType::Windows => Box::new(windows::WindowsBackend::new()),
        #[cfg(not(windows))]
        BackendType::Windows => unreachable!("detect_backend rejects windows on this platform"),
    };

    Log::log_decorated(&format!("Using {} backend", backend.backend_name()));
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::create_test_config;

    #[test]
    fn test_style_serde_names() {
        #[derive(Deserialize, Serialize)]
        struct Wrapper {
            style: WallpaperStyle,
        }

        for style in WallpaperStyle::ALL {
            let text = toml::to_string(&Wrapper { style }).unwrap();
            assert_eq!(text.trim(), format!("style = \"{}\"", style.as_str()));
            let parsed: Wrapper = toml::from_str(&text).unwrap();
            assert_eq!(parsed.style, style);
        }
    }

    #[test]
    fn test_detect_explicit_backends() {
        let mut config = create_test_config();

        config.backend = Some(Backend::DryRun);
        assert_eq!(detect_backend(&config).unwrap(), BackendType::DryRun);

        config.backend = Some(Backend::Command);
        config.wallpaper_command = None;
        assert!(detect_backend(&config).is_err());

        config.wallpaper_command = Some("true {path}".to_string());
        assert_eq!(detect_backend(&config).unwrap(), BackendType::Command);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_detect_auto_without_command_fails() {
        let mut config = create_test_config();
        config.backend = Some(Backend::Auto);
        config.wallpaper_command = None;
        assert!(detect_backend(&config).is_err());

        config.wallpaper_command = Some("true {path}".to_string());
        assert_eq!(detect_backend(&config).unwrap(), BackendType::Command);

        config.backend = Some(Backend::Windows);
        assert!(detect_backend(&config).is_err());
    }
}

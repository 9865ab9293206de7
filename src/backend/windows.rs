//! Native Windows backend.
//!
//! Writes the `WallpaperStyle` / `TileWallpaper` values under
//! `HKCU\Control Panel\Desktop` and then asks the shell to load the new image
//! with `SystemParametersInfoW(SPI_SETDESKWALLPAPER)`.

use anyhow::{Context, Result, anyhow};
use std::ffi::{OsStr, c_void};
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use windows::Win32::UI::WindowsAndMessaging::{
    SPI_SETDESKWALLPAPER, SPIF_SENDCHANGE, SPIF_UPDATEINIFILE, SystemParametersInfoW,
};
use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, KEY_SET_VALUE};

use super::{WallpaperBackend, WallpaperStyle};

const DESKTOP_KEY: &str = "Control Panel\\Desktop";

#[derive(Debug, Default)]
pub struct WindowsBackend;

impl WindowsBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Registry values for a style: (WallpaperStyle, TileWallpaper).
fn registry_values(style: WallpaperStyle) -> (&'static str, &'static str) {
    match style {
        WallpaperStyle::Tiled => ("0", "1"),
        WallpaperStyle::Centered => ("0", "0"),
        WallpaperStyle::Stretched => ("2", "0"),
        WallpaperStyle::Fit => ("6", "0"),
        WallpaperStyle::Fill => ("10", "0"),
    }
}

fn set_style(style: WallpaperStyle) -> Result<()> {
    let (wallpaper_style, tile) = registry_values(style);
    let desktop = RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey_with_flags(DESKTOP_KEY, KEY_SET_VALUE)
        .context("Failed to open the desktop registry key")?;
    desktop.set_value("WallpaperStyle", &wallpaper_style)?;
    desktop.set_value("TileWallpaper", &tile)?;
    Ok(())
}

impl WallpaperBackend for WindowsBackend {
    fn set_wallpaper(&mut self, image: &Path, style: WallpaperStyle) -> Result<()> {
        set_style(style)?;

        let mut wide: Vec<u16> = OsStr::new(image)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        // SAFETY: `wide` is NUL-terminated and outlives the call, which only
        // reads the path during the call.
        unsafe {
            SystemParametersInfoW(
                SPI_SETDESKWALLPAPER,
                0,
                Some(wide.as_mut_ptr() as *mut c_void),
                SPIF_UPDATEINIFILE | SPIF_SENDCHANGE,
            )
        }
        .map_err(|err| anyhow!("SystemParametersInfoW failed: {err}"))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Windows"
    }
}

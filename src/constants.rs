//! Application constants and default values for lumawall.
//!
//! This module contains all the configuration defaults, validation limits,
//! and operational constants used throughout the application.

use crate::config::Backend;
use crate::backend::WallpaperStyle;

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_BACKEND: Backend = Backend::Auto; // Auto-detect backend
pub const DEFAULT_BRIGHTEST_TIME: &str = "13:00:00";
pub const DEFAULT_DARKEST_TIME: &str = "23:00:00";
pub const DEFAULT_UPDATE_INTERVAL_HOURS: u32 = 0;
pub const DEFAULT_UPDATE_INTERVAL_MINS: u32 = 1;
pub const DEFAULT_WALLPAPER_STYLE: WallpaperStyle = WallpaperStyle::Fill;
pub const DEFAULT_STARTS_ON_STARTUP: bool = false;
pub const DEFAULT_LIBRARY_FILE: &str = "library.toml";

// ═══ File Locations ═══

pub const CONFIG_DIR_NAME: &str = "lumawall";
pub const CONFIG_FILE_NAME: &str = "lumawall.toml";
pub const CONFIG_PATH_ENV: &str = "LUMAWALL_CONFIG"; // Overrides the config file location
pub const LOCK_FILE_NAME: &str = "lumawall.lock";
pub const AUTOSTART_ENTRY_NAME: &str = "lumawall";

// ═══ Daylight Model ═══

/// Wrap-around length used by the daylight curve.
///
/// One short of the real 1440 minutes in a day. The curve stays within
/// [0, 1] because times of day are whole minutes in [0, 1439]; the only
/// visible effect is that 23:59 and 00:00 share a daylight value.
pub const MINUTES_IN_DAY: u32 = 1439;

// ═══ Validation Limits ═══
// These limits ensure user inputs are within reasonable and safe ranges

pub const MAXIMUM_UPDATE_INTERVAL_HOURS: u32 = 23;
pub const MAXIMUM_UPDATE_INTERVAL_MINS: u32 = 59;
pub const MINIMUM_CHECK_INTERVAL_MINS: i64 = 1; // A zero interval would never advance the search
pub const MINIMUM_BRIGHTNESS: f32 = 0.0;
pub const MAXIMUM_BRIGHTNESS: f32 = 1.0;

// ═══ Operational Timing Constants ═══

pub const CHECK_INTERVAL_SECS: u64 = 1; // How often to check the running flag during sleep
pub const SLEEP_DETECTION_THRESHOLD_SECS: i64 = 300; // 5 minutes - detect system sleep/resume

// ═══ User Interface Constants ═══

pub const PROGRESS_BAR_WIDTH: usize = 30; // Characters width for progress bar display
pub const WILL_NOT_CHANGE_MESSAGE: &str = "Wallpaper will not change with current settings";

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1; // General failure

//! # Lumawall
//!
//! A daylight-driven wallpaper automation tool.
//!
//! Lumawall keeps a library of wallpapers, each tagged with a perceived
//! brightness, and continuously shows the one whose brightness best matches a
//! daily "daylight" curve. The curve peaks at a configurable brightest time of
//! day and bottoms out at a configurable darkest time.
//!
//! ## Architecture
//!
//! - **args**: Command-line parsing
//! - **automation**: Automation state machine (evaluate, apply, schedule)
//! - **autostart**: Login startup registration
//! - **backend**: Wallpaper backends (external command, Windows desktop, dry run)
//! - **commands**: One-shot CLI commands
//! - **config**: Configuration loading, validation, and default generation
//! - **constants**: Application-wide constants and defaults
//! - **daylight**: The daily daylight curve
//! - **library**: Wallpaper library manifest
//! - **lock**: Single-instance lock file
//! - **logger**: Structured logging with visual formatting
//! - **scheduler**: Next-change prediction
//! - **selector**: Closest-brightness image selection
//! - **signals**: Reload and shutdown signal handling
//! - **utils**: Path display and time parsing helpers

pub mod args;
pub mod automation;
pub mod autostart;
pub mod backend;
pub mod commands;
pub mod config;
pub mod constants;
pub mod daylight;
pub mod library;
pub mod lock;
pub mod logger;
pub mod scheduler;
pub mod selector;
pub mod signals;
pub mod utils;

// Re-export important types for easier access
pub use automation::{AutomationController, AutomationSettings, Evaluation, Schedule};
pub use backend::{WallpaperBackend, WallpaperStyle};
pub use config::Config;
pub use daylight::{Anchors, TimeOfDayMinutes, daylight_value};
pub use library::{Library, LibraryImage};
pub use logger::{Log, LogLevel};
pub use scheduler::find_next_change_time;
pub use selector::select_closest;

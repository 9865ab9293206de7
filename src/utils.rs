//! Utility functions shared across the codebase.
//!
//! This module provides small helpers for user-facing path display and for
//! parsing times of day given on the command line.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::path::Path;

/// Shorten a path for display by replacing the home directory with `~`.
///
/// # Examples
/// ```
/// use lumawall::utils::path_for_display;
/// use std::path::Path;
/// assert_eq!(path_for_display(Path::new("/etc/lumawall.toml")), "/etc/lumawall.toml");
/// ```
pub fn path_for_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

/// Parse a time of day in `HH:MM:SS` or `HH:MM` form.
///
/// # Examples
/// ```
/// use lumawall::utils::parse_time_of_day;
/// use chrono::NaiveTime;
/// assert_eq!(parse_time_of_day("07:30").unwrap(), NaiveTime::from_hms_opt(7, 30, 0).unwrap());
/// assert!(parse_time_of_day("25:00").is_err());
/// ```
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .with_context(|| format!("Invalid time '{}'. Use HH:MM or HH:MM:SS format", input))
}

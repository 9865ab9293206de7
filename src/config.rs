//! Configuration system for lumawall with validation and default generation.
//!
//! This module handles the TOML configuration file, default value generation,
//! validation, and the mapping between the file and the flat
//! `AutomationSettings` record used by automation.
//!
//! ## Configuration Source
//!
//! The configuration lives at `lumawall/lumawall.toml` inside the platform
//! config directory (`$XDG_CONFIG_HOME` on Linux, `%APPDATA%` on Windows).
//! Setting `LUMAWALL_CONFIG` points lumawall at a different file. A commented
//! default file is written on first run.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Backend]
//! backend = "auto"                    # "auto", "command", "windows" or "dry_run"
//! wallpaper_command = "swww img {path}"
//!
//! #[Daylight curve]
//! brightest_time = "13:00:00"         # Brightest image is shown at this time
//! darkest_time = "23:00:00"           # Darkest image is shown at this time
//!
//! #[Automation]
//! update_interval_hours = 0           # Hours between checks (0-23)
//! update_interval_mins = 1            # Minutes between checks (0-59)
//! wallpaper_style = "fill"            # tiled, centered, stretched, fit, fill
//! starts_on_startup = false           # Start lumawall on login
//! library = "library.toml"            # Image library, relative to this file
//! ```
//!
//! ## Validation and Error Handling
//!
//! - **Time format validation**: anchor times must parse as `HH:MM:SS`
//! - **Range validation**: interval hours 0-23, minutes 0-59, at least one minute in total
//! - **Backend validation**: `backend = "command"` needs a `wallpaper_command`
//!   containing `{path}`
//!
//! A 0h 0m interval is raised to one minute and written back to the file.
//! Equal anchor times are accepted with a warning: the wallpaper never changes.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::automation::AutomationSettings;
use crate::backend::WallpaperStyle;
use crate::backend::command::CommandBackend;
use crate::constants::*;
use crate::logger::Log;
use crate::utils::path_for_display;

const TIME_FORMAT: &str = "%H:%M:%S";

/// Backend selection for applying wallpapers.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Windows backend on Windows, otherwise the command backend when a
    /// `wallpaper_command` is configured.
    Auto,
    /// Run `wallpaper_command` for every change.
    Command,
    /// Native desktop API plus the desktop style registry values.
    Windows,
    /// Log the selection without touching the desktop.
    DryRun,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Command => "command",
            Backend::Windows => "windows",
            Backend::DryRun => "dry_run",
        }
    }
}

/// Configuration structure for lumawall application settings.
///
/// Loaded from `lumawall.toml`. Most fields are optional and fall back to the
/// defaults in `constants` when not specified.
///
/// ## Configuration Categories
///
/// - **Backend Control**: `backend`, `wallpaper_command`
/// - **Daylight Curve**: `brightest_time`, `darkest_time`
/// - **Update Frequency**: `update_interval_hours`, `update_interval_mins`
/// - **Presentation**: `wallpaper_style`
/// - **Session**: `starts_on_startup`, `library`
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Backend implementation used to apply wallpapers.
    ///
    /// Defaults to `Auto` which picks a backend for the current platform.
    pub backend: Option<Backend>,

    /// Command template for the command backend, e.g. `"swww img {path}"`.
    pub wallpaper_command: Option<String>,

    pub brightest_time: String,
    pub darkest_time: String,
    pub update_interval_hours: Option<u32>,
    pub update_interval_mins: Option<u32>,
    pub wallpaper_style: Option<WallpaperStyle>,
    pub starts_on_startup: Option<bool>,
    pub library: Option<String>, // relative to the config file's directory
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Create a default config file at `path`, creating parent directories as needed.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_content = ConfigBuilder::new()
            .add_section("Backend")
            .add_setting(
                "backend",
                &format!("\"{}\"", DEFAULT_BACKEND.as_str()),
                "\"auto\", \"command\", \"windows\" or \"dry_run\"",
            )
            .add_commented_setting(
                "wallpaper_command",
                "\"swww img {path}\"",
                "Command backend; {path} and {style} are substituted",
            )
            .add_section("Daylight curve")
            .add_setting(
                "brightest_time",
                &format!("\"{}\"", DEFAULT_BRIGHTEST_TIME),
                "Brightest image is shown at this time (HH:MM:SS)",
            )
            .add_setting(
                "darkest_time",
                &format!("\"{}\"", DEFAULT_DARKEST_TIME),
                "Darkest image is shown at this time (HH:MM:SS)",
            )
            .add_section("Automation")
            .add_setting(
                "update_interval_hours",
                &DEFAULT_UPDATE_INTERVAL_HOURS.to_string(),
                &format!("Hours between checks (0-{})", MAXIMUM_UPDATE_INTERVAL_HOURS),
            )
            .add_setting(
                "update_interval_mins",
                &DEFAULT_UPDATE_INTERVAL_MINS.to_string(),
                &format!("Minutes between checks (0-{})", MAXIMUM_UPDATE_INTERVAL_MINS),
            )
            .add_setting(
                "wallpaper_style",
                &format!("\"{}\"", DEFAULT_WALLPAPER_STYLE.as_str()),
                "tiled, centered, stretched, fit or fill",
            )
            .add_setting(
                "starts_on_startup",
                &DEFAULT_STARTS_ON_STARTUP.to_string(),
                "Start lumawall when you log in",
            )
            .add_setting(
                "library",
                &format!("\"{}\"", DEFAULT_LIBRARY_FILE),
                "Image library, relative to this file",
            )
            .build();

        fs::write(path, config_content).context("Failed to write default config file")?;
        Ok(())
    }

    fn apply_defaults_and_validate_fields(config: &mut Config) -> Result<()> {
        if config.backend.is_none() {
            config.backend = Some(DEFAULT_BACKEND);
        }

        // Validate time formats
        NaiveTime::parse_from_str(&config.brightest_time, TIME_FORMAT)
            .context("Invalid brightest_time format in config. Use HH:MM:SS format")?;
        NaiveTime::parse_from_str(&config.darkest_time, TIME_FORMAT)
            .context("Invalid darkest_time format in config. Use HH:MM:SS format")?;

        if let Some(hours) = config.update_interval_hours {
            if hours > MAXIMUM_UPDATE_INTERVAL_HOURS {
                anyhow::bail!(
                    "update_interval_hours must be between 0 and {} (got {})",
                    MAXIMUM_UPDATE_INTERVAL_HOURS,
                    hours
                );
            }
        } else {
            config.update_interval_hours = Some(DEFAULT_UPDATE_INTERVAL_HOURS);
        }

        if let Some(mins) = config.update_interval_mins {
            if mins > MAXIMUM_UPDATE_INTERVAL_MINS {
                anyhow::bail!(
                    "update_interval_mins must be between 0 and {} (got {})",
                    MAXIMUM_UPDATE_INTERVAL_MINS,
                    mins
                );
            }
        } else {
            config.update_interval_mins = Some(DEFAULT_UPDATE_INTERVAL_MINS);
        }

        if config.update_interval_hours == Some(0) && config.update_interval_mins == Some(0) {
            Log::log_pipe();
            Log::log_warning("Update interval of 0h 0m is too short, using 1 minute");
            config.update_interval_mins = Some(MINIMUM_CHECK_INTERVAL_MINS as u32);
        }

        if config.wallpaper_style.is_none() {
            config.wallpaper_style = Some(DEFAULT_WALLPAPER_STYLE);
        }

        if config.starts_on_startup.is_none() {
            config.starts_on_startup = Some(DEFAULT_STARTS_ON_STARTUP);
        }

        if config.library.is_none() {
            config.library = Some(DEFAULT_LIBRARY_FILE.to_string());
        }

        // An empty command is the same as no command
        if config
            .wallpaper_command
            .as_deref()
            .is_some_and(|cmd| cmd.trim().is_empty())
        {
            config.wallpaper_command = None;
        }

        Ok(())
    }

    /// Load and validate the config at `path`.
    ///
    /// Does NOT create a default config if the path doesn't exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        let zero_interval =
            config.update_interval_hours == Some(0) && config.update_interval_mins == Some(0);

        Self::apply_defaults_and_validate_fields(&mut config)?;
        validate_config(&config)?;

        if zero_interval {
            Self::save_settings(path, &config.automation_settings()?)?;
            Log::log_indented(&format!(
                "Saved corrected interval to {}",
                path_for_display(path)
            ));
        }

        Ok(config)
    }

    /// Load the config from its standard location, writing a default file first if needed.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
            Log::log_indented(&format!(
                "Created default configuration at {}",
                path_for_display(&config_path)
            ));
        }

        Self::load_from_path(&config_path).with_context(|| {
            Log::log_pipe();
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// Resolve the library file against the directory of `config_path`.
    pub fn library_path(&self, config_path: &Path) -> PathBuf {
        let library = Path::new(self.library.as_deref().unwrap_or(DEFAULT_LIBRARY_FILE));
        if library.is_absolute() {
            return library.to_path_buf();
        }
        match config_path.parent() {
            Some(dir) => dir.join(library),
            None => library.to_path_buf(),
        }
    }

    /// The flat settings record automation runs on.
    pub fn automation_settings(&self) -> Result<AutomationSettings> {
        let brightest_time = NaiveTime::parse_from_str(&self.brightest_time, TIME_FORMAT)
            .context("Invalid brightest_time format")?;
        let darkest_time = NaiveTime::parse_from_str(&self.darkest_time, TIME_FORMAT)
            .context("Invalid darkest_time format")?;

        Ok(AutomationSettings {
            update_interval_hours: self
                .update_interval_hours
                .unwrap_or(DEFAULT_UPDATE_INTERVAL_HOURS),
            update_interval_mins: self
                .update_interval_mins
                .unwrap_or(DEFAULT_UPDATE_INTERVAL_MINS),
            brightest_time,
            darkest_time,
            wallpaper_style: self.wallpaper_style.unwrap_or(DEFAULT_WALLPAPER_STYLE),
            starts_on_startup: self.starts_on_startup.unwrap_or(DEFAULT_STARTS_ON_STARTUP),
        })
    }

    /// Write `settings` back into the config file at `path`.
    ///
    /// Existing lines are updated in place with their trailing comments kept;
    /// keys missing from the file are appended.
    pub fn save_settings(path: &Path, settings: &AutomationSettings) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let values = [
            (
                "brightest_time",
                format!("\"{}\"", settings.brightest_time.format(TIME_FORMAT)),
            ),
            (
                "darkest_time",
                format!("\"{}\"", settings.darkest_time.format(TIME_FORMAT)),
            ),
            (
                "update_interval_hours",
                settings.update_interval_hours.to_string(),
            ),
            (
                "update_interval_mins",
                settings.update_interval_mins.to_string(),
            ),
            (
                "wallpaper_style",
                format!("\"{}\"", settings.wallpaper_style.as_str()),
            ),
            ("starts_on_startup", settings.starts_on_startup.to_string()),
        ];

        let mut updated_content = content.clone();
        for (key, value) in &values {
            if let Some(line) = find_config_line(&content, key) {
                let new_line = preserve_comment_formatting(&line, key, value);
                updated_content = updated_content.replace(&line, &new_line);
            } else {
                if !updated_content.is_empty() && !updated_content.ends_with('\n') {
                    updated_content.push('\n');
                }
                updated_content.push_str(&format!("{} = {}\n", key, value));
            }
        }

        if updated_content != content {
            fs::write(path, updated_content).with_context(|| {
                format!("Failed to write updated config to {}", path.display())
            })?;
        }

        Ok(())
    }

    pub fn log_config(&self, config_path: &Path) {
        Log::log_block_start(&format!(
            "Loaded configuration from {}",
            path_for_display(config_path)
        ));

        Log::log_indented(&format!(
            "Backend: {}",
            self.backend.as_ref().unwrap_or(&DEFAULT_BACKEND).as_str()
        ));
        if let Some(command) = &self.wallpaper_command {
            Log::log_indented(&format!("Wallpaper command: {}", command));
        }
        Log::log_indented(&format!("Brightest time: {}", self.brightest_time));
        Log::log_indented(&format!("Darkest time: {}", self.darkest_time));
        Log::log_indented(&format!(
            "Update interval: {} hr {} min",
            self.update_interval_hours
                .unwrap_or(DEFAULT_UPDATE_INTERVAL_HOURS),
            self.update_interval_mins
                .unwrap_or(DEFAULT_UPDATE_INTERVAL_MINS)
        ));
        Log::log_indented(&format!(
            "Wallpaper style: {}",
            self.wallpaper_style.unwrap_or(DEFAULT_WALLPAPER_STYLE)
        ));
        Log::log_indented(&format!(
            "Start on login: {}",
            self.starts_on_startup.unwrap_or(DEFAULT_STARTS_ON_STARTUP)
        ));
        Log::log_indented(&format!(
            "Library: {}",
            path_for_display(&self.library_path(config_path))
        ));
    }
}

/// Configuration checks that span several fields.
pub fn validate_config(config: &Config) -> Result<()> {
    let backend = config.backend.as_ref().unwrap_or(&DEFAULT_BACKEND);

    // Only validate explicit backend choices, Auto will be resolved at runtime
    if *backend == Backend::Command && config.wallpaper_command.is_none() {
        anyhow::bail!(
            "Incompatible configuration: backend=\"command\" requires wallpaper_command. \
            Set wallpaper_command, for example wallpaper_command = \"swww img {{path}}\"."
        );
    }

    if let Some(template) = &config.wallpaper_command {
        CommandBackend::new(template).context("Invalid wallpaper_command")?;
    }

    let brightest = NaiveTime::parse_from_str(&config.brightest_time, TIME_FORMAT)
        .context("Invalid brightest_time format")?;
    let darkest = NaiveTime::parse_from_str(&config.darkest_time, TIME_FORMAT)
        .context("Invalid darkest_time format")?;

    let hours = config
        .update_interval_hours
        .unwrap_or(DEFAULT_UPDATE_INTERVAL_HOURS);
    let mins = config
        .update_interval_mins
        .unwrap_or(DEFAULT_UPDATE_INTERVAL_MINS);

    if hours > MAXIMUM_UPDATE_INTERVAL_HOURS || mins > MAXIMUM_UPDATE_INTERVAL_MINS {
        anyhow::bail!(
            "Update interval ({}h {}m) must be within 0-{} hours and 0-{} minutes",
            hours,
            mins,
            MAXIMUM_UPDATE_INTERVAL_HOURS,
            MAXIMUM_UPDATE_INTERVAL_MINS
        );
    }

    if i64::from(hours * 60 + mins) < MINIMUM_CHECK_INTERVAL_MINS {
        anyhow::bail!(
            "Update interval must be at least {} minute",
            MINIMUM_CHECK_INTERVAL_MINS
        );
    }

    if config.library.as_deref().is_some_and(|l| l.trim().is_empty()) {
        anyhow::bail!("library must name a file");
    }

    if brightest == darkest {
        Log::log_warning(&format!(
            "brightest_time and darkest_time are both {}. {}.",
            config.brightest_time, WILL_NOT_CHANGE_MESSAGE
        ));
    }

    Ok(())
}

/// Builder for creating dynamically-aligned configuration files.
///
/// This builder maintains proper comment alignment by calculating the maximum
/// width of all setting lines and applying consistent padding.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

#[derive(Clone)]
struct ConfigEntry {
    content: String,
    entry_type: EntryType,
}

#[derive(Clone)]
enum EntryType {
    Section,
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry {
            content: format!("#[{}]", title),
            entry_type: EntryType::Section,
        });
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        let line = format!("{} = {}", key, value);
        self.entries.push(ConfigEntry {
            content: line.clone(),
            entry_type: EntryType::Setting {
                line,
                comment: format!("# {}", comment),
            },
        });
        self
    }

    /// A setting that is written commented out, as an example.
    fn add_commented_setting(self, key: &str, value: &str, comment: &str) -> Self {
        self.add_setting(&format!("# {}", key), value, comment)
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.entry_type {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section => None,
            })
            .max()
            .unwrap_or(0)
            + 1; // +1 for one space between setting and comment

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry.entry_type {
                EntryType::Section => {
                    if !first_section {
                        result.push(String::new()); // Empty line before new section
                    }
                    result.push(entry.content);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        let mut content = result.join("\n");
        content.push('\n');
        content
    }
}

/// Find the active (uncommented) line assigning `key`.
fn find_config_line(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with('#')
                && trimmed
                    .split_once('=')
                    .is_some_and(|(name, _)| name.trim() == key)
        })
        .map(str::to_string)
}

/// Preserve the comment formatting when updating a config line value
fn preserve_comment_formatting(original_line: &str, key: &str, new_value: &str) -> String {
    let key_value_part = format!("{} = {}", key, new_value);

    // A '#' inside a quoted value is not a comment
    let comment_pos = original_line.split_once('=').and_then(|(name, value)| {
        let mut in_quotes = false;
        value.char_indices().find_map(|(i, c)| match c {
            '"' => {
                in_quotes = !in_quotes;
                None
            }
            '#' if !in_quotes => Some(name.len() + 1 + i),
            _ => None,
        })
    });

    if let Some(comment_pos) = comment_pos {
        let comment_part = &original_line[comment_pos..];

        // Keep the comment in the column it was in
        let padding_needed = if key_value_part.len() < comment_pos {
            comment_pos - key_value_part.len()
        } else {
            1 // At least one space
        };

        format!(
            "{}{}{}",
            key_value_part,
            " ".repeat(padding_needed),
            comment_part
        )
    } else {
        key_value_part
    }
}

//! Implementation of the --preview command.
//!
//! Shows which wallpaper automation would pick at a given time of day, and
//! when that pick would next change, without touching the desktop or the
//! library file.

use anyhow::Result;
use chrono::{Local, NaiveDateTime, NaiveTime};

use crate::automation::AutomationSettings;
use crate::config::Config;
use crate::constants::WILL_NOT_CHANGE_MESSAGE;
use crate::library::{Library, LibraryImage};
use crate::logger::Log;
use crate::scheduler::find_next_change_time;
use crate::selector::select_closest;

/// What automation would do at a given instant.
#[derive(Debug, PartialEq)]
pub struct Preview<'a> {
    pub daylight: f64,
    pub image: Option<&'a LibraryImage>,
    pub next_change: Option<NaiveDateTime>,
}

/// Evaluate the daylight curve and selection at `at` as if that image were on the desktop.
pub fn preview<'a>(
    settings: &AutomationSettings,
    library: &'a Library,
    at: NaiveDateTime,
) -> Preview<'a> {
    let anchors = settings.anchors();
    let daylight = anchors.daylight_at(at);
    let image = select_closest(daylight, library.images());
    let next_change = find_next_change_time(
        at,
        settings.check_interval(),
        anchors,
        image,
        library.images(),
    );

    Preview {
        daylight,
        image,
        next_change,
    }
}

/// Handle the --preview command.
pub fn handle_preview_command(time: NaiveTime) -> Result<()> {
    Log::log_version();

    let config_path = Config::get_config_path()?;
    let config = Config::load()?;
    let library = Library::load_from_path(&config.library_path(&config_path))?;
    let settings = config.automation_settings()?;

    let at = Local::now().date_naive().and_time(time);
    let result = preview(&settings, &library, at);

    Log::log_block_start(&format!("Preview for {}", time.format("%H:%M:%S")));
    Log::log_indented(&format!("Daylight value: {:.3}", result.daylight));
    match result.image {
        Some(image) => Log::log_indented(&format!(
            "Selected: {} (brightness {:.2})",
            image.file_name(),
            image.brightness
        )),
        None if library.is_empty() => Log::log_indented("Library is empty"),
        None => Log::log_indented("All library images are disabled"),
    }
    match result.next_change {
        Some(next) => Log::log_indented(&format!(
            "Selection changes next at {}",
            next.format("%H:%M:%S")
        )),
        None => Log::log_indented(WILL_NOT_CHANGE_MESSAGE),
    }
    Log::log_end();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn hourly() -> AutomationSettings {
        AutomationSettings {
            update_interval_hours: 1,
            update_interval_mins: 0,
            ..AutomationSettings::default()
        }
    }

    #[test]
    fn test_preview_selects_and_predicts() {
        let library = Library::from_images(vec![
            LibraryImage::new("/walls/bright.png", 0.9).unwrap(),
            LibraryImage::new("/walls/dark.png", 0.1).unwrap(),
        ]);

        let result = preview(&hourly(), &library, at(13, 0));
        assert_eq!(result.daylight, 1.0);
        assert_eq!(result.image.unwrap().file_name(), "bright.png");
        assert_eq!(result.next_change, Some(at(19, 0)));

        let night = preview(&hourly(), &library, at(23, 0));
        assert_eq!(night.daylight, 0.0);
        assert_eq!(night.image.unwrap().file_name(), "dark.png");
    }

    #[test]
    fn test_preview_of_empty_library() {
        let library = Library::new();
        let result = preview(&hourly(), &library, at(8, 0));
        assert!(result.image.is_none());
        assert!(result.next_change.is_none());
    }
}

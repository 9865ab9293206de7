//! Automation state and the wallpaper update cycle.
//!
//! `AutomationController` owns the user's automation settings and the
//! mutable `AutomationState`. Each call to `check_and_update` is one complete
//! evaluation: work out today's daylight value, apply the closest image if it
//! differs from the current wallpaper, then predict when the wallpaper will
//! next change so the caller can sleep until exactly that instant.
//!
//! The controller never reads the clock or touches the library file itself;
//! `now` and a library snapshot are passed into every call, and the outcome is
//! returned as an `Evaluation` for the caller to act on.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backend::{WallpaperBackend, WallpaperStyle};
use crate::constants::{
    DEFAULT_STARTS_ON_STARTUP, DEFAULT_UPDATE_INTERVAL_HOURS, DEFAULT_UPDATE_INTERVAL_MINS,
    DEFAULT_WALLPAPER_STYLE, MINIMUM_CHECK_INTERVAL_MINS, WILL_NOT_CHANGE_MESSAGE,
};
use crate::daylight::Anchors;
use crate::library::{Library, LibraryImage};
use crate::logger::Log;
use crate::scheduler::find_next_change_time;
use crate::selector::select_closest;

/// Flat, serializable record of everything the user configures for automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationSettings {
    pub update_interval_hours: u32,
    pub update_interval_mins: u32,
    pub brightest_time: NaiveTime,
    pub darkest_time: NaiveTime,
    pub wallpaper_style: WallpaperStyle,
    pub starts_on_startup: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            update_interval_hours: DEFAULT_UPDATE_INTERVAL_HOURS,
            update_interval_mins: DEFAULT_UPDATE_INTERVAL_MINS,
            brightest_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or(NaiveTime::MIN),
            darkest_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN),
            wallpaper_style: DEFAULT_WALLPAPER_STYLE,
            starts_on_startup: DEFAULT_STARTS_ON_STARTUP,
        }
    }
}

impl AutomationSettings {
    /// Bump a 0h 0m interval to 0h 1m.
    pub fn normalized(mut self) -> Self {
        if self.update_interval_hours == 0 && self.update_interval_mins == 0 {
            self.update_interval_mins = MINIMUM_CHECK_INTERVAL_MINS as u32;
        }
        self
    }

    /// Combined interval, never shorter than one minute.
    pub fn check_interval(&self) -> Duration {
        let interval = Duration::hours(i64::from(self.update_interval_hours))
            + Duration::minutes(i64::from(self.update_interval_mins));
        interval.max(Duration::minutes(MINIMUM_CHECK_INTERVAL_MINS))
    }

    pub fn anchors(&self) -> Anchors {
        Anchors::new(self.brightest_time, self.darkest_time)
    }
}

/// Values that change as automation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationState {
    pub check_interval: Duration,
    /// Last wallpaper change, or when automation (re)started searching.
    pub last_update_time: NaiveDateTime,
    /// `None` means the wallpaper will not change under current settings.
    pub next_update_time: Option<NaiveDateTime>,
    pub current_image: Option<LibraryImage>,
}

/// Whether a future re-evaluation is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Nothing will change until settings or the library do.
    Idle,
    /// The selection changes at this instant.
    Scheduled(NaiveDateTime),
}

/// Outcome of one evaluation.
#[derive(Debug)]
pub struct Evaluation {
    /// Daylight value at the evaluation time.
    pub daylight: f64,
    /// Image handed to the backend successfully during this evaluation.
    pub applied: Option<PathBuf>,
    /// Failure reported by the backend, if it was called and failed.
    pub backend_error: Option<anyhow::Error>,
    pub schedule: Schedule,
}

impl Evaluation {
    pub fn changed(&self) -> bool {
        self.applied.is_some()
    }
}

/// Countdown to the next change, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub message: String,
    /// Elapsed share of the time between the last and the next change, in [0, 1].
    pub fraction: f64,
}

impl ProgressReport {
    /// Render the fraction as a fixed-width text bar.
    pub fn bar(&self, width: usize) -> String {
        let filled = ((self.fraction * width as f64).round() as usize).min(width);
        format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
    }
}

pub struct AutomationController {
    settings: AutomationSettings,
    state: AutomationState,
}

impl AutomationController {
    /// Start automation at `now` with no wallpaper applied yet.
    pub fn new(settings: AutomationSettings, now: NaiveDateTime) -> Self {
        let settings = settings.normalized();
        let state = AutomationState {
            check_interval: settings.check_interval(),
            last_update_time: now,
            next_update_time: None,
            current_image: None,
        };
        Self { settings, state }
    }

    pub fn settings(&self) -> &AutomationSettings {
        &self.settings
    }

    pub fn state(&self) -> &AutomationState {
        &self.state
    }

    pub fn schedule(&self) -> Schedule {
        match self.state.next_update_time {
            Some(next) => Schedule::Scheduled(next),
            None => Schedule::Idle,
        }
    }

    pub fn current_daylight(&self, now: NaiveDateTime) -> f64 {
        self.settings.anchors().daylight_at(now)
    }

    /// Run one evaluation: apply the best image for `now` and re-arm the schedule.
    ///
    /// Safe to call at any time and as often as needed; with unchanged inputs
    /// it leaves the wallpaper alone and produces the same schedule.
    pub fn check_and_update(
        &mut self,
        now: NaiveDateTime,
        library: &Library,
        backend: &mut dyn WallpaperBackend,
    ) -> Evaluation {
        let daylight = self.current_daylight(now);
        let mut applied = None;
        let mut backend_error = None;

        if let Some(candidate) = select_closest(daylight, library.images()) {
            if !self.is_current(candidate) {
                match self.apply(candidate, now, backend) {
                    Ok(()) => {
                        Log::log_block_start(&format!(
                            "Wallpaper changed to {} (brightness {:.2}, daylight {:.2})",
                            candidate.file_name(),
                            candidate.brightness,
                            daylight
                        ));
                        applied = Some(candidate.path.clone());
                    }
                    Err(e) => {
                        Log::log_warning(&format!(
                            "Failed to set wallpaper {}: {}",
                            candidate.file_name(),
                            e
                        ));
                        Log::log_decorated("Will retry on next check...");
                        // Search from the failed attempt so the retry lands one interval later
                        self.state.last_update_time = now;
                        backend_error = Some(e);
                    }
                }
            }
        } else if library.is_empty() {
            Log::log_debug("Library is empty, nothing to select");
        } else {
            Log::log_debug("All library images are disabled, nothing to select");
        }

        let schedule = self.reschedule(now, library);

        Evaluation {
            daylight,
            applied,
            backend_error,
            schedule,
        }
    }

    /// Replace the settings and re-evaluate.
    ///
    /// When the wallpaper style changed but the image did not, the current
    /// image is applied again so the new style takes effect.
    pub fn apply_settings(
        &mut self,
        settings: AutomationSettings,
        now: NaiveDateTime,
        library: &Library,
        backend: &mut dyn WallpaperBackend,
    ) -> Evaluation {
        let settings = settings.normalized();
        let style_changed = settings.wallpaper_style != self.settings.wallpaper_style;
        self.state.check_interval = settings.check_interval();
        self.settings = settings;

        let mut evaluation = self.check_and_update(now, library, backend);

        if style_changed && !evaluation.changed() {
            if let Some(current) = &self.state.current_image {
                Log::log_decorated(&format!(
                    "Re-applying {} with {} style",
                    current.file_name(),
                    self.settings.wallpaper_style
                ));
                if let Err(e) = backend.set_wallpaper(&current.path, self.settings.wallpaper_style)
                {
                    Log::log_warning(&format!("Failed to apply wallpaper style: {}", e));
                    evaluation.backend_error = Some(e);
                }
            }
        }

        evaluation
    }

    /// Put a specific image on the desktop right away.
    ///
    /// Automation carries on from there: the schedule is recomputed against
    /// this image, so the next checkpoint whose selection differs will
    /// replace it.
    pub fn set_current_image(
        &mut self,
        image: &LibraryImage,
        now: NaiveDateTime,
        library: &Library,
        backend: &mut dyn WallpaperBackend,
    ) -> Evaluation {
        let daylight = self.current_daylight(now);
        let (applied, backend_error) = match self.apply(image, now, backend) {
            Ok(()) => {
                Log::log_block_start(&format!("Wallpaper set to {}", image.file_name()));
                (Some(image.path.clone()), None)
            }
            Err(e) => {
                Log::log_warning(&format!("Failed to set wallpaper {}: {}", image.file_name(), e));
                (None, Some(e))
            }
        };

        let schedule = self.reschedule(now, library);
        Evaluation {
            daylight,
            applied,
            backend_error,
            schedule,
        }
    }

    /// Elapsed share and remaining time until the next scheduled change.
    pub fn progress(&self, now: NaiveDateTime) -> ProgressReport {
        let Some(next) = self.state.next_update_time else {
            return ProgressReport {
                message: WILL_NOT_CHANGE_MESSAGE.to_string(),
                fraction: 0.0,
            };
        };

        let total = next - self.state.last_update_time;
        let elapsed = (now - self.state.last_update_time).clamp(Duration::zero(), total.max(Duration::zero()));
        let remaining = total - elapsed;

        let fraction = if total > Duration::zero() {
            (elapsed.num_milliseconds() as f64 / total.num_milliseconds() as f64).clamp(0.0, 1.0)
        } else {
            1.0
        };

        ProgressReport {
            message: format!(
                "{} hr {} min {} sec before next wallpaper change",
                remaining.num_hours(),
                remaining.num_minutes() % 60,
                remaining.num_seconds() % 60
            ),
            fraction,
        }
    }

    fn is_current(&self, image: &LibraryImage) -> bool {
        self.state
            .current_image
            .as_ref()
            .is_some_and(|current| current.is_same_image(image))
    }

    fn apply(
        &mut self,
        image: &LibraryImage,
        now: NaiveDateTime,
        backend: &mut dyn WallpaperBackend,
    ) -> anyhow::Result<()> {
        backend.set_wallpaper(&image.path, self.settings.wallpaper_style)?;
        self.state.current_image = Some(image.clone());
        self.state.last_update_time = now;
        Ok(())
    }

    fn find_next(&self, library: &Library) -> Option<NaiveDateTime> {
        find_next_change_time(
            self.state.last_update_time,
            self.state.check_interval,
            self.settings.anchors(),
            self.state.current_image.as_ref(),
            library.images(),
        )
    }

    fn reschedule(&mut self, now: NaiveDateTime, library: &Library) -> Schedule {
        let next = match self.find_next(library) {
            // The base is stale (e.g. the library changed since the last
            // change); search forward from now instead.
            Some(next) if next <= now => {
                self.state.last_update_time = now;
                self.find_next(library)
            }
            other => other,
        };

        self.state.next_update_time = next;
        match next {
            Some(next) => {
                Log::log_debug(&format!("Next wallpaper change at {}", next));
                Schedule::Scheduled(next)
            }
            None => {
                // Resume searching from whenever automation is next evaluated
                self.state.last_update_time = now;
                Log::log_decorated(WILL_NOT_CHANGE_MESSAGE);
                Schedule::Idle
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockWallpaperBackend;
    use chrono::NaiveDate;
    use std::path::Path;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn hourly_settings() -> AutomationSettings {
        AutomationSettings {
            update_interval_hours: 1,
            update_interval_mins: 0,
            ..AutomationSettings::default()
        }
    }

    fn two_image_library() -> Library {
        Library::from_images(vec![
            LibraryImage::new("/walls/bright.png", 0.9).unwrap(),
            LibraryImage::new("/walls/dark.png", 0.1).unwrap(),
        ])
    }

    fn accepting_backend() -> MockWallpaperBackend {
        let mut backend = MockWallpaperBackend::new();
        backend.expect_set_wallpaper().returning(|_, _| Ok(()));
        backend.expect_backend_name().return_const("Mock");
        backend
    }

    #[test]
    fn test_zero_interval_is_bumped_to_one_minute() {
        let settings = AutomationSettings {
            update_interval_hours: 0,
            update_interval_mins: 0,
            ..AutomationSettings::default()
        }
        .normalized();
        assert_eq!(settings.update_interval_mins, 1);
        assert_eq!(settings.check_interval(), Duration::minutes(1));

        let combined = AutomationSettings {
            update_interval_hours: 2,
            update_interval_mins: 30,
            ..AutomationSettings::default()
        };
        assert_eq!(combined.check_interval(), Duration::minutes(150));
    }

    #[test]
    fn test_first_evaluation_applies_and_schedules() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = MockWallpaperBackend::new();
        backend
            .expect_set_wallpaper()
            .withf(|path, style| path == Path::new("/walls/bright.png") && *style == WallpaperStyle::Fill)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        let evaluation = controller.check_and_update(at(1, 13, 0), &library, &mut backend);

        assert_eq!(evaluation.daylight, 1.0);
        assert_eq!(evaluation.applied.as_deref(), Some(Path::new("/walls/bright.png")));
        assert_eq!(evaluation.schedule, Schedule::Scheduled(at(1, 19, 0)));
        assert_eq!(controller.state().last_update_time, at(1, 13, 0));
        assert_eq!(controller.schedule(), evaluation.schedule);
    }

    #[test]
    fn test_repeated_evaluation_is_idempotent() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = MockWallpaperBackend::new();
        backend.expect_set_wallpaper().times(1).returning(|_, _| Ok(()));

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        let first = controller.check_and_update(at(1, 13, 0), &library, &mut backend);
        let second = controller.check_and_update(at(1, 13, 0), &library, &mut backend);
        let third = controller.check_and_update(at(1, 14, 30), &library, &mut backend);

        assert!(first.changed());
        assert!(!second.changed());
        assert!(!third.changed());
        assert_eq!(first.schedule, second.schedule);
        assert_eq!(second.schedule, third.schedule);
    }

    #[test]
    fn test_timer_fire_switches_image() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = accepting_backend();

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        controller.check_and_update(at(1, 13, 0), &library, &mut backend);

        let fired = controller.check_and_update(at(1, 19, 0), &library, &mut backend);
        assert_eq!(fired.applied.as_deref(), Some(Path::new("/walls/dark.png")));
        assert_eq!(controller.state().last_update_time, at(1, 19, 0));
        // Back to the bright image in the morning
        assert_eq!(fired.schedule, Schedule::Scheduled(at(2, 7, 0)));
    }

    #[test]
    fn test_empty_library_is_idle_without_backend_calls() {
        Log::set_enabled(false);
        let mut backend = MockWallpaperBackend::new();
        backend.expect_set_wallpaper().never();

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        let evaluation = controller.check_and_update(at(1, 13, 0), &Library::new(), &mut backend);

        assert!(!evaluation.changed());
        assert!(evaluation.backend_error.is_none());
        assert_eq!(evaluation.schedule, Schedule::Idle);
        assert_eq!(controller.progress(at(1, 13, 0)).message, WILL_NOT_CHANGE_MESSAGE);
    }

    #[test]
    fn test_single_image_applies_then_idles() {
        Log::set_enabled(false);
        let library = Library::from_images(vec![LibraryImage::new("/walls/only.png", 0.5).unwrap()]);
        let mut backend = accepting_backend();

        let mut controller = AutomationController::new(hourly_settings(), at(1, 9, 0));
        let evaluation = controller.check_and_update(at(1, 9, 0), &library, &mut backend);

        assert!(evaluation.changed());
        assert_eq!(evaluation.schedule, Schedule::Idle);
        assert!(controller.state().next_update_time.is_none());
    }

    #[test]
    fn test_backend_failure_still_schedules_retry() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = MockWallpaperBackend::new();
        backend
            .expect_set_wallpaper()
            .returning(|_, _| Err(anyhow::anyhow!("desktop unavailable")));

        let mut controller = AutomationController::new(hourly_settings(), at(1, 10, 0));
        let evaluation = controller.check_and_update(at(1, 13, 0), &library, &mut backend);

        assert!(!evaluation.changed());
        assert!(evaluation.backend_error.is_some());
        assert!(controller.state().current_image.is_none());
        // Nothing is on the desktop yet, so the very next checkpoint differs
        assert_eq!(evaluation.schedule, Schedule::Scheduled(at(1, 14, 0)));
    }

    #[test]
    fn test_settings_change_reevaluates() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = accepting_backend();

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        controller.check_and_update(at(1, 13, 0), &library, &mut backend);

        // Swap the anchors: 13:00 becomes the darkest time
        let swapped = AutomationSettings {
            brightest_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            darkest_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            ..hourly_settings()
        };
        let evaluation = controller.apply_settings(swapped, at(1, 13, 0), &library, &mut backend);
        assert_eq!(evaluation.daylight, 0.0);
        assert_eq!(evaluation.applied.as_deref(), Some(Path::new("/walls/dark.png")));
    }

    #[test]
    fn test_degenerate_anchors_go_idle_and_recover() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = accepting_backend();

        let flat = AutomationSettings {
            brightest_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            darkest_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            ..hourly_settings()
        };
        let mut controller = AutomationController::new(flat, at(1, 12, 0));
        let evaluation = controller.check_and_update(at(1, 12, 0), &library, &mut backend);
        assert_eq!(evaluation.daylight, 0.0);
        assert_eq!(evaluation.schedule, Schedule::Idle);

        // Two days later the user fixes the anchors; the search starts from now
        let evaluation = controller.apply_settings(hourly_settings(), at(3, 20, 0), &library, &mut backend);
        assert!(!evaluation.changed());
        assert_eq!(evaluation.schedule, Schedule::Scheduled(at(4, 7, 0)));
    }

    #[test]
    fn test_style_change_reapplies_current_image() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = MockWallpaperBackend::new();
        let mut sequence = mockall::Sequence::new();
        backend
            .expect_set_wallpaper()
            .withf(|_, style| *style == WallpaperStyle::Fill)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));
        backend
            .expect_set_wallpaper()
            .withf(|path, style| path == Path::new("/walls/bright.png") && *style == WallpaperStyle::Tiled)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        controller.check_and_update(at(1, 13, 0), &library, &mut backend);

        let tiled = AutomationSettings {
            wallpaper_style: WallpaperStyle::Tiled,
            ..hourly_settings()
        };
        let evaluation = controller.apply_settings(tiled, at(1, 13, 5), &library, &mut backend);
        assert!(!evaluation.changed());
        assert!(evaluation.backend_error.is_none());
        // Re-applying the style does not move the schedule base
        assert_eq!(controller.state().last_update_time, at(1, 13, 0));
    }

    #[test]
    fn test_disabling_current_image_switches_away() {
        Log::set_enabled(false);
        let mut library = Library::from_images(vec![
            LibraryImage::new("/walls/bright.png", 0.9).unwrap(),
            LibraryImage::new("/walls/mid.png", 0.6).unwrap(),
            LibraryImage::new("/walls/dark.png", 0.1).unwrap(),
        ]);
        let mut backend = accepting_backend();

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        controller.check_and_update(at(1, 13, 0), &library, &mut backend);

        library.set_enabled(Path::new("/walls/bright.png"), false);
        let evaluation = controller.check_and_update(at(1, 13, 10), &library, &mut backend);
        assert_eq!(evaluation.applied.as_deref(), Some(Path::new("/walls/mid.png")));
    }

    #[test]
    fn test_manual_set_is_replaced_at_next_checkpoint() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = accepting_backend();

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        let dark = library.images()[1].clone();
        let evaluation = controller.set_current_image(&dark, at(1, 13, 0), &library, &mut backend);

        assert_eq!(evaluation.applied.as_deref(), Some(Path::new("/walls/dark.png")));
        assert_eq!(evaluation.schedule, Schedule::Scheduled(at(1, 14, 0)));
    }

    #[test]
    fn test_manually_set_closest_image_is_not_reapplied() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = MockWallpaperBackend::new();
        backend
            .expect_set_wallpaper()
            .times(1)
            .returning(|_, _| Ok(()));

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        let bright = library.images()[0].clone();
        controller.set_current_image(&bright, at(1, 13, 0), &library, &mut backend);

        let evaluation = controller.check_and_update(at(1, 13, 5), &library, &mut backend);
        assert!(!evaluation.changed());
        assert_eq!(evaluation.schedule, Schedule::Scheduled(at(1, 19, 0)));
    }

    #[test]
    fn test_progress_report() {
        Log::set_enabled(false);
        let library = two_image_library();
        let mut backend = accepting_backend();

        let mut controller = AutomationController::new(hourly_settings(), at(1, 13, 0));
        controller.check_and_update(at(1, 13, 0), &library, &mut backend);

        // 13:00 → 19:00, halfway at 16:00
        let halfway = controller.progress(at(1, 16, 0));
        assert!((halfway.fraction - 0.5).abs() < 1e-9);
        assert_eq!(halfway.message, "3 hr 0 min 0 sec before next wallpaper change");

        let later = controller.progress(
            at(1, 17, 44) + Duration::seconds(30),
        );
        assert_eq!(later.message, "1 hr 15 min 30 sec before next wallpaper change");

        let overdue = controller.progress(at(1, 20, 0));
        assert_eq!(overdue.fraction, 1.0);
        assert_eq!(overdue.message, "0 hr 0 min 0 sec before next wallpaper change");
    }

    #[test]
    fn test_progress_bar_rendering() {
        let report = ProgressReport {
            message: String::new(),
            fraction: 0.5,
        };
        assert_eq!(report.bar(4), "[██░░]");

        let full = ProgressReport {
            message: String::new(),
            fraction: 1.0,
        };
        assert_eq!(full.bar(3), "[███]");
    }
}

//! Prediction of the next wallpaper change.
//!
//! Rather than polling, automation walks forward from the last change in
//! steps of the check interval, re-running the daylight curve and the image
//! selection at each step, and stops at the first step whose selection
//! differs from the current wallpaper. The walk covers at most one day: if the
//! selection does not change within 24 hours it never will, since the curve
//! repeats daily.

use chrono::{Duration, NaiveDateTime};

use crate::constants::MINIMUM_CHECK_INTERVAL_MINS;
use crate::daylight::Anchors;
use crate::library::LibraryImage;
use crate::selector::select_closest;

/// The simulated instants at which automation would re-check the wallpaper.
///
/// Starts one interval after `start` and ends once a full day has been
/// covered, i.e. after the last step that falls on the following date at or
/// before `start`'s time of day.
#[derive(Debug, Clone)]
pub struct Checkpoints {
    start: NaiveDateTime,
    interval: Duration,
    next: Option<NaiveDateTime>,
}

impl Checkpoints {
    pub fn new(start: NaiveDateTime, interval: Duration) -> Self {
        let next = if interval >= Duration::minutes(MINIMUM_CHECK_INTERVAL_MINS) {
            start.checked_add_signed(interval)
        } else {
            None
        };
        Self {
            start,
            interval,
            next,
        }
    }

    fn within_horizon(&self, checkpoint: NaiveDateTime) -> bool {
        let start_date = self.start.date();
        checkpoint.date() == start_date
            || (start_date.succ_opt() == Some(checkpoint.date())
                && checkpoint.time() <= self.start.time())
    }
}

impl Iterator for Checkpoints {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let checkpoint = self.next.filter(|cp| self.within_horizon(*cp))?;
        self.next = checkpoint.checked_add_signed(self.interval);
        Some(checkpoint)
    }
}

/// Find the first checkpoint at which the selected image differs from `current_image`.
///
/// # Arguments
/// * `last_update_time` - When the wallpaper last changed (or automation started)
/// * `check_interval` - Step between checkpoints; anything under a minute yields `None`
/// * `anchors` - Brightest/darkest times of the daylight curve
/// * `current_image` - The wallpaper currently applied, if any
/// * `images` - The library to select from
///
/// # Returns
/// The checkpoint of the next change, or `None` when the wallpaper will not
/// change under these settings (fewer than two enabled images, or no change
/// within a day).
pub fn find_next_change_time(
    last_update_time: NaiveDateTime,
    check_interval: Duration,
    anchors: Anchors,
    current_image: Option<&LibraryImage>,
    images: &[LibraryImage],
) -> Option<NaiveDateTime> {
    if images.iter().filter(|image| image.enabled).count() < 2 {
        return None;
    }

    let current_path = current_image.map(|image| &image.path);
    Checkpoints::new(last_update_time, check_interval).find(|checkpoint| {
        let candidate = select_closest(anchors.daylight_at(*checkpoint), images);
        candidate.map(|image| &image.path) != current_path
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daylight::TimeOfDayMinutes;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn anchors(brightest: (u32, u32), darkest: (u32, u32)) -> Anchors {
        Anchors::new(
            TimeOfDayMinutes::from_hm(brightest.0, brightest.1).unwrap(),
            TimeOfDayMinutes::from_hm(darkest.0, darkest.1).unwrap(),
        )
    }

    fn two_images() -> Vec<LibraryImage> {
        vec![
            LibraryImage::new("bright.png", 0.9).unwrap(),
            LibraryImage::new("dark.png", 0.1).unwrap(),
        ]
    }

    #[test]
    fn test_checkpoints_cover_one_day() {
        let checkpoints: Vec<_> = Checkpoints::new(at(10, 13, 0), Duration::hours(1)).collect();
        assert_eq!(checkpoints.first(), Some(&at(10, 14, 0)));
        assert_eq!(checkpoints.last(), Some(&at(11, 13, 0)));
        assert_eq!(checkpoints.len(), 24);
    }

    #[test]
    fn test_checkpoints_stop_past_start_time_next_day() {
        // 7 hour steps from 20:00 → 03:00, 10:00, 17:00; 00:00 the day after is out
        let checkpoints: Vec<_> = Checkpoints::new(at(10, 20, 0), Duration::hours(7)).collect();
        assert_eq!(checkpoints, vec![at(11, 3, 0), at(11, 10, 0), at(11, 17, 0)]);
    }

    #[test]
    fn test_checkpoints_reject_sub_minute_interval() {
        assert_eq!(Checkpoints::new(at(10, 0, 0), Duration::zero()).count(), 0);
        assert_eq!(Checkpoints::new(at(10, 0, 0), Duration::seconds(30)).count(), 0);
        assert_eq!(Checkpoints::new(at(10, 0, 0), Duration::seconds(-60)).count(), 0);
    }

    #[test]
    fn test_fewer_than_two_enabled_images_never_changes() {
        let single = vec![LibraryImage::new("only.png", 0.5).unwrap()];
        assert!(
            find_next_change_time(at(10, 13, 0), Duration::hours(1), anchors((13, 0), (23, 0)), None, &single)
                .is_none()
        );

        let one_enabled = vec![
            LibraryImage::new("on.png", 0.9).unwrap(),
            LibraryImage::new("off.png", 0.1).unwrap().disabled(),
        ];
        assert!(
            find_next_change_time(
                at(10, 13, 0),
                Duration::hours(1),
                anchors((13, 0), (23, 0)),
                Some(&one_enabled[0]),
                &one_enabled
            )
            .is_none()
        );
    }

    #[test]
    fn test_finds_first_differing_checkpoint() {
        let images = two_images();
        // At 13:00 bright is shown; daylight drops below 0.5 after 18:00
        let next = find_next_change_time(
            at(10, 13, 0),
            Duration::hours(1),
            anchors((13, 0), (23, 0)),
            Some(&images[0]),
            &images,
        );
        assert_eq!(next, Some(at(10, 19, 0)));
    }

    #[test]
    fn test_change_found_after_midnight() {
        let images = two_images();
        // Dark image at 23:00; daylight climbs back over 0.5 in the morning
        let next = find_next_change_time(
            at(10, 23, 0),
            Duration::hours(1),
            anchors((13, 0), (23, 0)),
            Some(&images[1]),
            &images,
        )
        .unwrap();
        assert_eq!(next.date(), at(11, 0, 0).date());
        assert_eq!(next, at(11, 7, 0));
    }

    #[test]
    fn test_no_current_image_changes_at_first_checkpoint() {
        let images = two_images();
        let next = find_next_change_time(
            at(10, 9, 30),
            Duration::minutes(15),
            anchors((13, 0), (23, 0)),
            None,
            &images,
        );
        assert_eq!(next, Some(at(10, 9, 45)));
    }

    #[test]
    fn test_degenerate_anchors_never_change() {
        let images = two_images();
        // Flat curve at 0.0 → dark image forever
        let next = find_next_change_time(
            at(10, 12, 0),
            Duration::minutes(1),
            anchors((12, 0), (12, 0)),
            Some(&images[1]),
            &images,
        );
        assert!(next.is_none());
    }

    #[test]
    fn test_interval_longer_than_flip_window_can_miss_change() {
        // Sampling every 24h lands on the same time of day → never differs
        let images = two_images();
        let next = find_next_change_time(
            at(10, 13, 0),
            Duration::hours(24),
            anchors((13, 0), (23, 0)),
            Some(&images[0]),
            &images,
        );
        assert!(next.is_none());
    }
}

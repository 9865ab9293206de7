use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;

use lumawall::daylight::Anchors;
use lumawall::library::LibraryImage;
use lumawall::scheduler::{Checkpoints, find_next_change_time};
use lumawall::selector::select_closest;

fn library_strategy() -> impl Strategy<Value = Vec<LibraryImage>> {
    prop::collection::vec((0.0f32..=1.0, any::<bool>()), 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (brightness, enabled))| {
                let image = LibraryImage::new(format!("/walls/img{}.png", i), brightness).unwrap();
                if enabled { image } else { image.disabled() }
            })
            .collect()
    })
}

fn datetime_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (0u32..24, 0u32..60).prop_map(|(hour, minute)| {
        NaiveDate::from_ymd_opt(2024, 2, 28)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    })
}

fn anchors_strategy() -> impl Strategy<Value = Anchors> {
    (0u32..24, 0u32..60, 0u32..24, 0u32..60).prop_map(|(bh, bm, dh, dm)| {
        Anchors::new(
            NaiveTime::from_hms_opt(bh, bm, 0).unwrap(),
            NaiveTime::from_hms_opt(dh, dm, 0).unwrap(),
        )
    })
}

fn interval_strategy() -> impl Strategy<Value = Duration> {
    (0i64..24, 0i64..60)
        .prop_filter("interval must be at least a minute", |(h, m)| h * 60 + m >= 1)
        .prop_map(|(h, m)| Duration::hours(h) + Duration::minutes(m))
}

proptest! {
    #[test]
    fn test_selection_is_enabled_and_closest(daylight in 0.0f64..=1.0, images in library_strategy()) {
        let selected = select_closest(daylight, &images);
        let any_enabled = images.iter().any(|image| image.enabled);
        prop_assert_eq!(selected.is_some(), any_enabled);

        if let Some(selected) = selected {
            prop_assert!(selected.enabled);
            let best = (f64::from(selected.brightness) - daylight).abs();
            for image in images.iter().filter(|image| image.enabled) {
                prop_assert!(best <= (f64::from(image.brightness) - daylight).abs());
            }
        }
    }

    #[test]
    fn test_checkpoints_stay_within_a_day(start in datetime_strategy(), interval in interval_strategy()) {
        let mut previous = start;
        for checkpoint in Checkpoints::new(start, interval) {
            prop_assert_eq!(checkpoint - previous, interval);
            prop_assert!(checkpoint - start <= Duration::days(1));
            previous = checkpoint;
        }
    }

    #[test]
    fn test_predicted_change_is_first_differing_checkpoint(
        start in datetime_strategy(),
        interval in interval_strategy(),
        anchors in anchors_strategy(),
        images in library_strategy(),
    ) {
        let current = select_closest(anchors.daylight_at(start), &images);
        let next = find_next_change_time(start, interval, anchors, current, &images);
        let differs = |at: NaiveDateTime| {
            select_closest(anchors.daylight_at(at), &images).map(|image| &image.path)
                != current.map(|image| &image.path)
        };

        if images.iter().filter(|image| image.enabled).count() < 2 {
            prop_assert!(next.is_none());
        }

        match next {
            Some(change) => {
                prop_assert!(change > start);
                prop_assert!(differs(change));
                for earlier in Checkpoints::new(start, interval).take_while(|cp| *cp < change) {
                    prop_assert!(!differs(earlier), "missed earlier change at {}", earlier);
                }
            }
            None => {
                for checkpoint in Checkpoints::new(start, interval) {
                    prop_assert!(!differs(checkpoint) || images.iter().filter(|i| i.enabled).count() < 2);
                }
            }
        }
    }
}

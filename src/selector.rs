//! Nearest-brightness image selection.

use crate::library::LibraryImage;

/// Pick the enabled image whose brightness is closest to `daylight`.
///
/// Ties go to the image that comes first in `images`. Disabled images are
/// skipped entirely, so an empty library and a library with every image
/// disabled both yield `None`.
///
/// # Examples
/// ```
/// use lumawall::library::LibraryImage;
/// use lumawall::selector::select_closest;
/// let images = vec![
///     LibraryImage::new("day.png", 0.9).unwrap(),
///     LibraryImage::new("night.png", 0.1).unwrap(),
/// ];
/// assert_eq!(select_closest(0.8, &images).unwrap().file_name(), "day.png");
/// ```
pub fn select_closest(daylight: f64, images: &[LibraryImage]) -> Option<&LibraryImage> {
    images
        .iter()
        .filter(|image| image.enabled)
        .fold(None, |best: Option<(&LibraryImage, f64)>, image| {
            let distance = (f64::from(image.brightness) - daylight).abs();
            match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((image, distance)),
            }
        })
        .map(|(image, _)| image)
}

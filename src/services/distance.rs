//! Colour distance and match score
//!
//! Plain Euclidean distance in 8-bit RGB space, mapped linearly onto a
//! 0-100 match percentage.

use crate::models::Rgb;

/// Distance worth one percentage point, roughly `sqrt(3) * 255 / 100`
pub const DISTANCE_PER_PERCENT: f64 = 4.41828;

/// Euclidean distance between two colours
#[inline]
pub fn color_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Map a distance onto `[0, 100]`. Not rounded.
#[inline]
pub fn match_percentage(distance: f64) -> f64 {
    (100.0 - distance / DISTANCE_PER_PERCENT).max(0.0)
}

//! Nearest catalog colour lookup

use crate::models::{Paint, RankedMatch, TargetColor};
use crate::services::distance::{color_distance, match_percentage};

/// Default number of matches returned to callers
pub const DEFAULT_MATCH_LIMIT: usize = 5;

/// Rank every catalog paint by distance to `target` and keep the best `limit`.
///
/// Ties keep catalog order. An empty catalog or a zero limit gives an empty list.
pub fn find_closest<'a>(
    target: TargetColor,
    catalog: &'a [Paint],
    limit: usize,
) -> Vec<RankedMatch<'a>> {
    if limit == 0 {
        return Vec::new();
    }

    let target = target.rgb();
    let mut ranked: Vec<RankedMatch<'a>> = catalog
        .iter()
        .map(|paint| {
            let distance = color_distance(target, paint.rgb);
            RankedMatch {
                paint,
                distance,
                match_percentage: match_percentage(distance),
            }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(limit);

    log::debug!(
        "find_closest: {} catalog paints, returning {}",
        catalog.len(),
        ranked.len()
    );
    ranked
}

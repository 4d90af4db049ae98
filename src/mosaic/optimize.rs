use geo::{Area, BooleanOps, MultiPolygon};

use super::rank::SortPreference;
use crate::catalog::Asset;

/// Absolute residual area (square degrees) below which a tile counts as
/// fully covered. Legacy constant; it absorbs the floating-point slivers
/// boolean ops leave behind.
pub const COVERAGE_EPSILON: f64 = 1e-4;

/// Greedily select assets until `tile_geom` is covered.
///
/// `candidates` must already be ranked and deduplicated per grid cell. Each
/// round the remaining candidates are re-scored by their intersection with
/// the still-uncovered geometry, sorted by the caller's preference with the
/// intersection fraction (descending) as the final tie-break, and the top
/// asset is taken; its footprint is subtracted from the uncovered geometry.
///
/// Preference dominates minimality on purpose: a lower-preference asset
/// with larger marginal coverage never displaces a higher-preference one
/// that still contributes positive coverage. Every returned asset covered a
/// positive residual area at the time it was selected.
///
/// Tiles at catalog, coast, or border edges legitimately run out of
/// candidates first; the partial (possibly empty) selection is returned.
pub fn optimize_coverage(
    tile_geom: &MultiPolygon<f64>,
    candidates: Vec<usize>,
    assets: &[Asset],
    preference: SortPreference,
) -> Vec<usize> {
    let tile_area = tile_geom.unsigned_area();
    if tile_area <= 0.0 {
        return Vec::new();
    }

    let mut remaining = tile_geom.clone();
    let mut pool = candidates;
    let mut selected = Vec::new();

    loop {
        // Fraction of the tile each candidate would still cover.
        let mut scored: Vec<(usize, f64)> = pool
            .iter()
            .map(|&i| {
                let overlap = remaining.intersection(&assets[i].geometry());
                (i, overlap.unsigned_area() / tile_area)
            })
            .filter(|&(_, fraction)| fraction > 0.0)
            .collect();

        if scored.is_empty() {
            break;
        }

        scored.sort_by(|a, b| {
            preference
                .sort_key(&assets[a.0])
                .cmp(&preference.sort_key(&assets[b.0]))
                .then_with(|| b.1.total_cmp(&a.1))
        });

        let (top, _) = scored[0];
        selected.push(top);
        pool = scored[1..].iter().map(|&(i, _)| i).collect();

        remaining = remaining.difference(&assets[top].geometry());
        if remaining.unsigned_area() < COVERAGE_EPSILON {
            break;
        }
    }

    selected
}

use ahash::AHashSet;

use crate::catalog::Asset;

/// How candidate scans are ordered before coverage optimization. The order
/// decides which vintage wins a grid cell and which asset covers a tile
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPreference {
    /// Year descending, then scale ascending.
    Newest,
    /// Year ascending, then scale ascending.
    Oldest,
    /// Distance to the reference year ascending, then scale ascending.
    ClosestToYear(i32),
}

impl SortPreference {
    /// Composite sort key; smaller is preferred. Undated assets sort after
    /// every dated one regardless of preference.
    pub(crate) fn sort_key(self, asset: &Asset) -> (i64, u32) {
        let year_key = match (self, asset.year) {
            (_, None) => i64::MAX,
            (Self::Newest, Some(y)) => -i64::from(y),
            (Self::Oldest, Some(y)) => i64::from(y),
            (Self::ClosestToYear(reference), Some(y)) => i64::from((y - reference).abs()),
        };
        (year_key, asset.scale)
    }
}

/// Stable-sort candidate indices by preference.
pub fn rank(assets: &[Asset], mut candidates: Vec<usize>, preference: SortPreference) -> Vec<usize> {
    candidates.sort_by_key(|&i| preference.sort_key(&assets[i]));
    candidates
}

/// Keep the first-ranked asset per grid cell; later duplicates of the same
/// quadrangle are dropped.
pub fn dedupe_by_cell(assets: &[Asset], ranked: Vec<usize>) -> Vec<usize> {
    let mut seen: AHashSet<&str> = AHashSet::with_capacity(ranked.len());
    ranked
        .into_iter()
        .filter(|&i| seen.insert(assets[i].cell_id.as_str()))
        .collect()
}

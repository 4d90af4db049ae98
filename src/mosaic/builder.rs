use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use rstar::RTree;
use tracing::{debug, info};

use super::index::{AssetDescriptor, MOSAICJSON_SPEC_VERSION, MosaicIndex};
use super::optimize::optimize_coverage;
use super::rank::{SortPreference, dedupe_by_cell, rank};
use crate::catalog::Asset;
use crate::geometry::{FootprintBox, envelope, union_rects};
use crate::mercator::{Tile, tiles_for_bounds, zoom_for_pixel_size};

/// Zoom levels between the inferred maxzoom and the default minzoom.
const MINZOOM_BAND: u8 = 5;

/// Tile size assumed by the zoom inference.
const ZOOM_TILESIZE: u32 = 512;

/// Build parameters. Explicit zoom values override inference from the
/// catalog's scales and scanner resolutions.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub preference: Option<SortPreference>,
    pub minzoom: Option<u8>,
    pub maxzoom: Option<u8>,
    pub quadkey_zoom: Option<u8>,
    pub name: Option<String>,
}

/// Build the mosaic index for a filtered catalog.
///
/// Enumerates every tile at the quadkey zoom intersecting the catalog's
/// combined bounds and runs the coverage optimizer per tile. Tiles are
/// independent given the immutable catalog, so the per-tile work runs on
/// the rayon pool; output is identical for identical input regardless of
/// scheduling.
pub fn build_index(assets: &[Asset], options: &BuildOptions) -> Result<MosaicIndex> {
    if assets.is_empty() {
        bail!("catalog is empty; nothing to mosaic");
    }
    let preference = options.preference.unwrap_or(SortPreference::Newest);

    let maxzoom = match options.maxzoom {
        Some(z) => z,
        None => estimate_maxzoom(assets).context(
            "cannot infer maxzoom: no scanner resolutions in catalog (supply an explicit maxzoom)",
        )?,
    };
    let minzoom = options.minzoom.unwrap_or_else(|| maxzoom.saturating_sub(MINZOOM_BAND));
    if minzoom > maxzoom {
        bail!("minzoom {minzoom} exceeds maxzoom {maxzoom}");
    }
    let quadkey_zoom = options.quadkey_zoom.unwrap_or(minzoom);
    if !(minzoom..=maxzoom).contains(&quadkey_zoom) {
        bail!("quadkey zoom {quadkey_zoom} outside zoom range {minzoom}..={maxzoom}");
    }

    let bounds = union_rects(assets.iter().map(|a| a.footprint))
        .context("catalog has no footprints")?;
    let rtree = RTree::bulk_load(
        assets
            .iter()
            .enumerate()
            .map(|(i, a)| FootprintBox::new(i, a.footprint))
            .collect(),
    );

    let tiles = tiles_for_bounds(&bounds, quadkey_zoom);
    info!(
        tiles = tiles.len(),
        quadkey_zoom, minzoom, maxzoom, "optimizing per-tile coverage"
    );

    let records: Vec<(Tile, Vec<usize>)> = tiles
        .into_par_iter()
        .filter_map(|tile| {
            let mut candidates: Vec<usize> = rtree
                .locate_in_envelope_intersecting(&envelope(&tile.bounds()))
                .map(FootprintBox::idx)
                .collect();
            // R-tree iteration order is arbitrary; canonicalize before the
            // stable preference sort so builds are reproducible.
            candidates.sort_unstable();

            let ranked = dedupe_by_cell(assets, rank(assets, candidates, preference));
            let selected = optimize_coverage(&tile.geometry(), ranked, assets, preference);
            if selected.is_empty() {
                debug!(?tile, "tile has no catalog coverage");
                return None;
            }
            Some((tile, selected))
        })
        .collect();

    let mut tile_records = BTreeMap::new();
    for (tile, selected) in records {
        let descriptors = selected
            .iter()
            .map(|&i| {
                AssetDescriptor {
                    url: assets[i].url.clone(),
                    map_bounds: Some(assets[i].map_bounds()),
                }
                .encode()
            })
            .collect();
        tile_records.insert(tile.quadkey(), descriptors);
    }
    info!(covered = tile_records.len(), "mosaic index assembled");

    Ok(MosaicIndex {
        mosaicjson: MOSAICJSON_SPEC_VERSION.to_string(),
        name: options.name.clone(),
        version: "1.0.0".to_string(),
        minzoom,
        maxzoom,
        quadkey_zoom,
        bounds: [bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y],
        center: [
            (bounds.min().x + bounds.max().x) / 2.0,
            (bounds.min().y + bounds.max().y) / 2.0,
            f64::from(minzoom),
        ],
        tiles: tile_records,
    })
}

/// Estimate the usable maxzoom from each scan's ground sample distance,
/// aggregated as the 75th percentile across the catalog.
fn estimate_maxzoom(assets: &[Asset]) -> Option<u8> {
    let mut zooms: Vec<f64> = assets
        .iter()
        .filter_map(|a| {
            let dpi = a.scanner_resolution?;
            let m_per_pixel = 0.0254 / dpi * f64::from(a.scale);
            Some(f64::from(zoom_for_pixel_size(m_per_pixel, ZOOM_TILESIZE)))
        })
        .collect();
    if zooms.is_empty() {
        return None;
    }
    zooms.sort_by(f64::total_cmp);
    Some(percentile(&zooms, 0.75).round() as u8)
}

/// Linear-interpolated percentile of sorted values, `q` in [0, 1].
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let frac = h - lo as f64;
    if lo + 1 < sorted.len() {
        sorted[lo] + (sorted[lo + 1] - sorted[lo]) * frac
    } else {
        sorted[lo]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::asset_fixture::asset;

    fn quad_catalog() -> Vec<Asset> {
        // Four 7.5-minute sheets forming a 2x2 block, plus an older reprint
        // of the northwest sheet.
        vec![
            asset("s3://b/nw_1966.tif", (-105.25, 40.125, -105.125, 40.25), 24000, Some(1966), "nw"),
            asset("s3://b/ne_1966.tif", (-105.125, 40.125, -105.0, 40.25), 24000, Some(1966), "ne"),
            asset("s3://b/sw_1966.tif", (-105.25, 40.0, -105.125, 40.125), 24000, Some(1966), "sw"),
            asset("s3://b/se_1966.tif", (-105.125, 40.0, -105.0, 40.125), 24000, Some(1966), "se"),
            asset("s3://b/nw_1942.tif", (-105.25, 40.125, -105.125, 40.25), 24000, Some(1942), "nw"),
        ]
    }

    fn options(quadkey_zoom: u8) -> BuildOptions {
        BuildOptions {
            minzoom: Some(11),
            maxzoom: Some(15),
            quadkey_zoom: Some(quadkey_zoom),
            ..Default::default()
        }
    }

    #[test]
    fn empty_catalog_is_an_error() {
        assert!(build_index(&[], &BuildOptions::default()).is_err());
    }

    #[test]
    fn quadkey_zoom_outside_range_is_rejected() {
        let opts = BuildOptions {
            minzoom: Some(11),
            maxzoom: Some(15),
            quadkey_zoom: Some(9),
            ..Default::default()
        };
        assert!(build_index(&quad_catalog(), &opts).is_err());
    }

    #[test]
    fn zoom_inference_uses_percentile() {
        let assets = quad_catalog();
        let opts = BuildOptions { quadkey_zoom: Some(12), ..Default::default() };
        let index = build_index(&assets, &opts).unwrap();
        // 1:24000 at 600 dpi is about a meter per pixel.
        assert_eq!(index.maxzoom, 16);
        assert_eq!(index.minzoom, 11);
    }

    #[test]
    fn bounds_span_the_catalog() {
        let index = build_index(&quad_catalog(), &options(12)).unwrap();
        assert_eq!(index.bounds, [-105.25, 40.0, -105.0, 40.25]);
        assert_eq!(index.quadkey_zoom, 12);
        assert_eq!(index.center[2], 11.0);
    }

    #[test]
    fn records_carry_bounds_and_skip_empty_tiles() {
        let index = build_index(&quad_catalog(), &options(12)).unwrap();
        assert!(!index.tiles.is_empty());
        for record in index.tiles.values() {
            assert!(!record.is_empty());
            for raw in record {
                let descriptor = AssetDescriptor::decode(raw);
                assert!(descriptor.url.starts_with("s3://b/"));
                assert!(descriptor.map_bounds.is_some());
            }
        }
        // The 0.25 degree block spans a handful of z12 tiles.
        let covered = index.tiles.len();
        assert!((4..=25).contains(&covered), "unexpected record count {covered}");
    }

    #[test]
    fn uncovered_tiles_are_omitted() {
        // Drop the southeast sheet; the z12 tile interior to it loses all
        // coverage and must be absent, while its western neighbor over the
        // surviving sheet keeps a record.
        let mut assets = quad_catalog();
        assets.remove(3);
        let index = build_index(&assets, &options(12)).unwrap();
        assert!(index.tiles.get(&Tile::new(12, 852, 1549).quadkey()).is_none());
        assert!(index.tiles.get(&Tile::new(12, 851, 1549).quadkey()).is_some());
    }

    #[test]
    fn newer_vintage_wins_each_cell() {
        let index = build_index(&quad_catalog(), &options(12)).unwrap();
        for record in index.tiles.values() {
            for raw in record {
                assert!(!raw.contains("nw_1942"), "stale vintage selected: {raw}");
            }
        }
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let assets = quad_catalog();
        let a = build_index(&assets, &options(12)).unwrap();
        let b = build_index(&assets, &options(12)).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn percentile_interpolates() {
        let values = [10.0, 12.0, 14.0, 16.0];
        assert_eq!(percentile(&values, 0.75), 14.5);
        assert_eq!(percentile(&values, 1.0), 16.0);
        assert_eq!(percentile(&[13.0], 0.75), 13.0);
    }
}

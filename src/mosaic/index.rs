use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mercator::Tile;

/// Version of the MosaicJSON layout the index serializes to.
pub const MOSAICJSON_SPEC_VERSION: &str = "0.0.2";

/// One entry of a coverage record: a storage address, optionally paired
/// with precomputed map bounds so serve-time extent resolution can be
/// skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_bounds: Option<[f64; 4]>,
}

impl AssetDescriptor {
    /// Encode as the string stored in the index: a compact JSON object, or
    /// the bare URL when no bounds are attached.
    pub fn encode(&self) -> String {
        if self.map_bounds.is_some() {
            serde_json::to_string(self).unwrap_or_else(|_| self.url.clone())
        } else {
            self.url.clone()
        }
    }

    /// Decode an index entry, accepting both encodings.
    pub fn decode(raw: &str) -> Self {
        if raw.starts_with('{') {
            if let Ok(decoded) = serde_json::from_str(raw) {
                return decoded;
            }
        }
        Self { url: raw.to_string(), map_bounds: None }
    }
}

/// The persisted mosaic: tile coverage keyed by quadkey, plus the global
/// zoom range and bounds. Built once per catalog snapshot and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MosaicIndex {
    pub mosaicjson: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub version: String,
    pub minzoom: u8,
    pub maxzoom: u8,
    pub quadkey_zoom: u8,
    /// Combined catalog bounds, `[minx, miny, maxx, maxy]`.
    pub bounds: [f64; 4],
    /// `[lon, lat, zoom]` hint for viewers.
    pub center: [f64; 3],
    /// Ordered coverage records. A BTreeMap keeps serialization byte-stable
    /// across builds of the same catalog.
    pub tiles: BTreeMap<String, Vec<String>>,
}

impl MosaicIndex {
    /// Coverage record for a tile, resolved through its ancestor at the
    /// quadkey zoom. Tiles coarser than the quadkey zoom have no entry.
    pub fn assets_for_tile(&self, tile: Tile) -> Option<&[String]> {
        if tile.z < self.quadkey_zoom {
            return None;
        }
        self.tiles
            .get(&tile.ancestor(self.quadkey_zoom).quadkey())
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_with_bounds_encodes_as_object() {
        let d = AssetDescriptor {
            url: "s3://prd-tnm/a.tif".into(),
            map_bounds: Some([-105.0, 40.0, -104.875, 40.125]),
        };
        let raw = d.encode();
        assert!(raw.starts_with('{'));
        assert_eq!(AssetDescriptor::decode(&raw), d);
    }

    #[test]
    fn bare_url_round_trips() {
        let d = AssetDescriptor { url: "s3://prd-tnm/a.tif".into(), map_bounds: None };
        assert_eq!(d.encode(), "s3://prd-tnm/a.tif");
        assert_eq!(AssetDescriptor::decode("s3://prd-tnm/a.tif"), d);
    }

    #[test]
    fn finer_tiles_resolve_through_ancestor() {
        let mut tiles = BTreeMap::new();
        let base = Tile::new(12, 654, 1583);
        tiles.insert(base.quadkey(), vec!["s3://b/a.tif".to_string()]);
        let index = MosaicIndex {
            mosaicjson: MOSAICJSON_SPEC_VERSION.to_string(),
            name: None,
            version: "1.0.0".to_string(),
            minzoom: 12,
            maxzoom: 16,
            quadkey_zoom: 12,
            bounds: [-123.0, 37.0, -122.0, 38.0],
            center: [-122.5, 37.5, 12.0],
            tiles,
        };

        let child = Tile::new(14, 654 * 4 + 1, 1583 * 4 + 2);
        assert_eq!(index.assets_for_tile(child).unwrap().len(), 1);
        assert_eq!(index.assets_for_tile(base).unwrap().len(), 1);
        assert!(index.assets_for_tile(Tile::new(11, 327, 791)).is_none());
        assert!(index.assets_for_tile(Tile::new(12, 0, 0)).is_none());
    }
}

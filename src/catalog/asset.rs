use geo::{MultiPolygon, Rect};
use serde_json::{Value, json};

/// One raster scan from the catalog. Immutable once materialized; ranking
/// and optimization only ever reorder references.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Canonical storage address (`s3://bucket/key`).
    pub url: String,
    /// Authoritative map footprint (collar excluded) from the catalog's
    /// corner columns, in lon/lat degrees.
    pub footprint: Rect<f64>,
    /// Map scale denominator.
    pub scale: u32,
    /// Imprint year, falling back to the date printed on the map. Absent in
    /// a few uncurated rows.
    pub year: Option<i32>,
    /// Grid-cell identifier grouping vintages of the same quadrangle.
    pub cell_id: String,
    /// Scanner resolution in dpi, when recorded. Used for zoom inference.
    pub scanner_resolution: Option<f64>,
}

impl Asset {
    /// Footprint as a geometry usable in boolean operations.
    pub fn geometry(&self) -> MultiPolygon<f64> {
        MultiPolygon(vec![self.footprint.to_polygon()])
    }

    /// Footprint as `[minx, miny, maxx, maxy]`.
    pub fn map_bounds(&self) -> [f64; 4] {
        let (min, max) = (self.footprint.min(), self.footprint.max());
        [min.x, min.y, max.x, max.y]
    }

    /// GeoJSON feature rendering, for `--filter-only` inspection output.
    pub fn to_geojson_feature(&self) -> Value {
        let [minx, miny, maxx, maxy] = self.map_bounds();
        json!({
            "type": "Feature",
            "properties": {
                "url": self.url,
                "scale": self.scale,
                "year": self.year,
                "cell_id": self.cell_id,
            },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [minx, miny],
                    [maxx, miny],
                    [maxx, maxy],
                    [minx, maxy],
                    [minx, miny],
                ]],
            },
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use geo::{Coord, Rect};

    use super::Asset;

    /// Build a test asset from corner coordinates.
    pub(crate) fn asset(
        url: &str,
        bounds: (f64, f64, f64, f64),
        scale: u32,
        year: Option<i32>,
        cell_id: &str,
    ) -> Asset {
        Asset {
            url: url.to_string(),
            footprint: Rect::new(
                Coord { x: bounds.0, y: bounds.1 },
                Coord { x: bounds.2, y: bounds.3 },
            ),
            scale,
            year,
            cell_id: cell_id.to_string(),
            scanner_resolution: Some(600.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::asset;

    #[test]
    fn feature_geometry_is_closed_ring() {
        let a = asset("s3://b/k.tif", (-105.0, 40.0, -104.875, 40.125), 24000, Some(1966), "c1");
        let feature = a.to_geojson_feature();
        let ring = &feature["geometry"]["coordinates"][0];
        assert_eq!(ring.as_array().unwrap().len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(feature["properties"]["scale"], 24000);
    }
}

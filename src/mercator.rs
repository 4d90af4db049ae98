use std::f64::consts::PI;

use geo::{Coord, MultiPolygon, Rect};

/// Web-mercator latitude limit in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Earth circumference at the equator in meters (EPSG:3857 extent).
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_016.685_578_49;

const MAX_ZOOM: u8 = 24;

/// A web-mercator tile address at a given zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl Tile {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// The tile containing a lon/lat point. Latitude is clamped to the
    /// mercator limits, indices to the valid range at `zoom`.
    pub fn containing(lon: f64, lat: f64, zoom: u8) -> Self {
        let n = f64::from(1u32 << zoom);
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = ((lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - lat.to_radians().tan().asinh() / PI) / 2.0 * n).floor();
        let max = (1u32 << zoom) - 1;
        Self {
            z: zoom,
            x: (x.max(0.0) as u32).min(max),
            y: (y.max(0.0) as u32).min(max),
        }
    }

    /// Geographic bounds of the tile in lon/lat degrees.
    pub fn bounds(&self) -> Rect<f64> {
        let n = f64::from(1u32 << self.z);
        let lon = |x: f64| x / n * 360.0 - 180.0;
        let lat = |y: f64| (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
        Rect::new(
            Coord { x: lon(f64::from(self.x)), y: lat(f64::from(self.y + 1)) },
            Coord { x: lon(f64::from(self.x + 1)), y: lat(f64::from(self.y)) },
        )
    }

    /// Tile footprint as a geometry usable in boolean operations.
    pub fn geometry(&self) -> MultiPolygon<f64> {
        MultiPolygon(vec![self.bounds().to_polygon()])
    }

    /// Bing-style quadkey for the tile, one digit per zoom level.
    pub fn quadkey(&self) -> String {
        let mut key = String::with_capacity(self.z as usize);
        for i in (1..=self.z).rev() {
            let mask = 1u32 << (i - 1);
            let mut digit = 0u8;
            if self.x & mask != 0 {
                digit += 1;
            }
            if self.y & mask != 0 {
                digit += 2;
            }
            key.push(char::from(b'0' + digit));
        }
        key
    }

    /// The ancestor tile at a coarser zoom level (self at equal zoom).
    pub fn ancestor(&self, zoom: u8) -> Self {
        assert!(zoom <= self.z, "ancestor zoom must not exceed tile zoom");
        let shift = self.z - zoom;
        Self { z: zoom, x: self.x >> shift, y: self.y >> shift }
    }
}

/// All tiles at `zoom` whose footprint intersects `bounds`, row-major
/// (north to south, west to east).
pub fn tiles_for_bounds(bounds: &Rect<f64>, zoom: u8) -> Vec<Tile> {
    let nw = Tile::containing(bounds.min().x, bounds.max().y, zoom);
    let se = Tile::containing(bounds.max().x, bounds.min().y, zoom);
    let mut tiles = Vec::with_capacity(
        ((se.y - nw.y + 1) as usize) * ((se.x - nw.x + 1) as usize),
    );
    for y in nw.y..=se.y {
        for x in nw.x..=se.x {
            tiles.push(Tile::new(zoom, x, y));
        }
    }
    tiles
}

/// The highest zoom level whose equatorial resolution is finer than
/// `pixel_size` (meters per pixel).
pub fn zoom_for_pixel_size(pixel_size: f64, tilesize: u32) -> u8 {
    for z in 0..MAX_ZOOM {
        let resolution = EARTH_CIRCUMFERENCE / (f64::from(tilesize) * f64::from(1u32 << z));
        if pixel_size > resolution {
            return z.saturating_sub(1);
        }
    }
    MAX_ZOOM - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn world_tile_bounds() {
        let bounds = Tile::new(0, 0, 0).bounds();
        assert_relative_eq!(bounds.min().x, -180.0);
        assert_relative_eq!(bounds.max().x, 180.0);
        assert_relative_eq!(bounds.min().y, -MAX_LATITUDE, epsilon = 1e-9);
        assert_relative_eq!(bounds.max().y, MAX_LATITUDE, epsilon = 1e-9);
    }

    #[test]
    fn zoom_one_quadrants() {
        let bounds = Tile::new(1, 0, 0).bounds();
        assert_relative_eq!(bounds.min().x, -180.0);
        assert_relative_eq!(bounds.max().x, 0.0);
        assert_relative_eq!(bounds.min().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn quadkey_digits() {
        assert_eq!(Tile::new(3, 3, 5).quadkey(), "213");
        assert_eq!(Tile::new(1, 0, 0).quadkey(), "0");
        assert_eq!(Tile::new(2, 3, 3).quadkey(), "33");
    }

    #[test]
    fn containing_round_trips_center() {
        let tile = Tile::new(12, 654, 1583);
        let b = tile.bounds();
        let center = ((b.min().x + b.max().x) / 2.0, (b.min().y + b.max().y) / 2.0);
        assert_eq!(Tile::containing(center.0, center.1, 12), tile);
    }

    #[test]
    fn ancestor_truncates_quadkey() {
        let tile = Tile::new(14, 2616, 6332);
        let up = tile.ancestor(12);
        assert_eq!(tile.quadkey()[..12], up.quadkey());
    }

    #[test]
    fn bbox_enumeration_covers_corners() {
        let bounds = Rect::new(
            Coord { x: -109.05, y: 36.99 },
            Coord { x: -102.04, y: 41.0 },
        );
        let tiles = tiles_for_bounds(&bounds, 6);
        assert!(tiles.contains(&Tile::containing(-109.0, 40.9, 6)));
        assert!(tiles.contains(&Tile::containing(-102.1, 37.0, 6)));
        // Row-major enumeration is stable.
        let mut sorted = tiles.clone();
        sorted.sort_by_key(|t| (t.y, t.x));
        assert_eq!(tiles, sorted);
    }

    #[test]
    fn zoom_for_typical_scan_resolution() {
        // 1:24000 at 600 dpi ~ 1.016 m/px
        let z = zoom_for_pixel_size(0.0254 / 600.0 * 24000.0, 512);
        assert!((15..=17).contains(&z), "unexpected zoom {z}");
        assert_eq!(zoom_for_pixel_size(1e9, 512), 0);
    }
}

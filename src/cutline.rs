//! Pixel-space cutlines: rectangles that mask the printed collar out of a
//! scan during raster reads.

use anyhow::{Result, bail};
use geo::Rect;

/// An axis-aligned rectangle in image pixel coordinates, origin at the top
/// left. Coordinates stay fractional; the raster reader decides how to
/// resample along the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutline {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Cutline {
    /// Corner ring in the order (left, top), (left, bottom),
    /// (right, bottom), (right, top).
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.left, self.top),
            (self.left, self.bottom),
            (self.right, self.bottom),
            (self.right, self.top),
        ]
    }

    /// WKT polygon rendering, the form warp-based readers take as a mask.
    pub fn to_wkt(&self) -> String {
        let [(lx, ty), (lx2, by), (rx, by2), (rx2, ty2)] = self.corners();
        format!("POLYGON (({lx} {ty}, {lx2} {by}, {rx} {by2}, {rx2} {ty2}))")
    }
}

/// Build the cutline for one scan.
///
/// `image_bounds` are the raster's georeferenced bounds and `map_extent` the
/// collar-free extent, both in the same geographic CRS. The transform is
/// assumed affine and unrotated, so each edge's geographic buffer rescales
/// linearly into pixels.
pub fn build_cutline(
    width: u32,
    height: u32,
    image_bounds: &Rect<f64>,
    map_extent: &Rect<f64>,
) -> Result<Cutline> {
    if width == 0 || height == 0 {
        bail!("image has zero pixel extent ({width}x{height})");
    }
    let crs_width = image_bounds.width();
    let crs_height = image_bounds.height();
    if crs_width <= 0.0 || crs_height <= 0.0 {
        bail!("image has zero geographic extent");
    }

    let buf_left = (map_extent.min().x - image_bounds.min().x).abs();
    let buf_bottom = (map_extent.min().y - image_bounds.min().y).abs();
    let buf_right = (map_extent.max().x - image_bounds.max().x).abs();
    let buf_top = (map_extent.max().y - image_bounds.max().y).abs();

    let w = f64::from(width);
    let h = f64::from(height);
    Ok(Cutline {
        left: buf_left / crs_width * w,
        bottom: h - buf_bottom / crs_height * h,
        right: w - buf_right / crs_width * w,
        top: buf_top / crs_height * h,
    })
}

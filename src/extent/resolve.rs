use geo::{Coord, Rect};
use thiserror::Error;

use super::ident::{MapIdent, parse_ident};
use super::offsets::grid_offset;

/// Errors from collar extent resolution.
#[derive(Debug, Error)]
pub enum ExtentError {
    #[error("no collar grid rule for scale 1:{0}")]
    UnresolvableScale(u32),
    #[error("unrecognized map identifier: {0}")]
    BadIdentifier(String),
    #[error("degenerate extent for scale 1:{scale}: snapped bounds collapsed")]
    Degenerate { scale: u32 },
}

/// Tolerance (relative to one grid unit) when deciding whether a bound sits
/// on a grid line. Well below the collar widths seen in practice.
const SNAP_EPS: f64 = 1e-9;

/// Smallest grid multiple strictly greater than `value`.
fn snap_up(value: f64, offset: f64) -> f64 {
    ((value / offset + SNAP_EPS).floor() + 1.0) * offset
}

/// Largest grid multiple strictly less than `value`.
fn snap_down(value: f64, offset: f64) -> f64 {
    ((value / offset - SNAP_EPS).ceil() - 1.0) * offset
}

/// Derive the map extent (the printed map area, collar excluded) from the
/// full raster bounds.
///
/// Each edge snaps inward to the nearest collar-grid line. The snap is
/// strict: a bound lying exactly on a grid line moves a full grid unit
/// inward, so bounds padded by exactly one grid unit recover the interior
/// rectangle. Assumes the collar is at most one grid unit wide on each side.
pub fn resolve_extent(
    bounds: &Rect<f64>,
    scale: u32,
    ident: Option<&MapIdent>,
) -> Result<Rect<f64>, ExtentError> {
    let offset = grid_offset(scale, bounds, ident)?;

    let minx = snap_up(bounds.min().x, offset.x);
    let miny = snap_up(bounds.min().y, offset.y);
    let maxx = snap_down(bounds.max().x, offset.x);
    let maxy = snap_down(bounds.max().y, offset.y);

    if minx >= maxx || miny >= maxy {
        return Err(ExtentError::Degenerate { scale });
    }
    Ok(Rect::new(Coord { x: minx, y: miny }, Coord { x: maxx, y: maxy }))
}

/// Resolve the extent of a scan from its raster bounds and storage URL,
/// parsing scale and quadrangle identity out of the filename.
pub fn extent_from_url(bounds: &Rect<f64>, url: &str) -> Result<Rect<f64>, ExtentError> {
    let ident = parse_ident(url)?;
    resolve_extent(bounds, ident.scale, Some(&ident))
}

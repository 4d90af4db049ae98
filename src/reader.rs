//! Serve-time adapter: resolve one addressed scan's extent and cutline and
//! delegate pixel extraction to an external raster reader.

use geo::Rect;
use ndarray::{Array2, Array3};
use thiserror::Error;

use crate::cutline::{Cutline, build_cutline};
use crate::extent::{ExtentError, extent_from_url};
use crate::mercator::Tile;

/// Errors surfaced to tile-serving callers.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("asset unreadable: {address}")]
    AssetUnreadable {
        address: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The scan's extent could not be derived and no precomputed bounds
    /// were supplied.
    #[error("extent unresolvable for {address}")]
    ExtentUnresolvable {
        address: String,
        #[source]
        source: ExtentError,
    },
    #[error("invalid cutline for {address}: {reason}")]
    BadCutline { address: String, reason: String },
}

/// Pixel payload of one mercator tile: interleaved band data plus a
/// validity mask matching the external reader's conventions.
#[derive(Debug, Clone)]
pub struct TileData {
    /// `(bands, tilesize, tilesize)` pixel values.
    pub data: Array3<u8>,
    /// `(tilesize, tilesize)` mask; zero marks pixels outside the cutline
    /// or the source raster.
    pub mask: Array2<u8>,
}

/// An opened raster scan. Implemented by the external raster reader; the
/// core only needs georeferencing and masked tile extraction.
pub trait OpenRaster {
    /// Raster bounds in lon/lat degrees.
    fn geo_bounds(&self) -> Rect<f64>;
    /// Pixel dimensions `(width, height)`.
    fn dimensions(&self) -> (u32, u32);
    /// Read one mercator tile, masking pixels outside `cutline`.
    fn read_tile(&self, tile: Tile, tilesize: u32, cutline: &Cutline)
    -> Result<TileData, ReadError>;
}

/// Factory for opened rasters, keyed by storage address.
pub trait RasterOpener {
    type Raster: OpenRaster;
    fn open(&self, address: &str) -> Result<Self::Raster, ReadError>;
}

/// Read one tile from one scan, cropping the collar.
///
/// `map_bounds`, when already known (the mosaic index stores it alongside
/// the address), skips extent resolution entirely; otherwise the extent is
/// derived from the raster bounds and the address.
pub fn get_tile<O: RasterOpener>(
    opener: &O,
    address: &str,
    tile: Tile,
    tilesize: u32,
    map_bounds: Option<Rect<f64>>,
) -> Result<TileData, ReadError> {
    let raster = opener.open(address)?;
    let image_bounds = raster.geo_bounds();

    let extent = match map_bounds {
        Some(bounds) => bounds,
        None => extent_from_url(&image_bounds, address).map_err(|source| {
            ReadError::ExtentUnresolvable { address: address.to_string(), source }
        })?,
    };

    let (width, height) = raster.dimensions();
    let cutline = build_cutline(width, height, &image_bounds, &extent).map_err(|err| {
        ReadError::BadCutline { address: address.to_string(), reason: err.to_string() }
    })?;

    raster.read_tile(tile, tilesize, &cutline)
}

#![doc = "Mosaic builder and collar-aware tiler for USGS historical topographic map scans"]
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod cutline;
pub mod extent;
pub mod geometry;
pub mod mercator;
pub mod mosaic;
pub mod reader;

#[doc(inline)]
pub use catalog::{Asset, CatalogFilter, load_catalog};

#[doc(inline)]
pub use cutline::{Cutline, build_cutline};

#[doc(inline)]
pub use extent::{ExtentError, resolve_extent};

#[doc(inline)]
pub use mercator::Tile;

#[doc(inline)]
pub use mosaic::{BuildOptions, MosaicIndex, SortPreference, build_index};

#[doc(inline)]
pub use reader::{OpenRaster, RasterOpener, ReadError, get_tile};

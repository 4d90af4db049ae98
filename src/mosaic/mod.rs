//! Mosaic construction: rank candidate scans, greedily cover each tile, and
//! assemble the persisted index.

mod builder;
mod index;
mod optimize;
mod rank;

pub use builder::{BuildOptions, build_index};
pub use index::{AssetDescriptor, MOSAICJSON_SPEC_VERSION, MosaicIndex};
pub use optimize::{COVERAGE_EPSILON, optimize_coverage};
pub use rank::{SortPreference, dedupe_by_cell, rank};

//! Catalog handling: load the USGS bulk-metadata dump, apply attribute and
//! spatial filters, and materialize typed asset records.

mod asset;
mod load;
mod storage;

pub use asset::Asset;
#[cfg(test)]
pub(crate) use asset::test_support as asset_fixture;
pub use load::{CatalogFilter, load_catalog, load_manifest};
pub use storage::{DEFAULT_BUCKET, GEOTIFF_PREFIX, geotiff_key, s3_url};

#[cfg(feature = "download")]
pub mod metadata;
pub mod mosaic;

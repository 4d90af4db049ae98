/// Public bucket holding the staged HTMC products.
pub const DEFAULT_BUCKET: &str = "prd-tnm";

/// Key prefix of the GeoTIFF renditions within the bucket.
pub const GEOTIFF_PREFIX: &str = "StagedProducts/Maps/HistoricalTopo/GeoTIFF/";

/// Derive the canonical GeoTIFF storage key from the catalog's
/// `download_product_s3` column, which points at the GeoPDF rendition:
///
/// `https://{host}/StagedProducts/Maps/HistoricalTopo/PDF/{state}/{scale}/{name}.pdf`
///
/// The GeoTIFF lives under the same product root with the scale directory
/// dropped. Returns `None` when the path does not have the expected shape.
pub fn geotiff_key(download_path: &str) -> Option<String> {
    let decoded = urlencoding::decode(download_path).ok()?;
    let parts: Vec<&str> = decoded.split('/').collect();
    if parts.len() < 10 {
        return None;
    }

    let product_root = parts[3..6].join("/");
    let state = parts[7];
    let fname = parts[9].strip_suffix(".pdf")?;
    Some(format!("{product_root}/GeoTIFF/{state}/{fname}.tif"))
}

/// Full storage address for a canonical key.
pub fn s3_url(key: &str) -> String {
    format!("s3://{DEFAULT_BUCKET}/{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_geopdf_path() {
        let url = "https://prd-tnm.s3.amazonaws.com/StagedProducts/Maps/HistoricalTopo/PDF/CO/24000/CO_Boulder_400571_1966_24000_geo.pdf";
        assert_eq!(
            geotiff_key(url).unwrap(),
            "StagedProducts/Maps/HistoricalTopo/GeoTIFF/CO/CO_Boulder_400571_1966_24000_geo.tif"
        );
    }

    #[test]
    fn key_decodes_percent_encoding() {
        let url = "https://prd-tnm.s3.amazonaws.com/StagedProducts/Maps/HistoricalTopo/PDF/CA/250000/CA_Santa%20Cruz_123456_1948_250000_geo.pdf";
        assert_eq!(
            geotiff_key(url).unwrap(),
            "StagedProducts/Maps/HistoricalTopo/GeoTIFF/CA/CA_Santa Cruz_123456_1948_250000_geo.tif"
        );
    }

    #[test]
    fn short_or_foreign_paths_are_rejected() {
        assert_eq!(geotiff_key("not-a-path"), None);
        assert_eq!(geotiff_key("https://example.com/a/b.pdf"), None);
    }

    #[test]
    fn url_uses_default_bucket() {
        assert_eq!(s3_url("a/b.tif"), "s3://prd-tnm/a/b.tif");
        assert!(GEOTIFF_PREFIX.ends_with('/'));
    }
}

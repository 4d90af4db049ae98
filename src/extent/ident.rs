use std::sync::LazyLock;

use regex::Regex;

use super::resolve::ExtentError;

/// Metadata parsed from a canonical scan filename, e.g.
/// `AK_Ruby_361345_1951_250000_geo.tif`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapIdent {
    /// Two-letter state code, lowercased.
    pub state: String,
    /// Map name, lowercased with spaces removed.
    pub map_name: String,
    pub map_id: u32,
    pub year: i32,
    /// Map scale denominator.
    pub scale: u32,
}

static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<state>[A-Z]{2})_(?P<map_name>.*)_(?P<map_id>\d+)_(?P<year>\d{4})_(?P<scale>\d+)_[a-zA-Z]*\.tif$",
    )
    .expect("ident regex is valid")
});

/// Parse scan metadata from a storage URL or key. The filename may be
/// percent-encoded (catalog dumps encode spaces in map names).
pub fn parse_ident(url: &str) -> Result<MapIdent, ExtentError> {
    let decoded = urlencoding::decode(url).map_err(|_| bad(url))?;
    let fname = decoded.rsplit('/').next().unwrap_or(&decoded);
    let caps = IDENT_RE.captures(fname).ok_or_else(|| bad(url))?;

    let parse_u32 = |name: &str| caps[name].parse::<u32>().map_err(|_| bad(url));
    Ok(MapIdent {
        state: caps["state"].to_lowercase(),
        map_name: caps["map_name"].to_lowercase().replace(' ', ""),
        map_id: parse_u32("map_id")?,
        year: caps["year"].parse().map_err(|_| bad(url))?,
        scale: parse_u32("scale")?,
    })
}

fn bad(url: &str) -> ExtentError {
    ExtentError::BadIdentifier(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_filename() {
        let url = "https://prd-tnm.s3.amazonaws.com/StagedProducts/Maps/HistoricalTopo/GeoTIFF/AK/AK_Ruby_361345_1951_250000_geo.tif";
        let ident = parse_ident(url).unwrap();
        assert_eq!(ident.state, "ak");
        assert_eq!(ident.map_name, "ruby");
        assert_eq!(ident.map_id, 361345);
        assert_eq!(ident.year, 1951);
        assert_eq!(ident.scale, 250000);
    }

    #[test]
    fn lowercases_and_strips_spaces_in_map_name() {
        let ident = parse_ident("CA_Santa%20Cruz_123456_1948_250000_geo.tif").unwrap();
        assert_eq!(ident.state, "ca");
        assert_eq!(ident.map_name, "santacruz");
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(matches!(
            parse_ident("notamap.tif"),
            Err(ExtentError::BadIdentifier(_))
        ));
        assert!(parse_ident("AK_Ruby_361345_1951_250000_geo.pdf").is_err());
    }
}

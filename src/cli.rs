use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use geo::Rect;

use crate::geometry::rect;

/// USGS historical topo mosaic CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "usgs-topo", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a mosaic index from the bulk-metadata CSV
    Mosaic(MosaicArgs),

    /// Harvest catalog metadata from the TNM products API to stdout
    #[cfg(feature = "download")]
    Metadata(MetadataArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum PreferenceArg {
    Newest,
    Oldest,
    ClosestToYear,
}

#[derive(Args, Debug)]
pub struct MosaicArgs {
    /// Path to the CSV bulk metadata dump
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub meta_path: PathBuf,

    /// Manifest of storage keys known to exist, one per line
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub s3_list_path: Option<PathBuf>,

    /// Minimum map scale, inclusive
    #[arg(long)]
    pub min_scale: Option<f64>,

    /// Maximum map scale, inclusive
    #[arg(long)]
    pub max_scale: Option<f64>,

    /// Minimum map year, inclusive
    #[arg(long)]
    pub min_year: Option<f64>,

    /// Maximum map year, inclusive
    #[arg(long)]
    pub max_year: Option<f64>,

    /// Keep only woodland-tint sheets
    #[arg(long, overrides_with = "no_woodland_tint")]
    pub woodland_tint: bool,

    /// Keep only sheets without woodland tint
    #[arg(long)]
    pub no_woodland_tint: bool,

    /// Keep orthophoto sheets (excluded by default)
    #[arg(long)]
    pub allow_orthophoto: bool,

    /// Bounding box "minx,miny,maxx,maxy" for the mosaic
    #[arg(long, value_parser = parse_bounds)]
    pub bounds: Option<Rect<f64>>,

    /// Force mosaic minzoom
    #[arg(short = 'z', long)]
    pub minzoom: Option<u8>,

    /// Force mosaic maxzoom
    #[arg(short = 'Z', long)]
    pub maxzoom: Option<u8>,

    /// Force mosaic quadkey zoom
    #[arg(long)]
    pub quadkey_zoom: Option<u8>,

    /// How assets are chosen within each tile at the quadkey zoom
    #[arg(long, value_enum, default_value_t = PreferenceArg::Newest)]
    pub sort_preference: PreferenceArg,

    /// Reference year when sort-preference is closest-to-year
    #[arg(long)]
    pub closest_to_year: Option<i32>,

    /// Emit the filtered assets as line-delimited GeoJSON features and exit
    /// without building the index
    #[arg(long)]
    pub filter_only: bool,

    /// Output file (stdout by default)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

impl MosaicArgs {
    /// Tri-state woodland tint filter from the flag pair.
    pub fn tint_filter(&self) -> Option<bool> {
        if self.woodland_tint {
            Some(true)
        } else if self.no_woodland_tint {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(feature = "download")]
#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Restrict the harvest to a bounding box "minx,miny,maxx,maxy"
    #[arg(short, long, value_parser = parse_bounds)]
    pub bbox: Option<Rect<f64>>,
}

fn parse_bounds(raw: &str) -> Result<Rect<f64>, String> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid bounds {raw:?}: {e}"))?;
    let [minx, miny, maxx, maxy] = parts[..] else {
        return Err(format!("bounds must have 4 comma-separated values, got {}", parts.len()));
    };
    if minx >= maxx || miny >= maxy {
        return Err(format!("bounds {raw:?} are empty"));
    }
    Ok(rect(minx, miny, maxx, maxy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_parse_and_validate() {
        let r = parse_bounds("-109.05, 36.99, -102.04, 41.0").unwrap();
        assert_eq!(r.min().x, -109.05);
        assert_eq!(r.max().y, 41.0);
        assert!(parse_bounds("1,2,3").is_err());
        assert!(parse_bounds("3,0,1,1").is_err());
        assert!(parse_bounds("a,b,c,d").is_err());
    }

    #[test]
    fn tint_flags_form_tri_state() {
        let cli = Cli::try_parse_from(["usgs-topo", "mosaic", "--meta-path", "x.csv"]).unwrap();
        let Commands::Mosaic(args) = cli.command else { panic!("expected mosaic") };
        assert_eq!(args.tint_filter(), None);

        let cli = Cli::try_parse_from([
            "usgs-topo", "mosaic", "--meta-path", "x.csv", "--woodland-tint",
        ])
        .unwrap();
        let Commands::Mosaic(args) = cli.command else { panic!("expected mosaic") };
        assert_eq!(args.tint_filter(), Some(true));

        let cli = Cli::try_parse_from([
            "usgs-topo", "mosaic", "--meta-path", "x.csv", "--no-woodland-tint",
        ])
        .unwrap();
        let Commands::Mosaic(args) = cli.command else { panic!("expected mosaic") };
        assert_eq!(args.tint_filter(), Some(false));
    }
}

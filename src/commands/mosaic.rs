use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::catalog::{CatalogFilter, load_catalog, load_manifest};
use crate::cli::{MosaicArgs, PreferenceArg};
use crate::mosaic::{BuildOptions, SortPreference, build_index};

pub fn run(args: &MosaicArgs) -> Result<()> {
    // Validate the preference before touching the catalog.
    let preference = match (args.sort_preference, args.closest_to_year) {
        (PreferenceArg::Newest, _) => SortPreference::Newest,
        (PreferenceArg::Oldest, _) => SortPreference::Oldest,
        (PreferenceArg::ClosestToYear, Some(year)) => SortPreference::ClosestToYear(year),
        (PreferenceArg::ClosestToYear, None) => {
            bail!("--closest-to-year is required when sort-preference is closest-to-year")
        }
    };

    let filter = CatalogFilter {
        min_scale: args.min_scale,
        max_scale: args.max_scale,
        min_year: args.min_year,
        max_year: args.max_year,
        woodland_tint: args.tint_filter(),
        allow_orthophoto: args.allow_orthophoto,
        bounds: args.bounds,
    };

    let manifest = args
        .s3_list_path
        .as_deref()
        .map(load_manifest)
        .transpose()?;
    let assets = load_catalog(&args.meta_path, &filter, manifest.as_ref())?;

    if args.filter_only {
        let mut lines = String::new();
        for asset in &assets {
            lines.push_str(&serde_json::to_string(&asset.to_geojson_feature())?);
            lines.push('\n');
        }
        return emit(args.output.as_deref(), &lines);
    }

    let options = BuildOptions {
        preference: Some(preference),
        minzoom: args.minzoom,
        maxzoom: args.maxzoom,
        quadkey_zoom: args.quadkey_zoom,
        name: None,
    };
    let index = build_index(&assets, &options)?;
    info!(tiles = index.tiles.len(), "writing mosaic index");

    let mut body = serde_json::to_string(&index)?;
    body.push('\n');
    emit(args.output.as_deref(), &body)
}

fn emit(output: Option<&Path>, body: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, body)
            .with_context(|| format!("write output {}", path.display())),
        None => {
            let stdout = std::io::stdout().lock();
            let mut out = BufWriter::new(stdout);
            out.write_all(body.as_bytes())?;
            Ok(out.flush()?)
        }
    }
}

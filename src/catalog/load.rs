use std::fs;
use std::fs::File;
use std::path::Path;

use ahash::AHashSet;
use anyhow::{Context, Result};
use geo::{Intersects, Rect};
use polars::prelude::*;
use tracing::{debug, info, warn};

use super::asset::Asset;
use super::storage::{geotiff_key, s3_url};
use crate::geometry::rect;

/// Attribute and spatial predicates applied to the bulk metadata dump.
/// All predicates are conjunctive; `None` means "no constraint".
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogFilter {
    pub min_scale: Option<f64>,
    pub max_scale: Option<f64>,
    pub min_year: Option<f64>,
    pub max_year: Option<f64>,
    /// `Some(true)` keeps woodland-tint sheets, `Some(false)` keeps plain
    /// ones, `None` keeps both.
    pub woodland_tint: Option<bool>,
    /// Orthophoto sheets are excluded unless explicitly allowed.
    pub allow_orthophoto: bool,
    /// Keep only footprints intersecting this bounding box.
    pub bounds: Option<Rect<f64>>,
}

/// Load the bulk-metadata CSV, apply `filter`, and materialize asset
/// records. Rows with malformed required fields are skipped, not fatal: the
/// dump is large and uncurated.
///
/// `manifest`, when given, restricts the result to assets whose canonical
/// storage key is known to exist (the dump drifts from the bucket contents).
pub fn load_catalog(
    path: &Path,
    filter: &CatalogFilter,
    manifest: Option<&AHashSet<String>>,
) -> Result<Vec<Asset>> {
    let df = read_metadata_csv(path)?;
    let total = df.height();
    let df = apply_filters(df, filter)?;
    let assets = materialize(&df, filter.bounds.as_ref(), manifest)?;
    info!(
        rows = total,
        filtered = df.height(),
        assets = assets.len(),
        "catalog loaded"
    );
    Ok(assets)
}

/// Load an existence manifest: newline-delimited storage keys, one GeoTIFF
/// per line. Lines without a `.tif` suffix are ignored.
pub fn load_manifest(path: &Path) -> Result<AHashSet<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read manifest {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| line.ends_with(".tif"))
        .map(String::from)
        .collect())
}

/// Read the dump with column names normalized to lower snake case.
fn read_metadata_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("open metadata CSV {}", path.display()))?;
    let options = CsvReadOptions::default().with_infer_schema_length(Some(10_000));
    let mut df = CsvReader::new(file).with_options(options).finish()?;

    let renames: Vec<(String, String)> = df
        .get_column_names()
        .iter()
        .map(|name| (name.to_string(), name.to_lowercase().replace(' ', "_")))
        .filter(|(old, new)| old != new)
        .collect();
    for (old, new) in renames {
        df.rename(&old, new.into())?;
    }
    Ok(df)
}

fn apply_filters(df: DataFrame, filter: &CatalogFilter) -> Result<DataFrame> {
    // Only the historical series exists as GeoTIFF; newer series are GeoPDF
    // only. The year is the imprint year when present, else the date
    // printed on the map.
    let mut lf = df
        .lazy()
        .filter(col("series").eq(lit("HTMC")))
        .with_column(
            col("imprint_year")
                .cast(DataType::Float64)
                .fill_null(col("date_on_map").cast(DataType::Float64))
                .alias("year"),
        );

    if let Some(v) = filter.min_scale {
        lf = lf.filter(col("scale").cast(DataType::Float64).gt_eq(lit(v)));
    }
    if let Some(v) = filter.max_scale {
        lf = lf.filter(col("scale").cast(DataType::Float64).lt_eq(lit(v)));
    }
    if let Some(v) = filter.min_year {
        lf = lf.filter(col("year").gt_eq(lit(v)));
    }
    if let Some(v) = filter.max_year {
        lf = lf.filter(col("year").lt_eq(lit(v)));
    }
    if let Some(tint) = filter.woodland_tint {
        let flag = if tint { "Y" } else { "N" };
        lf = lf.filter(col("woodland_tint").cast(DataType::String).eq(lit(flag)));
    }
    if !filter.allow_orthophoto {
        lf = lf.filter(col("orthophoto").cast(DataType::String).is_null());
    }

    let df = lf
        .select([
            col("scale").cast(DataType::Float64),
            col("year"),
            col("cell_id").cast(DataType::String),
            col("scanner_resolution").cast(DataType::Float64),
            col("download_product_s3").cast(DataType::String),
            col("w_long").cast(DataType::Float64),
            col("s_lat").cast(DataType::Float64),
            col("e_long").cast(DataType::Float64),
            col("n_lat").cast(DataType::Float64),
        ])
        .collect()?;
    Ok(df)
}

fn materialize(
    df: &DataFrame,
    bounds: Option<&Rect<f64>>,
    manifest: Option<&AHashSet<String>>,
) -> Result<Vec<Asset>> {
    let scale = df.column("scale")?.as_materialized_series().f64()?;
    let year = df.column("year")?.as_materialized_series().f64()?;
    let cell_id = df.column("cell_id")?.as_materialized_series().str()?;
    let dpi = df.column("scanner_resolution")?.as_materialized_series().f64()?;
    let download = df.column("download_product_s3")?.as_materialized_series().str()?;
    let w_long = df.column("w_long")?.as_materialized_series().f64()?;
    let s_lat = df.column("s_lat")?.as_materialized_series().f64()?;
    let e_long = df.column("e_long")?.as_materialized_series().f64()?;
    let n_lat = df.column("n_lat")?.as_materialized_series().f64()?;

    let mut assets = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let Some(path) = download.get(i) else {
            warn!(row = i, "skipping row without a download path");
            continue;
        };
        let Some(key) = geotiff_key(path) else {
            warn!(row = i, path, "skipping row with unparseable download path");
            continue;
        };
        let (Some(s), Some(cell)) = (scale.get(i), cell_id.get(i)) else {
            warn!(row = i, key, "skipping row with missing scale or cell id");
            continue;
        };
        let (Some(w), Some(sl), Some(e), Some(n)) =
            (w_long.get(i), s_lat.get(i), e_long.get(i), n_lat.get(i))
        else {
            warn!(row = i, key, "skipping row with missing corner coordinates");
            continue;
        };
        if s <= 0.0 {
            warn!(row = i, key, scale = s, "skipping row with non-positive scale");
            continue;
        }

        if let Some(manifest) = manifest
            && !manifest.contains(&key)
        {
            debug!(key, "dropping row absent from existence manifest");
            continue;
        }

        let footprint = rect(w, sl, e, n);
        if let Some(bounds) = bounds
            && !footprint.intersects(bounds)
        {
            continue;
        }

        assets.push(Asset {
            url: s3_url(&key),
            footprint,
            scale: s.round() as u32,
            year: year.get(i).map(|y| y.round() as i32),
            cell_id: cell.to_string(),
            scanner_resolution: dpi.get(i),
        });
    }
    Ok(assets)
}

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::cli::MetadataArgs;

const PRODUCTS_URL: &str = "https://tnmaccess.nationalmap.gov/api/v1/products";
const PAGE_SIZE: usize = 1000;

/// Harvest the historical topo catalog from the TNM products API, one JSON
/// record per stdout line.
pub fn run(args: &MetadataArgs) -> Result<()> {
    let client = reqwest::blocking::Client::new();

    let mut params: Vec<(String, String)> = vec![
        ("datasets".into(), "Historical Topographic Maps".into()),
        ("prodFormats".into(), "GeoTIFF".into()),
        ("prodExtents".into(), "7.5 x 7.5 minute".into()),
    ];
    if let Some(bbox) = args.bbox {
        params.push((
            "bbox".into(),
            format!("{},{},{},{}", bbox.min().x, bbox.min().y, bbox.max().x, bbox.max().y),
        ));
    }

    // First request just reports the result count.
    let mut probe = params.clone();
    probe.push(("max".into(), "1".into()));
    let total = fetch(&client, &probe)?["total"]
        .as_u64()
        .context("TNM response has no total")? as usize;
    let pages = total.div_ceil(PAGE_SIZE);
    info!(total, pages, "harvesting TNM catalog");

    params.push(("max".into(), PAGE_SIZE.to_string()));
    for page in 0..pages {
        info!(page = page + 1, pages, "fetching catalog page");
        let mut paged = params.clone();
        paged.push(("offset".into(), (page * PAGE_SIZE).to_string()));
        let body = fetch(&client, &paged)?;

        let items = body["items"].as_array().context("TNM response has no items")?;
        for item in items {
            println!("{}", serde_json::to_string(item)?);
        }
    }
    Ok(())
}

fn fetch(client: &reqwest::blocking::Client, params: &[(String, String)]) -> Result<Value> {
    let response = client
        .get(PRODUCTS_URL)
        .query(params)
        .send()
        .context("TNM products request failed")?
        .error_for_status()
        .context("TNM products request rejected")?;
    response.json().context("TNM products response is not JSON")
}

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use wayback_history::sampler::PRIMARY_FETCH_LIMIT;
use wayback_history::{normalize_rows, CdxClient, ClientConfig, IndexFetcher, IndexQuery};

fn main() -> Result<()> {
    env_logger::init();

    // Get URL and fixture name from command line arguments
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Please provide a URL and a fixture name");
        eprintln!("Usage: cargo run --bin save_cdx_fixture <URL> <fixture_name>");
        std::process::exit(1);
    }

    let url = &args[1];
    let fixture_name = &args[2];

    let query = IndexQuery::new(url, PRIMARY_FETCH_LIMIT);
    println!("Fetching CDX rows for {}...", query.url);

    let client = CdxClient::new(ClientConfig::default()).context("Failed to create HTTP client")?;
    let rows = client.fetch(&query).context("Failed to fetch CDX rows")?;

    let fixtures_dir = Path::new("src/tests/fixtures");
    fs::create_dir_all(fixtures_dir).context("Failed to create fixtures directory")?;

    let file_path = fixtures_dir.join(format!("{}.json", fixture_name));
    let json = serde_json::to_string(&rows).context("Failed to serialize CDX rows")?;
    fs::write(&file_path, json).context("Failed to write fixture file")?;

    println!("Saved {} rows to {}", rows.len(), file_path.display());

    let captures = normalize_rows(&rows, client.archive_base());
    let skipped = rows.len().saturating_sub(1) - captures.len();
    println!("Normalized into {} captures ({} rows skipped)", captures.len(), skipped);
    if let (Some(first), Some(last)) = (captures.first(), captures.last()) {
        println!("  - Oldest: {}", first.display_date());
        println!("  - Newest: {}", last.display_date());
    }

    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use wayback_history::present::{print_table, save_json, to_json};
use wayback_history::{
    fetch_captures, parse_date_bound, periodic_snapshots, strip_protocol, CdxClient, ClientConfig,
    HistoryError, IndexQuery, PeriodicSampler, SamplerConfig, SortOrder, DEFAULT_ARCHIVE_BASE,
};

/// Look up a site's snapshots in the Wayback Machine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Site to look up, e.g. example.com
    url: String,

    /// Maximum number of snapshots to list
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Result ordering: closest (most recent first) or reverse (newest to oldest)
    #[arg(long, value_enum)]
    sort: Option<SortOrder>,

    /// Start date, YYYYMMDD
    #[arg(long)]
    from: Option<String>,

    /// End date, YYYYMMDD
    #[arg(long)]
    to: Option<String>,

    /// Prefer the latest snapshots (same as --sort closest)
    #[arg(long)]
    latest: bool,

    /// Pick one snapshot per interval, starting from the oldest
    #[arg(long)]
    yearly: bool,

    /// With --yearly, how many snapshots to take after the oldest (0 = up to today)
    #[arg(long, default_value_t = 0)]
    num_years: usize,

    /// With --yearly, years between snapshots
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    interval: i32,

    /// Print the snapshots as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Also save the snapshots as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Archive to query
    #[arg(long, default_value = DEFAULT_ARCHIVE_BASE)]
    base_url: String,

    /// Request timeout in seconds, 0 to wait indefinitely
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Log more (-v for progress, -vv for every sampling decision)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let url = strip_protocol(&cli.url);
    if url.is_empty() {
        return Err(HistoryError::InvalidArgument("URL must not be empty".to_string()).into());
    }
    let from = cli.from.as_deref().map(parse_date_bound).transpose()?;
    let to = cli.to.as_deref().map(parse_date_bound).transpose()?;

    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        timeout: match cli.timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
        ..ClientConfig::default()
    };
    let client = CdxClient::new(config).context("Failed to create HTTP client")?;

    println!("Searching history for {}...", url);

    let snapshots = if cli.yearly {
        let sampler = PeriodicSampler::new(SamplerConfig {
            year_interval: cli.interval,
            max_samples: cli.num_years,
        });
        periodic_snapshots(&client, &url, &sampler)
            .context("Failed to fetch periodic snapshots")?
    } else {
        let sort = match cli.sort {
            None if cli.latest => Some(SortOrder::Closest),
            sort => sort,
        };
        let query = IndexQuery::new(&url, cli.limit).sort(sort).between(from, to);
        fetch_captures(&client, &query).context("Failed to fetch snapshots")?
    };

    if let Some(path) = &cli.output {
        save_json(path, &snapshots)?;
        println!("Snapshots saved to {}", path.display());
    }

    if cli.json {
        println!("{}", to_json(&snapshots)?);
    } else if snapshots.is_empty() {
        println!("No snapshots found");
    } else {
        print_table(&snapshots)?;
    }

    Ok(())
}

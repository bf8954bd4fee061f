mod server;
mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eis_core::{
    CombinationFilter, decode_measurements, frequency_range, millis_to_iso8601, nyquist_rows,
    paginate, reduce_to_latest,
};
use eis_feed::{Settings, decode_combinations, load_records};
use rmcp::{ServiceExt, transport::stdio};

#[derive(Parser)]
#[command(name = "eis", about = "EIS projection pipeline CLI and MCP server")]
struct Cli {
    /// Settings file (TOML). Falls back to $EIS_CONFIG, then built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio transport
    Serve,

    /// Validate a measurement batch and project it to a labeled 3D point
    Project {
        /// Batch file (JSON array or query pages)
        file: PathBuf,

        /// Print the point as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the latest entry per test/channel combination
    List {
        /// Combination records file
        file: PathBuf,

        /// Keep combinations whose key contains this test id
        #[arg(long)]
        test_id: Option<String>,

        /// Keep combinations whose key contains this channel id
        #[arg(long)]
        channel_id: Option<String>,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show a measurement series in plot order with its frequency range
    Series {
        /// Measurement series file
        file: PathBuf,
    },

    /// Poll a series file, highlight new points and re-project each snapshot
    Watch {
        /// Measurement series file, rewritten by the fetcher
        file: PathBuf,

        /// Poll interval in milliseconds (overrides settings)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop after this many polls
        #[arg(long)]
        max_polls: Option<u64>,
    },
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::resolve(cli.config.as_deref()).context("failed to load settings")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve => cmd_serve(&cli).await,
        Commands::Project { file, json } => cmd_project(&cli, file, *json),
        Commands::List {
            file,
            test_id,
            channel_id,
            page,
        } => {
            let filter = CombinationFilter {
                test_id: test_id.clone(),
                channel_id: channel_id.clone(),
            };
            cmd_list(&cli, file, &filter, *page)
        }
        Commands::Series { file } => cmd_series(file),
        Commands::Watch {
            file,
            interval_ms,
            max_polls,
        } => cmd_watch(&cli, file, *interval_ms, *max_polls).await,
    }
}

async fn cmd_serve(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    tracing::info!("starting MCP server");

    let server = server::EisServer::new(settings);
    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;
    Ok(())
}

fn cmd_project(cli: &Cli, file: &Path, json: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let pipeline = settings.pipeline();
    let records = load_records(file).context("failed to load batch")?;

    // An empty batch fails validation like a malformed one.
    if !pipeline.validate(&records) {
        anyhow::bail!("processing error: invalid EIS data format in {}", file.display());
    }

    if !pipeline.projector().basis().matches_len(records.len() * 2) {
        tracing::debug!(
            "feature vector has {} entries; projecting over the overlapping prefix",
            records.len() * 2
        );
    }

    let point = pipeline
        .process(&records)
        .context("failed to process EIS data")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&point)?);
    } else {
        println!("x:          {:.6}", point.x);
        println!("y:          {:.6}", point.y);
        println!("z:          {:.6}", point.z);
        println!("distance:   {:.6}", point.distance());
        println!("category:   {}", point.category);
    }
    Ok(())
}

fn cmd_list(cli: &Cli, file: &Path, filter: &CombinationFilter, page: usize) -> Result<()> {
    let settings = load_settings(cli)?;
    let records = load_records(file).context("failed to load combinations")?;

    let combinations = decode_combinations(&records);
    let latest = reduce_to_latest(&filter.apply(&combinations));
    let page = paginate(&latest, page, settings.listing.per_page);

    if page.items.is_empty() {
        println!("no combinations found");
    } else {
        println!("{:<12} {:<12} {:<32} UPDATED", "TEST", "CHANNEL", "FULL KEY");
        for item in &page.items {
            let parsed = item.parse();
            let updated = item
                .updated_at
                .epoch_millis()
                .map(|ms| millis_to_iso8601(ms as i64))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<12} {:<12} {:<32} {}",
                parsed.test_id, parsed.channel_id, parsed.full_key, updated
            );
        }
    }

    if page.total_items > 0 {
        println!(
            "showing {}-{} of {} results (page {}/{})",
            page.first_index, page.last_index, page.total_items, page.page, page.total_pages
        );
    } else {
        println!("no results found");
    }
    Ok(())
}

fn cmd_series(file: &Path) -> Result<()> {
    let records = load_records(file).context("failed to load series")?;
    let series = decode_measurements(&records).context("invalid EIS data format")?;

    println!(
        "{:>6} {:<16} {:>14} {:>12} {:>12}",
        "POINT", "KEY", "FREQUENCY", "ZREAL", "-ZIMG"
    );
    for row in nyquist_rows(&series, &[]) {
        println!(
            "{:>6} {:<16} {:>14.2} {:>12.6} {:>12.6}",
            row.sequence_index, row.source_key, row.frequency, row.z_real, row.neg_z_imag
        );
    }

    match frequency_range(&series) {
        Some((lo, hi)) => println!(
            "{} data points, frequency range: {lo:.2} Hz to {hi:.2} Hz",
            series.len()
        ),
        None => println!("0 data points"),
    }
    Ok(())
}

async fn cmd_watch(
    cli: &Cli,
    file: &Path,
    interval_ms: Option<u64>,
    max_polls: Option<u64>,
) -> Result<()> {
    let settings = load_settings(cli)?;
    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.poll_interval());
    if interval.is_zero() {
        anyhow::bail!("--interval-ms must be at least 1");
    }

    let opts = watch::WatchOptions {
        interval,
        window: settings.highlight_window(),
        max_polls,
    };
    watch::run(file, &settings.pipeline(), &opts).await
}

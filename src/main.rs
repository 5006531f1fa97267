//! Rentsweep main entry point
//!
//! Command-line interface for the rental-listing extraction pipeline.

use clap::Parser;
use rentsweep::config::load_from_env;
use rentsweep::crawler::run_scrape;
use rentsweep::transport::resolve_proxy;
use tracing_subscriber::EnvFilter;

/// Rentsweep: a resilient rental-listing extraction pipeline
///
/// Rentsweep crawls a property search site for rental listings,
/// extracts and validates listing records, deduplicates them, and
/// delivers complete records to a remote sink, buffering locally when
/// the sink is absent or failing. Configuration comes from environment
/// variables; search queries come from the command line.
#[derive(Parser, Debug)]
#[command(name = "rentsweep")]
#[command(version = "1.0.0")]
#[command(about = "A resilient rental-listing extraction pipeline", long_about = None)]
struct Cli {
    /// Search queries: region tokens (e.g. "L4") or full search URLs
    #[arg(value_name = "QUERY", required = true)]
    queries: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the run plan without touching the network
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match load_from_env(cli.queries) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let min_completion_rate = config.min_completion_rate;
    let metrics = run_scrape(config).await?;

    // A poor completion rate is an operational signal, not a crash; it
    // only turns into a non-zero exit when the operator opted in.
    if let Some(threshold) = min_completion_rate {
        let rate = metrics.completion_rate();
        if rate < threshold {
            tracing::error!(
                "completion rate {:.2} below configured threshold {:.2}",
                rate,
                threshold
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rentsweep=info,warn"),
            1 => EnvFilter::new("rentsweep=debug,info"),
            2 => EnvFilter::new("rentsweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the run plan
fn handle_dry_run(config: &rentsweep::config::Config) {
    println!("=== Rentsweep Dry Run ===\n");

    println!("Crawl limits:");
    println!("  Max requests per run: {}", config.max_requests_per_run);
    println!("  Pages per query: {}", config.pages_per_query);
    println!(
        "  Inter-request delay: {}-{}ms",
        config.delay_min_ms, config.delay_max_ms
    );

    println!("\nTransports:");
    let transport = resolve_proxy(config.proxy_spec.as_deref());
    println!("  Proxy: {}", transport.label());
    println!("  Search host: {}", config.search_host);
    println!("  Mobile fallback host: {}", config.mobile_host);

    println!("\nDelivery:");
    match &config.sink_url {
        Some(url) => println!("  Sink: {}", url),
        None => println!("  Sink: none (buffer-only mode)"),
    }
    println!("  Buffer file: {}", config.buffer_path.display());
    match config.min_completion_rate {
        Some(rate) => println!("  Completion-rate floor: {:.2}", rate),
        None => println!("  Completion-rate floor: none"),
    }

    println!("\nQueries ({}):", config.queries.len());
    for query in &config.queries {
        println!("  - {}", query);
    }

    println!("\n✓ Configuration is valid");
}

//! ParaXm main entry point
//!
//! This is the command-line interface for the ParaXm URL parameter hunter.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use paraxm::config::{load_config, validation_errors, ScanConfig};
use paraxm::crawler::{run_scan, ScanReport};
use paraxm::output::{build_handlers, log_statistics, ScanStatistics};
use paraxm::storage::{open_storage, Storage, StorageResult};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const VERSION: &str = "1.0";
const CODENAME: &str = "URL Parameter Hunter";

const BANNER: &str = r"
__________                             ____  ___
\______   \ _____    _______  _____    \   \/  /   _____
 |     ___/ \__  \   \_  __ \ \__  \    \     /   /     \
 |    |      / __ \_  |  | \/  / __ \_  /     \  |  Y Y  \
 |____|     (____  /  |__|    (____  / /___/\  \ |__|_|  /
                 \/                \/        \_/       \/";

const USAGE: &str = "Usage: paraxm [options]

Options:
  -u, --url         Target URL to scan (e.g., https://example.com)
  -o, --output      Output file to save results
  -d, --depth       Crawling depth (default: 2)
  -t, --threads     Number of concurrent threads (default: 10)
      --ratelimit   Maximum requests per second (0 for unlimited) (default: 0)
      --timeout     Request timeout in seconds (default: 10)
  -p, --proxy       Proxy URL (e.g., http://127.0.0.1:8080)
  -r, --retries     Max retries for failed requests (default: 2)
  -f, --follow      Follow redirects (true/false) (default: true)
      --config      TOML file with scan settings (flags override it)
      --summary     Write a markdown report to this file
      --database    Record the scan in this SQLite database
      --stats       Summarize the scans recorded in --database and exit
  -v, --verbose     Increase logging verbosity (-v, -vv, -vvv)
  -q, --quiet       Only log errors
  -h, --help        Show this help message

Examples:
  paraxm -u https://example.com -o results.txt
  paraxm -u https://example.com --ratelimit 5 -o results.txt
  paraxm -u https://example.com -d 10 -o results.txt
  paraxm -u https://example.com -p http://127.0.0.1:8080 -f false
";

/// ParaXm: crawls a site and lists the URL parameters it accepts
///
/// Every flag is optional on the command line; values given here override the
/// ones read from `--config`.
#[derive(Parser, Debug)]
#[command(name = "paraxm")]
#[command(version = VERSION)]
#[command(about = "URL parameter hunter", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Target URL to scan
    #[arg(short = 'u', long = "url", value_name = "URL")]
    url: Option<String>,

    /// Output file receiving one `<url>?<param>=FUZZ` line per finding
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<String>,

    /// Crawling depth (values below 1 crawl nothing)
    #[arg(short = 'd', long = "depth", allow_negative_numbers = true)]
    depth: Option<i64>,

    /// Number of concurrent fetches
    #[arg(short = 't', long = "threads", allow_negative_numbers = true)]
    threads: Option<i64>,

    /// Maximum requests per second (0 for unlimited)
    #[arg(long = "ratelimit", allow_negative_numbers = true)]
    rate_limit: Option<f64>,

    /// Request timeout in seconds
    #[arg(long = "timeout", allow_negative_numbers = true)]
    timeout: Option<i64>,

    /// Proxy URL
    #[arg(short = 'p', long = "proxy")]
    proxy: Option<String>,

    /// Max retries for failed requests
    #[arg(short = 'r', long = "retries", allow_negative_numbers = true)]
    retries: Option<i64>,

    /// Follow redirects
    #[arg(short = 'f', long = "follow", action = clap::ArgAction::Set)]
    follow: Option<bool>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Markdown report path
    #[arg(long, value_name = "FILE")]
    summary: Option<String>,

    /// SQLite database path
    #[arg(long, value_name = "FILE")]
    database: Option<String>,

    /// Summarize the scans recorded in the database and exit
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show this help message
    #[arg(short = 'h', long = "help")]
    help: bool,
}

#[tokio::main]
async fn main() {
    print_banner();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            let _ = e.print();
            return;
        }
        Err(e) => {
            print!("{}", USAGE);
            println!();
            let rendered = e.to_string();
            let message = rendered.lines().next().unwrap_or_default();
            print_error(message.trim_start_matches("error: "));
            return;
        }
    };

    if cli.help || std::env::args_os().len() <= 1 {
        print!("{}", USAGE);
        return;
    }

    setup_logging(cli.verbose, cli.quiet);

    if cli.stats {
        if let Err(e) = handle_stats(&cli) {
            print_error(&format!("{:#}", e));
        }
        return;
    }

    if let Err(e) = handle_scan(cli).await {
        print_error(&format!("{:#}", e));
    }
}

fn print_banner() {
    println!("{}", BANNER);
    println!("\nParaXm v{} - {}\n", VERSION, CODENAME);
}

fn print_info(message: &str) {
    println!("[INFO] {}", message);
}

fn print_found(message: &str) {
    println!("[FOUND] {}", message);
}

fn print_error(message: &str) {
    println!("[ERROR] {}", message);
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; the tagged console lines on stdout stay clean.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("paraxm=info,warn"),
            1 => EnvFilter::new("paraxm=debug,info"),
            2 => EnvFilter::new("paraxm=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers the command-line flags over the configuration file (or defaults)
///
/// Returns the effective settings plus any flag values that cannot be
/// represented at all (negative counts).
fn build_config(cli: &Cli) -> anyhow::Result<(ScanConfig, Vec<String>)> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => ScanConfig::default(),
    };
    let mut errors = Vec::new();

    if let Some(url) = &cli.url {
        config.target = url.clone();
    }
    if let Some(output) = &cli.output {
        config.output_file = Some(output.clone());
    }
    if let Some(depth) = cli.depth {
        match u32::try_from(depth.max(0)) {
            Ok(depth) => config.depth = depth,
            Err(_) => errors.push(format!("Depth must be at most {}", u32::MAX)),
        }
    }
    if let Some(threads) = cli.threads {
        match u32::try_from(threads) {
            Ok(threads) => config.threads = threads,
            Err(_) => errors.push("Threads must be between 1 and 100".to_string()),
        }
    }
    if let Some(rate_limit) = cli.rate_limit {
        config.rate_limit = rate_limit;
    }
    if let Some(timeout) = cli.timeout {
        match u64::try_from(timeout) {
            Ok(timeout) => config.timeout = timeout,
            Err(_) => errors.push("Timeout must be between 1 and 60 seconds".to_string()),
        }
    }
    if let Some(proxy) = &cli.proxy {
        config.proxy = Some(proxy.clone()).filter(|p| !p.is_empty());
    }
    if let Some(retries) = cli.retries {
        match u32::try_from(retries) {
            Ok(retries) => config.max_retries = retries,
            Err(_) => errors.push("Max retries must be between 0 and 10".to_string()),
        }
    }
    if let Some(follow) = cli.follow {
        config.follow_redirects = follow;
    }
    if let Some(summary) = &cli.summary {
        config.summary_file = Some(summary.clone());
    }
    if let Some(database) = &cli.database {
        config.database = Some(database.clone());
    }

    Ok((config, errors))
}

/// Handles the --stats mode: summarizes the database without scanning
fn handle_stats(cli: &Cli) -> anyhow::Result<()> {
    let (config, _) = build_config(cli)?;
    let Some(database) = config.database.as_deref() else {
        print_error("--stats requires --database (or `database` in --config)");
        return Ok(());
    };

    print_info(&format!("Database: {}", database));
    let storage = open_storage(Path::new(database))
        .with_context(|| format!("Failed to open database {}", database))?;

    for line in database_summary(&storage)? {
        println!("{}", line);
    }
    Ok(())
}

/// Console lines describing the recorded scans and the latest scan's findings
fn database_summary(storage: &dyn Storage) -> StorageResult<Vec<String>> {
    let mut lines = vec![format!("[INFO] Scans recorded: {}", storage.count_scans()?)];

    let Some(scan) = storage.get_latest_scan()? else {
        return Ok(lines);
    };

    lines.push(format!(
        "[INFO] Latest scan #{}: {} ({})",
        scan.id,
        scan.target,
        scan.status.to_db_string()
    ));
    lines.push(format!(
        "[INFO] Started: {}, finished: {}",
        scan.started_at,
        scan.finished_at.as_deref().unwrap_or("-")
    ));
    lines.push(format!("[INFO] Parameters: {}", storage.count_findings(scan.id)?));

    let mut by_source: Vec<_> = storage.count_findings_by_source(scan.id)?.into_iter().collect();
    by_source.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    for (source, count) in by_source {
        lines.push(format!("[INFO]   {}: {}", source, count));
    }

    for finding in storage.get_findings(scan.id)? {
        lines.push(format!("[FOUND] {}", finding.fuzz_line()));
    }
    Ok(lines)
}

/// Handles the main scan operation
async fn handle_scan(cli: Cli) -> anyhow::Result<()> {
    let (config, mut errors) = build_config(&cli)?;
    errors.extend(validation_errors(&config));

    if !errors.is_empty() {
        for error in &errors {
            print_error(error);
        }
        return Ok(());
    }

    print_info(&format!("Target: {}", config.target));
    print_info("Starting scan...");
    tracing::info!(
        "Depth: {}, threads: {}, rate limit: {}/s, retries: {}",
        config.depth,
        config.threads,
        config.rate_limit,
        config.max_retries
    );

    let report = run_scan(config.clone()).await.context("Scan failed")?;

    print_findings(&report);
    write_outputs(&config, &report);
    log_statistics(&ScanStatistics::from_report(&report));

    Ok(())
}

fn print_findings(report: &ScanReport) {
    if report.findings.is_empty() {
        print_info("No parameters found.");
        return;
    }

    print_info(&format!("Found {} parameters:", report.findings.len()));
    for finding in &report.findings {
        print_found(&finding.fuzz_line());
    }
}

/// Writes every requested output; a failing handler does not stop the others
fn write_outputs(config: &ScanConfig, report: &ScanReport) {
    let handlers = match build_handlers(config) {
        Ok(handlers) => handlers,
        Err(e) => {
            print_error(&format!("Failed to prepare outputs: {}", e));
            return;
        }
    };

    for handler in handlers {
        if let Err(e) = handler.write_report(report) {
            print_error(&format!("Failed to write {} output: {}", handler.name(), e));
            continue;
        }
        tracing::debug!("Wrote {} output", handler.name());

        if handler.name() == "text" {
            if let Some(path) = &config.output_file {
                print_info(&format!("Results saved to: {}", path));
            }
        }
    }
}

//! Waczgen command-line interface

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use waczgen::config::load_config;
use waczgen::generator::Submission;
use waczgen::model::{CrawlOptions, RequestStatus};
use waczgen::storage::PageStats;
use waczgen::{Config, CrawlRequest, WaczGenerator};

/// Waczgen: a WACZ web archive generator
///
/// Crawls a seed URL breadth-first and packages the captured pages into a
/// signed WACZ archive.
#[derive(Parser, Debug)]
#[command(name = "waczgen")]
#[command(version = "1.0.0")]
#[command(about = "Generate WACZ web archives from crawled sites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a new archive request
    Submit {
        /// Seed URL to crawl
        url: String,

        /// Archive title
        #[arg(short, long)]
        title: String,

        /// Archive description
        #[arg(short, long)]
        description: Option<String>,

        /// Maximum link depth (1-10)
        #[arg(long, default_value_t = 2)]
        max_depth: u32,

        /// Maximum pages to capture (1-10000)
        #[arg(long, default_value_t = 100)]
        max_pages: u32,

        /// Delay between fetches in milliseconds (500-30000)
        #[arg(long, default_value_t = 1000)]
        crawl_delay_ms: u64,

        /// Follow links to other hosts
        #[arg(long)]
        follow_external: bool,

        /// Skip image capture
        #[arg(long)]
        no_images: bool,

        /// Skip stylesheet capture
        #[arg(long)]
        no_css: bool,

        /// Skip script capture
        #[arg(long)]
        no_js: bool,

        /// Exact URLs to exclude (repeatable)
        #[arg(long = "exclude-url")]
        exclude_urls: Vec<String>,

        /// Glob patterns of URLs to exclude (repeatable)
        #[arg(long = "exclude-pattern")]
        exclude_patterns: Vec<String>,
    },

    /// Process one pending request by ID
    Process {
        /// Request ID
        id: i64,
    },

    /// Poll for pending requests and process them
    Worker,

    /// Show a request and its page counts
    Status {
        /// Request ID
        id: i64,
    },

    /// List requests
    List {
        /// Filter by status (pending, processing, completed, failed)
        #[arg(long)]
        status: Option<String>,
    },

    /// Return stuck processing requests to the queue
    ResetStuck {
        /// Override the configured stuck threshold in minutes
        #[arg(long)]
        timeout_minutes: Option<u64>,

        /// Report how many would be reset without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete a request, its pages, and its archive file
    Delete {
        /// Request ID
        id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };

    let generator = WaczGenerator::new(config)?;

    match cli.command {
        Command::Submit {
            url,
            title,
            description,
            max_depth,
            max_pages,
            crawl_delay_ms,
            follow_external,
            no_images,
            no_css,
            no_js,
            exclude_urls,
            exclude_patterns,
        } => {
            let options = CrawlOptions {
                follow_external_links: follow_external,
                include_images: !no_images,
                include_css: !no_css,
                include_js: !no_js,
                exclude_urls,
                exclude_patterns,
            };
            let id = generator.submit(Submission {
                url,
                title,
                description,
                max_depth,
                max_pages,
                crawl_delay_ms,
                options,
            })?;
            println!("Submitted request {}", id);
        }

        Command::Process { id } => {
            let request = generator.process_request(id).await?;
            println!(
                "Request {} completed: {}",
                id,
                request.file_path.as_deref().unwrap_or("(no file)")
            );
        }

        Command::Worker => {
            generator.run_worker().await?;
        }

        Command::Status { id } => {
            let (request, stats) = generator.status(id)?;
            print_status(&request, stats);
        }

        Command::List { status } => {
            let filter = match status.as_deref() {
                Some(s) => match RequestStatus::from_db_string(s) {
                    Some(status) => Some(status),
                    None => bail!("unknown status: {}", s),
                },
                None => None,
            };
            let requests = generator.list(filter)?;
            if requests.is_empty() {
                println!("No requests found");
            }
            for request in requests {
                println!(
                    "{:>5}  {:<10}  {}  {}",
                    request.id,
                    request.status.to_db_string(),
                    request.created_at.format("%Y-%m-%d %H:%M:%S"),
                    request.url
                );
            }
        }

        Command::ResetStuck {
            timeout_minutes,
            dry_run,
        } => {
            let count = generator.reset_stuck(timeout_minutes, dry_run)?;
            if dry_run {
                println!("{} stuck request(s) would be reset", count);
            } else {
                println!("Reset {} stuck request(s)", count);
            }
        }

        Command::Delete { id } => {
            generator.delete(id)?;
            println!("Deleted request {}", id);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("waczgen=info,warn"),
            1 => EnvFilter::new("waczgen=debug,info"),
            2 => EnvFilter::new("waczgen=trace,debug"),
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

fn print_status(request: &CrawlRequest, stats: PageStats) {
    println!("Request {}", request.id);
    println!("  URL:        {}", request.url);
    println!("  Title:      {}", request.title);
    println!("  Status:     {}", request.status.to_db_string());
    println!(
        "  Created:    {}",
        request.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(started) = request.started_at {
        println!("  Started:    {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(completed) = request.completed_at {
        println!("  Completed:  {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }
    println!(
        "  Pages:      {} total, {} ok, {} failed",
        stats.total, stats.successful, stats.failed
    );
    if let Some(path) = &request.file_path {
        println!("  Archive:    {}", path);
    }
    if let Some(size) = request.file_size {
        println!("  Size:       {} bytes", size);
    }
    if let Some(error) = &request.error_message {
        println!("  Error:      {}", error);
    }
}

//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod search;
mod serve;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use jobharvest::config::load_settings;
use jobharvest::models::SearchRequest;

#[derive(Parser)]
#[command(name = "jobharvest")]
#[command(about = "Job listing harvester with a cached HTTP API")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default from config, else 127.0.0.1:3030)
        bind: Option<String>,
    },

    /// Run one search and print the results as JSON
    Search(SearchArgs),
}

/// Search parameters; anything omitted falls back to the configured defaults.
#[derive(Args)]
struct SearchArgs {
    /// Search keywords
    #[arg(short, long)]
    keyword: Option<String>,
    /// Location text
    #[arg(short, long)]
    location: Option<String>,
    /// Posting age: "past month", "past week", or "24hr"
    #[arg(long)]
    date_since_posted: Option<String>,
    /// Job type: full time, part time, contract, temporary, volunteer, internship
    #[arg(long)]
    job_type: Option<String>,
    /// Workplace: on site, remote, or hybrid
    #[arg(long)]
    remote_filter: Option<String>,
    /// Minimum salary: 40000, 60000, 80000, 100000, or 120000
    #[arg(long)]
    salary: Option<String>,
    /// Experience: internship, entry level, associate, senior, director, executive
    #[arg(long)]
    experience_level: Option<String>,
    /// Ordering: recent or relevant
    #[arg(long)]
    sort_by: Option<String>,
    /// Maximum number of records (0 = no limit)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
    /// Zero-based page offset
    #[arg(short, long)]
    page: Option<u32>,
    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

impl SearchArgs {
    fn to_request(&self) -> SearchRequest {
        SearchRequest {
            keyword: self.keyword.clone(),
            location: self.location.clone(),
            date_since_posted: self.date_since_posted.clone(),
            job_type: self.job_type.clone(),
            remote_filter: self.remote_filter.clone(),
            salary: self.salary.clone(),
            experience_level: self.experience_level.clone(),
            sort_by: self.sort_by.clone(),
            limit: self.limit,
            page: self.page,
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (settings, _config) = load_settings(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Search(args) => {
            search::cmd_search(&settings, args.to_request(), args.compact).await
        }
    }
}

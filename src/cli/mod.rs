pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kiosk")]
#[command(about = "A caching news aggregation engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show top headlines for the given filters
    Headlines {
        /// Comma-separated categories (e.g. "technology,science")
        #[arg(short, long)]
        categories: Option<String>,
        /// Comma-separated source identifiers; excludes country and
        /// category filters
        #[arg(short, long)]
        sources: Option<String>,
        /// Comma-separated country codes (defaults to "us")
        #[arg(long)]
        countries: Option<String>,
        /// Comma-separated language codes
        #[arg(short, long)]
        languages: Option<String>,
    },
    /// Search all articles by keyword
    Search {
        /// Search keyword
        keyword: String,
        /// Comma-separated source identifiers
        #[arg(short, long)]
        sources: Option<String>,
    },
    /// List the provider's available sources
    Sources,
    /// Show headlines for a configured user's preferences
    Feed {
        /// User name as configured under [preferences.<user>]
        user: String,
    },
    /// Probe upstream reachability once
    Check,
    /// Run the refresh scheduler in the foreground
    Run {
        /// Warm refresh interval (e.g. "1h", "30m")
        #[arg(long)]
        warm_interval: Option<String>,
        /// Probe interval (e.g. "10m")
        #[arg(long)]
        probe_interval: Option<String>,
        /// Skip the warm refresh on start
        #[arg(long)]
        no_initial_refresh: bool,
    },
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sfreport::StatusFilter;

#[derive(Parser)]
#[command(
    name = "sfreport",
    version,
    about = "Screaming Frog crawls to accessibility/SEO Excel reports"
)]
pub struct CliArgs {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Crawl a site with Screaming Frog and build a report
    Crawl {
        /// Start URL of the crawl
        url: String,

        /// Output workbook
        #[arg(short, long, default_value = "report.xlsx")]
        output: PathBuf,

        /// Screaming Frog crawl config (.seospiderconfig)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to the Screaming Frog binary
        #[arg(long)]
        sf_binary: Option<PathBuf>,

        /// Keep the CSV exports under the exports folder
        #[arg(long, default_value_t = false)]
        keep_exports: bool,
    },

    /// Build a report from an existing folder of CSV exports
    Report {
        /// Folder containing Screaming Frog CSV exports
        export_dir: PathBuf,

        /// Output workbook
        #[arg(short, long, default_value = "report.xlsx")]
        output: PathBuf,
    },

    /// Build a report from a saved crawl (.seospider / .dbseospider)
    FromDb {
        /// Saved crawl file
        crawl_file: PathBuf,

        /// Output workbook
        #[arg(short, long, default_value = "report.xlsx")]
        output: PathBuf,

        /// Path to the Screaming Frog binary
        #[arg(long)]
        sf_binary: Option<PathBuf>,

        /// Keep the CSV exports under the exports folder
        #[arg(long, default_value_t = false)]
        keep_exports: bool,
    },

    /// Export inlinks from a saved crawl, filtered by response status
    Inlinks {
        /// Saved crawl file
        crawl_file: PathBuf,

        /// Response status filter (all, 2xx, 3xx, 4xx, 5xx)
        #[arg(short, long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,

        /// Internal links only
        #[arg(long, default_value_t = false, conflicts_with = "external")]
        internal: bool,

        /// External links only
        #[arg(long, default_value_t = false)]
        external: bool,

        /// Output folder for the CSVs (defaults to <exports>/<crawl file stem>)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Path to the Screaming Frog binary
        #[arg(long)]
        sf_binary: Option<PathBuf>,
    },

    /// Run Screaming Frog with raw arguments
    Sf {
        /// Path to the Screaming Frog binary
        #[arg(long)]
        sf_binary: Option<PathBuf>,

        /// Arguments passed through unchanged
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

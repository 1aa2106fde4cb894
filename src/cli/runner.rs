use std::path::{Path, PathBuf};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sfreport::api::{self, ExportFolder, ReportSummary};
use sfreport::config::{ConfigSources, Settings, resolve_binary};
use sfreport::io::SeoSpider;
use sfreport::types::LinkScope;

use super::args::{CliArgs, Command};
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn spider(sf_binary: Option<&Path>, sources: &ConfigSources) -> Result<SeoSpider, AppError> {
    let binary = resolve_binary(sf_binary, sources)?;
    debug!("Using Screaming Frog at {:?}", binary);
    Ok(SeoSpider::new(binary))
}

fn export_folder(keep: bool, kept_path: PathBuf) -> Result<ExportFolder, AppError> {
    if keep {
        Ok(ExportFolder::kept(kept_path))
    } else {
        Ok(ExportFolder::temporary()?)
    }
}

fn log_summary(summary: &ReportSummary) {
    info!(
        "Report saved: {:?} ({} issue types, {} violation types, {} pages, {} page sheets)",
        summary.output,
        summary.issue_types,
        summary.violation_types,
        summary.pages,
        summary.page_sheets
    );
}

fn log_kept(folder: &ExportFolder) {
    if let ExportFolder::Kept(path) = folder {
        info!("Exports kept in {:?}", path);
    }
}

pub fn run(args: CliArgs) -> Result<i32, AppError> {
    init_logging(args.verbose);
    let sources = ConfigSources::discover();

    match args.command {
        Command::Crawl {
            url,
            output,
            config,
            sf_binary,
            keep_exports,
        } => {
            let settings = Settings::load(&sources)?;
            let spider = spider(sf_binary.as_deref(), &sources)?;
            let config = config.or_else(|| settings.default_seospider_config());
            match &config {
                Some(path) => info!("Crawl config: {:?}", path),
                None => info!("No crawl config; Screaming Frog defaults apply"),
            }
            let folder = export_folder(
                keep_exports,
                api::exports_dir_for_url(&settings.exports_root(), &url),
            )?;
            let summary =
                api::crawl_to_report(&spider, &url, config.as_deref(), &folder, &output)?;
            log_summary(&summary);
            log_kept(&folder);
        }
        Command::Report { export_dir, output } => {
            if !export_dir.is_dir() {
                return Err(AppError::NotADirectory { path: export_dir });
            }
            let summary = api::generate_report(&export_dir, &output)?;
            log_summary(&summary);
        }
        Command::FromDb {
            crawl_file,
            output,
            sf_binary,
            keep_exports,
        } => {
            api::ensure_input(&crawl_file)?;
            let settings = Settings::load(&sources)?;
            let spider = spider(sf_binary.as_deref(), &sources)?;
            let folder = export_folder(
                keep_exports,
                api::exports_dir_for_crawl_file(&settings.exports_root(), &crawl_file),
            )?;
            let summary = api::crawl_file_to_report(&spider, &crawl_file, &folder, &output)?;
            log_summary(&summary);
            log_kept(&folder);
        }
        Command::Inlinks {
            crawl_file,
            status,
            internal,
            external,
            output_dir,
            sf_binary,
        } => {
            api::ensure_input(&crawl_file)?;
            let output_dir = match output_dir {
                Some(dir) => dir,
                None => {
                    let settings = Settings::load(&sources)?;
                    api::exports_dir_for_crawl_file(&settings.exports_root(), &crawl_file)
                }
            };
            let spider = spider(sf_binary.as_deref(), &sources)?;
            let scope = LinkScope::from_flags(internal, external);
            api::export_inlinks(&spider, &crawl_file, &output_dir, status, scope)?;
        }
        Command::Sf { sf_binary, args } => {
            let spider = spider(sf_binary.as_deref(), &sources)?;
            return Ok(spider.run_raw(&args)?);
        }
    }

    Ok(0)
}

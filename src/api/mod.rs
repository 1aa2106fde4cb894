//! High-level, ergonomic library API: build a report from an export folder, or
//! run Screaming Frog first and report on what it exported. Prefer these entry
//! points over the low-level `core` and `io` modules when embedding sfreport.
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

use crate::core::aggregate::{Aggregation, aggregate};
use crate::core::urls;
use crate::error::{Error, Result};
use crate::io::crawler::SeoSpider;
use crate::io::exports::ExportSet;
use crate::io::writers::write_workbook;
use crate::types::{LinkScope, StatusFilter};

/// Outcome of a report run
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub output: PathBuf,
    pub issue_types: usize,
    pub violation_types: usize,
    pub pages: usize,
    pub page_sheets: usize,
    pub duplicates_collapsed: usize,
    /// Sheet names in workbook order
    pub sheets: Vec<String>,
}

/// Load and aggregate every export in `export_dir`.
///
/// Fails with [`Error::NoValidRows`] when no export yields a single valid row.
pub fn load_report_data(export_dir: &Path) -> Result<Aggregation> {
    if !export_dir.is_dir() {
        return Err(Error::InputNotFound {
            path: export_dir.to_path_buf(),
        });
    }
    let exports = ExportSet::load(export_dir)?;
    if exports.valid_rows() == 0 {
        return Err(Error::NoValidRows {
            dir: export_dir.to_path_buf(),
        });
    }

    match &exports.issues_overview {
        Some(rows) => info!("Issues overview: {} issue types", rows.len()),
        None => warn!("No Issues Overview CSV found; summary built from issue reports only"),
    }
    match (&exports.accessibility_summary, &exports.violations) {
        (Some(rows), _) => info!("Accessibility summary: {} rows (from export)", rows.len()),
        (None, Some(rows)) => info!("Accessibility violations: {} rows", rows.len()),
        (None, None) => warn!("No accessibility exports found"),
    }

    let agg = aggregate(&exports);
    info!("Per-page data for {} pages", agg.pages.len());
    Ok(agg)
}

/// Generate an Excel report from existing CSV exports.
pub fn generate_report(export_dir: &Path, output: &Path) -> Result<ReportSummary> {
    let agg = load_report_data(export_dir)?;
    let layout = write_workbook(&agg, output)?;

    let summary = ReportSummary {
        output: output.to_path_buf(),
        issue_types: agg.issues.len(),
        violation_types: agg.violations.len(),
        pages: agg.pages.len(),
        page_sheets: agg.groups.len(),
        duplicates_collapsed: agg.duplicates_collapsed(),
        sheets: layout.sheet_names(),
    };
    info!("Pages index: {} pages", summary.pages);
    info!(
        "Per-page sheets: {} unique ({} duplicates collapsed)",
        summary.page_sheets, summary.duplicates_collapsed
    );
    Ok(summary)
}

/// Folder receiving crawler exports: kept on disk, or a temporary directory
/// removed when this value is dropped.
#[derive(Debug)]
pub enum ExportFolder {
    Kept(PathBuf),
    Temporary(TempDir),
}

impl ExportFolder {
    pub fn kept<P: Into<PathBuf>>(path: P) -> Self {
        ExportFolder::Kept(path.into())
    }

    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("sfreport_").tempdir()?;
        Ok(ExportFolder::Temporary(dir))
    }

    pub fn path(&self) -> &Path {
        match self {
            ExportFolder::Kept(path) => path,
            ExportFolder::Temporary(dir) => dir.path(),
        }
    }
}

/// `<root>/<domain>` for exports of a fresh crawl.
pub fn exports_dir_for_url(root: &Path, url: &str) -> PathBuf {
    root.join(urls::host_of(url).unwrap_or_else(|| "unknown".to_string()))
}

/// `<root>/<crawl file stem>` for exports of a saved crawl.
pub fn exports_dir_for_crawl_file(root: &Path, crawl_file: &Path) -> PathBuf {
    let stem = crawl_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "crawl".to_string());
    root.join(stem)
}

/// Fail early when a crawl file given on the command line does not exist.
pub fn ensure_input(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::InputNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Run a fresh headless crawl of `url` and build the report from its exports.
pub fn crawl_to_report(
    spider: &SeoSpider,
    url: &str,
    config: Option<&Path>,
    folder: &ExportFolder,
    output: &Path,
) -> Result<ReportSummary> {
    spider.crawl(url, folder.path(), config)?;
    generate_report(folder.path(), output)
}

/// Re-export a saved crawl and build the report from its exports.
pub fn crawl_file_to_report(
    spider: &SeoSpider,
    crawl_file: &Path,
    folder: &ExportFolder,
    output: &Path,
) -> Result<ReportSummary> {
    spider.export_crawl_file(crawl_file, folder.path())?;
    generate_report(folder.path(), output)
}

/// Export inlinks from a saved crawl; returns the CSV files written.
pub fn export_inlinks(
    spider: &SeoSpider,
    crawl_file: &Path,
    output_dir: &Path,
    status: StatusFilter,
    scope: LinkScope,
) -> Result<Vec<PathBuf>> {
    let files = spider.export_inlinks(crawl_file, output_dir, status, scope)?;
    info!("Inlinks exported to {:?} ({} files)", output_dir, files.len());
    Ok(files)
}

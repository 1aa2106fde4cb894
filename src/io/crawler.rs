//! Headless Screaming Frog SEO Spider invocation.
//!
//! Every command blocks until the crawler exits. Report-producing commands then
//! check that CSV exports actually landed in the output folder.
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::urls;
use crate::error::{Error, Result};
use crate::types::{LinkScope, StatusFilter};

/// `--save-report` value: issues overview and the accessibility summary
pub const SAVE_REPORTS: &str = "Issues Overview,Accessibility:Accessibility Violations Summary";
/// `--bulk-export` value: per-page violations and per-issue page lists
pub const BULK_EXPORTS: &str = "Accessibility:All Violations,Issues:All";
/// `--export-tabs` value: the internal page list
pub const EXPORT_TABS: &str = "Internal:All";

/// Bulk export name for inlinks filtered by response status and link scope.
pub fn inlinks_export_name(status: StatusFilter, scope: LinkScope) -> String {
    match (status, scope) {
        (StatusFilter::All, LinkScope::Both) => "Links:All Inlinks".to_string(),
        (status, scope) => format!(
            "Response Codes:{}:{} Inlinks",
            scope.export_label(),
            status.export_label()
        ),
    }
}

/// Flags shared by fresh crawls and crawl-file re-exports.
pub fn report_export_args(output_dir: &Path) -> Vec<OsString> {
    vec![
        "--headless".into(),
        "--output-folder".into(),
        output_dir.as_os_str().to_os_string(),
        "--overwrite".into(),
        "--save-report".into(),
        SAVE_REPORTS.into(),
        "--bulk-export".into(),
        BULK_EXPORTS.into(),
        "--export-tabs".into(),
        EXPORT_TABS.into(),
    ]
}

pub fn crawl_args(url: &str, output_dir: &Path, config: Option<&Path>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--crawl".into(), url.into()];
    args.extend(report_export_args(output_dir));
    if let Some(config) = config {
        args.push("--config".into());
        args.push(config.as_os_str().to_os_string());
    }
    args
}

pub fn load_crawl_args(crawl_file: &Path, output_dir: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--load-crawl".into(), crawl_file.as_os_str().to_os_string()];
    args.extend(report_export_args(output_dir));
    args
}

pub fn inlinks_args(
    crawl_file: &Path,
    output_dir: &Path,
    status: StatusFilter,
    scope: LinkScope,
) -> Vec<OsString> {
    vec![
        "--load-crawl".into(),
        crawl_file.as_os_str().to_os_string(),
        "--headless".into(),
        "--output-folder".into(),
        output_dir.as_os_str().to_os_string(),
        "--overwrite".into(),
        "--bulk-export".into(),
        inlinks_export_name(status, scope).into(),
    ]
}

/// All CSV files below `dir`, sorted. Symlinks are not followed.
pub fn find_csv_exports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn display_command(binary: &Path, args: &[OsString]) -> String {
    std::iter::once(binary.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Handle to a resolved SEO Spider binary
#[derive(Debug, Clone)]
pub struct SeoSpider {
    binary: PathBuf,
}

impl SeoSpider {
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Crawl `url` headless and export reports into `output_dir`.
    pub fn crawl(&self, url: &str, output_dir: &Path, config: Option<&Path>) -> Result<Vec<PathBuf>> {
        if !urls::is_url(url) {
            return Err(Error::InvalidArgument {
                arg: "url",
                value: url.to_string(),
            });
        }
        if let Some(config) = config {
            if !config.is_file() {
                return Err(Error::ConfigNotFound {
                    path: config.to_path_buf(),
                });
            }
        }
        fs::create_dir_all(output_dir)?;
        info!("Starting crawl of {} -> {:?}", url, output_dir);
        self.run_captured(&crawl_args(url, output_dir, config))?;
        self.expect_exports(output_dir)
    }

    /// Re-export reports from a saved `.seospider`/`.dbseospider` crawl.
    pub fn export_crawl_file(&self, crawl_file: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        ensure_crawl_file(crawl_file)?;
        fs::create_dir_all(output_dir)?;
        info!("Exporting from {:?} -> {:?}", crawl_file, output_dir);
        self.run_captured(&load_crawl_args(crawl_file, output_dir))?;
        self.expect_exports(output_dir)
    }

    /// Export inlinks from a saved crawl, filtered by status and scope.
    pub fn export_inlinks(
        &self,
        crawl_file: &Path,
        output_dir: &Path,
        status: StatusFilter,
        scope: LinkScope,
    ) -> Result<Vec<PathBuf>> {
        ensure_crawl_file(crawl_file)?;
        fs::create_dir_all(output_dir)?;
        info!(
            "Exporting {} {} inlinks from {:?} -> {:?}",
            status, scope, crawl_file, output_dir
        );
        self.run_captured(&inlinks_args(crawl_file, output_dir, status, scope))?;
        self.expect_exports(output_dir)
    }

    /// Run the binary with raw arguments and inherited stdio; returns its exit code.
    pub fn run_raw(&self, args: &[String]) -> Result<i32> {
        let os_args: Vec<OsString> = args.iter().map(OsString::from).collect();
        info!("Running: {}", display_command(&self.binary, &os_args));
        let status = Command::new(&self.binary)
            .args(&os_args)
            .status()
            .map_err(|e| Error::external(format!("could not start {:?}: {e}", self.binary)))?;
        // Killed by a signal: report a generic failure.
        Ok(status.code().unwrap_or(1))
    }

    fn run_captured(&self, args: &[OsString]) -> Result<()> {
        debug!("Command: {}", display_command(&self.binary, args));
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::external(format!("could not start {:?}: {e}", self.binary)))?;

        if !output.status.success() {
            let message = match output.status.code() {
                Some(code) => format!("exited with code {code}"),
                None => "terminated by a signal".to_string(),
            };
            return Err(Error::ExternalTool {
                message,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        info!("Screaming Frog finished");
        Ok(())
    }

    fn expect_exports(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let exports = find_csv_exports(output_dir)?;
        if exports.is_empty() {
            return Err(Error::external(format!(
                "no CSV exports were written to {}",
                output_dir.display()
            )));
        }
        debug!("{} CSV exports in {:?}", exports.len(), output_dir);
        Ok(exports)
    }
}

fn ensure_crawl_file(crawl_file: &Path) -> Result<()> {
    if crawl_file.exists() {
        Ok(())
    } else {
        Err(Error::InputNotFound {
            path: crawl_file.to_path_buf(),
        })
    }
}

//! Readers for Screaming Frog CSV exports.
//!
//! Each export is located by filename pattern inside the export folder and parsed
//! into typed rows. Malformed records and rows without a usable URL are skipped
//! with a warning; only a folder with no valid rows at all is an error (raised by
//! the report builder).
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, warn};

use crate::core::urls;
use crate::error::{Error, Result};

const URL_COLUMNS: &[&str] = &["Address", "URL"];
const ISSUE_NAME_COLUMNS: &[&str] = &["Issue", "Violation", "Issue Name"];
const PRIORITY_COLUMNS: &[&str] = &["Priority", "Issue Priority", "User Impact", "Impact"];
const GUIDELINE_COLUMNS: &[&str] = &["Guidelines", "Guideline", "WCAG"];
const COUNT_COLUMNS: &[&str] = &["URLs", "Count", "Occurrences"];
const PERCENT_COLUMNS: &[&str] = &["% of Total", "Percentage"];

// Columns that carry no per-page detail in issue reports
const DETAIL_SKIP_COLUMNS: &[&str] = &["Indexability", "Indexability Status"];

pub const ISSUE_REPORTS_DIR: &str = "issues_reports";

const ISSUES_OVERVIEW_PATTERNS: &[&str] = &["*ssues*verview*.csv", "*issues*.csv"];
const VIOLATIONS_PATTERNS: &[&str] = &["*all_violations*.csv", "*ccessibility*iolation*.csv"];
const ACCESSIBILITY_SUMMARY_PATTERNS: &[&str] = &["*ccessibility*ummary*.csv"];
const INTERNAL_PATTERNS: &[&str] = &["*internal_all*.csv", "*nternal*ll*.csv"];

/// A parsed CSV file with trimmed headers and the physical line of each record
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

#[derive(Debug, Clone)]
pub struct CsvRow {
    pub line: u64,
    pub cells: Vec<String>,
}

impl CsvRow {
    /// Trimmed cell at `idx`, empty when the column is absent or the row is short.
    pub fn get(&self, idx: Option<usize>) -> &str {
        idx.and_then(|i| self.cells.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

impl CsvTable {
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(file);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            // Header is line 1
            let fallback_line = idx as u64 + 2;
            match record {
                Ok(record) => rows.push(CsvRow {
                    line: record.position().map(|p| p.line()).unwrap_or(fallback_line),
                    cells: record.iter().map(str::to_string).collect(),
                }),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                    skip_row(path, line, &e.to_string());
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Index of the first matching column; exact names win over case-insensitive ones.
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h == name))
            .or_else(|| {
                names.iter().find_map(|name| {
                    self.headers
                        .iter()
                        .position(|h| h.eq_ignore_ascii_case(name))
                })
            })
    }

    pub fn skip(&self, row: &CsvRow, message: &str) {
        skip_row(&self.path, row.line, message);
    }
}

fn skip_row(path: &Path, line: u64, message: &str) {
    let err = Error::CsvParse {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    };
    warn!("Skipping row: {err}");
}

/// First CSV in `dir` (sorted by name) matching any pattern, tried in order.
pub fn find_csv(dir: &Path, patterns: &[&str]) -> Result<Option<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    for pattern in patterns {
        let Ok(pattern) = Pattern::new(pattern) else {
            continue;
        };
        let found = files.iter().find(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| pattern.matches(name))
        });
        if let Some(path) = found {
            debug!("Matched {:?} for {}", path, pattern.as_str());
            return Ok(Some(path.clone()));
        }
    }
    Ok(None)
}

fn parse_count(value: &str) -> Option<u64> {
    let cleaned: String = value.chars().filter(|c| !matches!(c, ',' | ' ')).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<u64>()
        .ok()
        .or_else(|| cleaned.parse::<f64>().ok().map(|v| v.round() as u64))
}

fn parse_percent(value: &str) -> Option<f64> {
    let cleaned = value.trim().trim_end_matches('%').trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Row of the Issues Overview report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueOverviewRow {
    pub name: String,
    pub issue_type: String,
    pub priority: String,
    pub urls: Option<u64>,
    pub percent: Option<f64>,
    pub description: String,
    pub how_to_fix: String,
    pub help_url: String,
}

/// Row of the Accessibility "All Violations" bulk export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationRow {
    pub url: String,
    pub name: String,
    pub priority: String,
    pub guidelines: String,
    pub location: String,
    pub description: String,
    pub how_to_fix: String,
    pub help_url: String,
}

/// Row of the Accessibility Violations Summary report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessibilitySummaryRow {
    pub name: String,
    pub priority: String,
    pub guidelines: String,
    pub urls: Option<u64>,
    pub percent: Option<f64>,
}

/// One `issues_reports/*.csv` file: the pages affected by a single issue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueReport {
    /// Issue name derived from the file stem
    pub name: String,
    pub rows: Vec<IssuePageRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePageRow {
    pub url: String,
    pub details: String,
}

/// `page_titles_missing` -> `Page Titles Missing`
pub fn issue_name_from_stem(stem: &str) -> String {
    stem.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn load_issues_overview(dir: &Path) -> Result<Option<Vec<IssueOverviewRow>>> {
    let Some(path) = find_csv(dir, ISSUES_OVERVIEW_PATTERNS)? else {
        return Ok(None);
    };
    let table = CsvTable::read(&path)?;
    let Some(name_col) = table.column(&["Issue Name"]) else {
        debug!("{:?} has no 'Issue Name' column, ignoring", path);
        return Ok(None);
    };
    let type_col = table.column(&["Issue Type"]);
    let priority_col = table.column(&["Issue Priority", "Priority"]);
    let urls_col = table.column(COUNT_COLUMNS);
    let percent_col = table.column(PERCENT_COLUMNS);
    let description_col = table.column(&["Description"]);
    let fix_col = table.column(&["How To Fix"]);
    let help_col = table.column(&["Help URL"]);

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let name = row.get(Some(name_col));
        if name.is_empty() {
            table.skip(row, "empty issue name");
            continue;
        }
        rows.push(IssueOverviewRow {
            name: name.to_string(),
            issue_type: row.get(type_col).to_string(),
            priority: row.get(priority_col).to_string(),
            urls: parse_count(row.get(urls_col)),
            percent: parse_percent(row.get(percent_col)),
            description: row.get(description_col).to_string(),
            how_to_fix: row.get(fix_col).to_string(),
            help_url: row.get(help_col).to_string(),
        });
    }
    Ok(Some(rows))
}

pub fn load_violations(dir: &Path) -> Result<Option<Vec<ViolationRow>>> {
    let Some(path) = find_csv(dir, VIOLATIONS_PATTERNS)? else {
        return Ok(None);
    };
    let table = CsvTable::read(&path)?;
    let Some(url_col) = table.column(URL_COLUMNS) else {
        debug!("{:?} has no URL column, ignoring", path);
        return Ok(None);
    };
    let name_col = table.column(ISSUE_NAME_COLUMNS);
    let priority_col = table.column(PRIORITY_COLUMNS);
    let guideline_col = table.column(GUIDELINE_COLUMNS);
    let location_col = table.column(&["Location on Page", "Location"]);
    let description_col = table.column(&["Issue Description", "Description"]);
    let fix_col = table.column(&["How To Fix"]);
    let help_col = table.column(&["Help URL"]);

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let url = row.get(Some(url_col));
        if !urls::is_url(url) {
            table.skip(row, &format!("invalid or empty URL {url:?}"));
            continue;
        }
        let name = row.get(name_col);
        if name.is_empty() {
            table.skip(row, "empty violation name");
            continue;
        }
        rows.push(ViolationRow {
            url: url.to_string(),
            name: name.to_string(),
            priority: row.get(priority_col).to_string(),
            guidelines: row.get(guideline_col).to_string(),
            location: row.get(location_col).to_string(),
            description: row.get(description_col).to_string(),
            how_to_fix: row.get(fix_col).to_string(),
            help_url: row.get(help_col).to_string(),
        });
    }
    Ok(Some(rows))
}

pub fn load_accessibility_summary(dir: &Path) -> Result<Option<Vec<AccessibilitySummaryRow>>> {
    let Some(path) = find_csv(dir, ACCESSIBILITY_SUMMARY_PATTERNS)? else {
        return Ok(None);
    };
    let table = CsvTable::read(&path)?;
    let Some(name_col) = table.column(ISSUE_NAME_COLUMNS) else {
        debug!("{:?} has no violation name column, ignoring", path);
        return Ok(None);
    };
    let priority_col = table.column(PRIORITY_COLUMNS);
    let guideline_col = table.column(GUIDELINE_COLUMNS);
    let urls_col = table.column(COUNT_COLUMNS);
    let percent_col = table.column(PERCENT_COLUMNS);

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let name = row.get(Some(name_col));
        if name.is_empty() {
            table.skip(row, "empty violation name");
            continue;
        }
        rows.push(AccessibilitySummaryRow {
            name: name.to_string(),
            priority: row.get(priority_col).to_string(),
            guidelines: row.get(guideline_col).to_string(),
            urls: parse_count(row.get(urls_col)),
            percent: parse_percent(row.get(percent_col)),
        });
    }
    Ok(Some(rows))
}

/// Internal HTML page URLs from the `Internal:All` tab export.
pub fn load_internal_pages(dir: &Path) -> Result<Vec<String>> {
    let Some(path) = find_csv(dir, INTERNAL_PATTERNS)? else {
        return Ok(Vec::new());
    };
    let table = CsvTable::read(&path)?;
    let Some(url_col) = table.column(&["Address"]) else {
        debug!("{:?} has no Address column, ignoring", path);
        return Ok(Vec::new());
    };
    let content_type_col = table.column(&["Content Type"]);

    let mut pages = Vec::new();
    for row in &table.rows {
        let url = row.get(Some(url_col));
        if !urls::is_url(url) {
            table.skip(row, &format!("invalid or empty URL {url:?}"));
            continue;
        }
        let is_html = content_type_col.is_none()
            || row.get(content_type_col).to_ascii_lowercase().contains("html");
        if is_html && !urls::is_asset(url) {
            pages.push(url.to_string());
        }
    }
    Ok(pages)
}

/// Per-issue page lists from `issues_reports/`. Inlink reports describe links
/// pointing at the issue rather than the page itself and are skipped.
pub fn load_issue_reports(dir: &Path) -> Result<Vec<IssueReport>> {
    let reports_dir = dir.join(ISSUE_REPORTS_DIR);
    if !reports_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(&reports_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.to_ascii_lowercase().contains("inlinks") {
            continue;
        }

        let table = match CsvTable::read(&path) {
            Ok(table) => table,
            Err(e) => {
                warn!("Skipping unreadable issue report {:?}: {}", path, e);
                continue;
            }
        };
        let Some(url_col) = table.column(URL_COLUMNS) else {
            debug!("{:?} has no URL column, ignoring", path);
            continue;
        };

        let mut rows = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let url = row.get(Some(url_col));
            if !urls::is_url(url) {
                table.skip(row, &format!("invalid or empty URL {url:?}"));
                continue;
            }
            let details = table
                .headers
                .iter()
                .enumerate()
                .filter(|(idx, header)| {
                    *idx != url_col && !DETAIL_SKIP_COLUMNS.contains(&header.as_str())
                })
                .filter_map(|(idx, header)| {
                    let value = row.get(Some(idx));
                    (!value.is_empty()).then(|| format!("{header}: {value}"))
                })
                .collect::<Vec<_>>()
                .join("; ");
            rows.push(IssuePageRow {
                url: url.to_string(),
                details,
            });
        }

        reports.push(IssueReport {
            name: issue_name_from_stem(&stem),
            rows,
        });
    }
    Ok(reports)
}

/// Every export found in one folder
#[derive(Debug, Clone, Default)]
pub struct ExportSet {
    pub issues_overview: Option<Vec<IssueOverviewRow>>,
    pub violations: Option<Vec<ViolationRow>>,
    pub accessibility_summary: Option<Vec<AccessibilitySummaryRow>>,
    pub internal_pages: Vec<String>,
    pub issue_reports: Vec<IssueReport>,
}

impl ExportSet {
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            issues_overview: load_issues_overview(dir)?,
            violations: load_violations(dir)?,
            accessibility_summary: load_accessibility_summary(dir)?,
            internal_pages: load_internal_pages(dir)?,
            issue_reports: load_issue_reports(dir)?,
        })
    }

    /// Number of valid rows across all exports.
    pub fn valid_rows(&self) -> usize {
        self.issues_overview.as_ref().map_or(0, Vec::len)
            + self.violations.as_ref().map_or(0, Vec::len)
            + self.accessibility_summary.as_ref().map_or(0, Vec::len)
            + self.internal_pages.len()
            + self.issue_reports.iter().map(|r| r.rows.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn stem_to_issue_name() {
        assert_eq!(issue_name_from_stem("page_titles_missing"), "Page Titles Missing");
        assert_eq!(issue_name_from_stem("H1_DUPLICATE"), "H1 Duplicate");
    }

    #[test]
    fn counts_and_percentages() {
        assert_eq!(parse_count("1,234"), Some(1234));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_percent("12.5%"), Some(12.5));
        assert_eq!(parse_percent("n/a"), None);
    }

    #[test]
    fn bom_is_stripped_from_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "issues_overview_report.csv",
            "\u{feff}Issue Name,Issue Priority\nPage Titles: Missing,High\n",
        );
        let table = CsvTable::read(&path).unwrap();
        assert_eq!(table.headers[0], "Issue Name");
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn patterns_are_tried_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b_issues.csv", "x\n");
        write(dir.path(), "issues_overview_report.csv", "x\n");
        let found = find_csv(dir.path(), ISSUES_OVERVIEW_PATTERNS).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "issues_overview_report.csv");
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = b"Address,Issue,Priority\nhttps://example.com/a,Image Alt,Critical\n".to_vec();
        contents.extend_from_slice(b"https://example.com/\xff\xfe,Image Alt,Critical\n");
        contents.extend_from_slice(b"https://example.com/b,Label,Serious\n");
        fs::write(dir.path().join("accessibility_all_violations.csv"), contents).unwrap();

        let rows = load_violations(dir.path()).unwrap().unwrap();
        let urls: Vec<&str> = rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
        assert_eq!(rows[1].name, "Label");
    }

    #[test]
    fn violations_skip_rows_without_urls() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "accessibility_all_violations.csv",
            "Address,Issue,Priority,Location on Page\n\
             https://example.com/,Image Alt,Critical,img.logo\n\
             ,Image Alt,Critical,img\n\
             not a url,Image Alt,Critical,img\n\
             http://example.com/a,Color Contrast,Serious,p\n",
        );
        let rows = load_violations(dir.path()).unwrap().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "img.logo");
        assert_eq!(rows[1].name, "Color Contrast");
    }

    #[test]
    fn internal_pages_keep_html_only() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "internal_all.csv",
            "Address,Content Type,Status Code\n\
             https://example.com/,text/html; charset=UTF-8,200\n\
             https://example.com/logo.png,image/png,200\n\
             https://example.com/file.pdf,text/html,200\n\
             https://example.com/about,text/html,200\n",
        );
        let pages = load_internal_pages(dir.path()).unwrap();
        assert_eq!(
            pages,
            vec!["https://example.com/", "https://example.com/about"]
        );
    }

    #[test]
    fn issue_reports_collect_details_and_skip_inlinks() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "issues_reports/page_titles_missing.csv",
            "Address,Indexability,Title 1,Occurrences\n\
             https://example.com/a,Indexable,,1\n",
        );
        write(
            dir.path(),
            "issues_reports/page_titles_missing_inlinks.csv",
            "Source,Destination\nhttps://example.com/,https://example.com/a\n",
        );
        let reports = load_issue_reports(dir.path()).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "Page Titles Missing");
        assert_eq!(reports[0].rows[0].details, "Occurrences: 1");
    }
}

//! Excel workbook writer for aggregated crawl data.
//!
//! Sheet order: `Issues Summary`, `Accessibility Summary`, `Pages`, then one sheet
//! per page group. The workbook is serialized in memory and only written to disk
//! once every sheet has been built.
use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatUnderline, Url, Workbook, Worksheet};
use tracing::{debug, info};

use crate::core::aggregate::{Aggregation, SAMPLE_URLS};
use crate::core::model::PageGroup;
use crate::core::urls;
use crate::error::Result;
use crate::io::writers::sheet_names::{SheetNamer, internal_link};
use crate::types::EntryKind;

pub const ISSUES_SUMMARY_SHEET: &str = "Issues Summary";
pub const ACCESSIBILITY_SUMMARY_SHEET: &str = "Accessibility Summary";
pub const PAGES_SHEET: &str = "Pages";
// Reserved by Excel for change tracking
const EXCEL_RESERVED_SHEET: &str = "History";

pub const ISSUES_SUMMARY_COLUMNS: [&str; 9] = [
    "Issue Name",
    "Issue Type",
    "Issue Priority",
    "URLs",
    "% of Total",
    "Pages Affected",
    "Description",
    "How To Fix",
    "Help URL",
];

pub const ACCESSIBILITY_SUMMARY_COLUMNS: [&str; 7] = [
    "Violation",
    "Priority",
    "Guidelines",
    "URLs",
    "% of Total",
    "Pages Affected",
    "Sample URLs",
];

pub const PAGES_COLUMNS: [&str; 5] = ["URL", "Sheet", "Accessibility", "Issues", "Duplicates"];

pub const PAGE_COLUMNS: [&str; 7] = [
    "Type",
    "Issue",
    "Priority",
    "Details",
    "Description",
    "How To Fix",
    "Help URL",
];

// Excel limits
const MAX_CELL_CHARS: usize = 32_767;
const MAX_URL_CHARS: usize = 2_079;
const MAX_LINKS_PER_SHEET: usize = 65_530;

const MIN_COLUMN_WIDTH: usize = 12;
const MAX_COLUMN_WIDTH: usize = 60;

struct Styles {
    header: Format,
    bold: Format,
    link: Format,
    wrap: Format,
    percent: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color("#FFFFFF")
                .set_font_size(11)
                .set_background_color("#2F5496")
                .set_text_wrap()
                .set_align(FormatAlign::Top),
            bold: Format::new().set_bold(),
            link: Format::new()
                .set_font_color("#0563C1")
                .set_underline(FormatUnderline::Single),
            wrap: Format::new().set_text_wrap().set_align(FormatAlign::Top),
            percent: Format::new().set_num_format("0.00"),
        }
    }
}

fn clip(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Worksheet plus the bookkeeping the writer needs: autofit widths and the
/// per-sheet hyperlink budget.
struct SheetWriter<'a> {
    sheet: &'a mut Worksheet,
    styles: &'a Styles,
    widths: Vec<usize>,
    links: usize,
}

impl<'a> SheetWriter<'a> {
    fn new(workbook: &'a mut Workbook, name: &str, styles: &'a Styles) -> Result<Self> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        Ok(Self {
            sheet,
            styles,
            widths: Vec::new(),
            links: 0,
        })
    }

    fn track(&mut self, col: u16, text: &str) {
        let len = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let col = col as usize;
        if self.widths.len() <= col {
            self.widths.resize(col + 1, 0);
        }
        self.widths[col] = self.widths[col].max(len);
    }

    fn header(&mut self, row: u32, headers: &[&str]) -> Result<()> {
        for (col, title) in headers.iter().enumerate() {
            let col = col as u16;
            self.sheet
                .write_string_with_format(row, col, *title, &self.styles.header)?;
            self.track(col, title);
        }
        Ok(())
    }

    fn text(&mut self, row: u32, col: u16, value: &str) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        let value = clip(value);
        self.sheet.write_string(row, col, value)?;
        self.track(col, value);
        Ok(())
    }

    fn wrapped(&mut self, row: u32, col: u16, value: &str) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        let value = clip(value);
        self.sheet
            .write_string_with_format(row, col, value, &self.styles.wrap)?;
        self.track(col, value);
        Ok(())
    }

    fn bold(&mut self, row: u32, col: u16, value: &str) -> Result<()> {
        self.sheet
            .write_string_with_format(row, col, value, &self.styles.bold)?;
        self.track(col, value);
        Ok(())
    }

    fn count(&mut self, row: u32, col: u16, value: u64) -> Result<()> {
        self.sheet.write_number(row, col, value as f64)?;
        self.track(col, &value.to_string());
        Ok(())
    }

    fn percent(&mut self, row: u32, col: u16, value: f64) -> Result<()> {
        self.sheet
            .write_number_with_format(row, col, value, &self.styles.percent)?;
        self.track(col, &format!("{value:.2}"));
        Ok(())
    }

    fn has_link_budget(&self) -> bool {
        self.links < MAX_LINKS_PER_SHEET
    }

    /// External hyperlink; plain text for non-URLs, over-long URLs, or once the
    /// sheet's hyperlink budget is spent.
    fn link(&mut self, row: u32, col: u16, value: &str) -> Result<()> {
        if !urls::is_url(value) || value.chars().count() > MAX_URL_CHARS || !self.has_link_budget() {
            return self.text(row, col, value);
        }
        self.sheet
            .write_url_with_format(row, col, Url::new(value), &self.styles.link)?;
        self.links += 1;
        self.track(col, value);
        Ok(())
    }

    fn sheet_link(&mut self, row: u32, col: u16, sheet_name: &str) -> Result<()> {
        if !self.has_link_budget() {
            return self.text(row, col, sheet_name);
        }
        let url = Url::new(internal_link(sheet_name)).set_text(sheet_name);
        self.sheet
            .write_url_with_format(row, col, url, &self.styles.link)?;
        self.links += 1;
        self.track(col, sheet_name);
        Ok(())
    }

    fn finish(self, freeze_row: u32) -> Result<()> {
        for (col, width) in self.widths.iter().enumerate() {
            let width = (width + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
            self.sheet.set_column_width(col as u16, width as f64)?;
        }
        self.sheet.set_freeze_panes(freeze_row, 0)?;
        Ok(())
    }
}

/// Names of the per-group sheets, in group order
#[derive(Debug, Clone, Default)]
pub struct WorkbookLayout {
    pub group_sheets: Vec<String>,
}

impl WorkbookLayout {
    /// Sheet listing the page with comparison key `key`, if it has one.
    pub fn sheet_for<'a>(&'a self, agg: &Aggregation, key: &str) -> Option<&'a str> {
        agg.group_of
            .get(key)
            .and_then(|&idx| self.group_sheets.get(idx))
            .map(String::as_str)
    }

    /// All sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        [ISSUES_SUMMARY_SHEET, ACCESSIBILITY_SUMMARY_SHEET, PAGES_SHEET]
            .iter()
            .map(|s| s.to_string())
            .chain(self.group_sheets.iter().cloned())
            .collect()
    }
}

fn plan_layout(agg: &Aggregation) -> WorkbookLayout {
    let mut namer = SheetNamer::with_reserved(&[
        ISSUES_SUMMARY_SHEET,
        ACCESSIBILITY_SUMMARY_SHEET,
        PAGES_SHEET,
        EXCEL_RESERVED_SHEET,
    ]);
    let group_sheets = agg
        .groups
        .iter()
        .map(|group| {
            let url = agg
                .page(group.representative())
                .map(|p| p.url.as_str())
                .unwrap_or_default();
            namer.name_for_url(url)
        })
        .collect();
    WorkbookLayout { group_sheets }
}

fn write_issues_summary(workbook: &mut Workbook, styles: &Styles, agg: &Aggregation) -> Result<()> {
    let mut sheet = SheetWriter::new(workbook, ISSUES_SUMMARY_SHEET, styles)?;
    sheet.header(0, &ISSUES_SUMMARY_COLUMNS)?;
    for (idx, issue) in agg.issues.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.text(row, 0, &issue.name)?;
        sheet.text(row, 1, &issue.issue_type)?;
        sheet.text(row, 2, &issue.priority)?;
        if let Some(urls) = issue.urls_reported {
            sheet.count(row, 3, urls)?;
        }
        if let Some(percent) = issue.percent_reported {
            sheet.percent(row, 4, percent)?;
        }
        sheet.count(row, 5, issue.pages.len() as u64)?;
        sheet.wrapped(row, 6, &issue.description)?;
        sheet.wrapped(row, 7, &issue.how_to_fix)?;
        sheet.link(row, 8, &issue.help_url)?;
    }
    sheet.finish(1)
}

fn write_accessibility_summary(
    workbook: &mut Workbook,
    styles: &Styles,
    agg: &Aggregation,
) -> Result<()> {
    let mut sheet = SheetWriter::new(workbook, ACCESSIBILITY_SUMMARY_SHEET, styles)?;
    sheet.header(0, &ACCESSIBILITY_SUMMARY_COLUMNS)?;
    for (idx, violation) in agg.violations.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.text(row, 0, &violation.name)?;
        sheet.text(row, 1, &violation.priority)?;
        sheet.text(row, 2, &violation.guidelines)?;
        sheet.count(row, 3, violation.urls)?;
        sheet.percent(row, 4, violation.percent)?;
        sheet.count(row, 5, violation.pages.len() as u64)?;
        sheet.wrapped(row, 6, &violation.sample_urls(SAMPLE_URLS).join("\n"))?;
    }
    sheet.finish(1)
}

fn write_pages_index(
    workbook: &mut Workbook,
    styles: &Styles,
    agg: &Aggregation,
    layout: &WorkbookLayout,
) -> Result<()> {
    let mut sheet = SheetWriter::new(workbook, PAGES_SHEET, styles)?;
    sheet.header(0, &PAGES_COLUMNS)?;
    for (idx, (key, page)) in agg.pages.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.link(row, 0, &page.url)?;
        if let Some(name) = layout.sheet_for(agg, key) {
            sheet.sheet_link(row, 1, name)?;
        }
        sheet.count(row, 2, page.count(EntryKind::Accessibility) as u64)?;
        sheet.count(row, 3, page.count(EntryKind::Issue) as u64)?;
        let group_size = agg
            .group_of
            .get(key)
            .and_then(|&g| agg.groups.get(g))
            .map_or(0, PageGroup::len);
        if group_size > 1 {
            sheet.count(row, 4, group_size as u64)?;
        }
    }
    sheet.finish(1)
}

fn write_group_sheet(
    workbook: &mut Workbook,
    styles: &Styles,
    agg: &Aggregation,
    group: &PageGroup,
    name: &str,
) -> Result<()> {
    let mut sheet = SheetWriter::new(workbook, name, styles)?;
    let pages: Vec<_> = agg.group_pages(group).collect();

    let mut row: u32 = 0;
    if let [page] = pages.as_slice() {
        sheet.bold(row, 0, "URL")?;
        sheet.link(row, 1, &page.url)?;
        row += 1;
    } else {
        sheet.bold(row, 0, "URLs")?;
        sheet.text(row, 1, &format!("{} pages with identical issues", pages.len()))?;
        row += 1;
        for page in &pages {
            sheet.link(row, 1, &page.url)?;
            row += 1;
        }
    }
    // Blank separator row
    row += 1;

    let header_row = row;
    sheet.header(header_row, &PAGE_COLUMNS)?;
    row += 1;

    if let Some(representative) = pages.first() {
        for entry in representative.sorted_entries() {
            sheet.text(row, 0, &entry.kind.to_string())?;
            sheet.text(row, 1, &entry.name)?;
            sheet.text(row, 2, &entry.priority)?;
            sheet.wrapped(row, 3, &entry.details)?;
            sheet.wrapped(row, 4, &entry.description)?;
            sheet.wrapped(row, 5, &entry.how_to_fix)?;
            sheet.link(row, 6, &entry.help_url)?;
            row += 1;
        }
    }
    sheet.finish(header_row + 1)
}

/// Build the full report workbook in memory.
pub fn build_workbook(agg: &Aggregation) -> Result<(Workbook, WorkbookLayout)> {
    let styles = Styles::new();
    let layout = plan_layout(agg);
    let mut workbook = Workbook::new();

    write_issues_summary(&mut workbook, &styles, agg)?;
    write_accessibility_summary(&mut workbook, &styles, agg)?;
    write_pages_index(&mut workbook, &styles, agg, &layout)?;
    for (group, name) in agg.groups.iter().zip(&layout.group_sheets) {
        debug!("Writing sheet '{}' for {} page(s)", name, group.len());
        write_group_sheet(&mut workbook, &styles, agg, group, name)?;
    }

    Ok((workbook, layout))
}

/// Build the workbook and write it to `output`.
pub fn write_workbook(agg: &Aggregation, output: &Path) -> Result<WorkbookLayout> {
    let (mut workbook, layout) = build_workbook(agg)?;
    let buffer = workbook.save_to_buffer()?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, buffer)?;
    info!("Report saved to {:?}", output);
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::aggregate;
    use crate::io::exports::{ExportSet, IssuePageRow, IssueReport};

    fn exports(urls: &[(&str, &str)]) -> ExportSet {
        ExportSet {
            issue_reports: urls
                .iter()
                .map(|(issue, url)| IssueReport {
                    name: issue.to_string(),
                    rows: vec![IssuePageRow {
                        url: url.to_string(),
                        details: String::new(),
                    }],
                })
                .collect(),
            ..ExportSet::default()
        }
    }

    #[test]
    fn layout_names_groups_after_first_page() {
        let agg = aggregate(&exports(&[
            ("Missing Title", "https://example.com/"),
            ("Missing H1", "https://example.com/blog/post"),
        ]));
        let layout = plan_layout(&agg);
        assert_eq!(layout.group_sheets, vec!["home", "blog - post"]);
        assert_eq!(
            layout.sheet_names()[..3],
            [ISSUES_SUMMARY_SHEET, ACCESSIBILITY_SUMMARY_SHEET, PAGES_SHEET]
        );
        assert_eq!(layout.sheet_for(&agg, "example.com/"), Some("home"));
    }

    #[test]
    fn group_sheet_never_takes_a_reserved_name() {
        let agg = aggregate(&exports(&[("Missing Title", "https://example.com/pages")]));
        let layout = plan_layout(&agg);
        assert_eq!(layout.group_sheets, vec!["pages (1)"]);

        let agg = aggregate(&exports(&[("Missing Title", "https://example.com/history")]));
        assert_eq!(plan_layout(&agg).group_sheets, vec!["history (1)"]);
    }

    #[test]
    fn workbook_builds_with_empty_aggregation() {
        let (_, layout) = build_workbook(&Aggregation::default()).unwrap();
        assert!(layout.group_sheets.is_empty());
    }

    #[test]
    fn clip_respects_cell_limit() {
        let long = "x".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(clip(&long).len(), MAX_CELL_CHARS);
        assert_eq!(clip("short"), "short");
    }
}

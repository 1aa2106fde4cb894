//! Aggregation of parsed exports into pages, page groups and summaries.
//!
//! A single pass builds an ordered `comparison key -> Page` map, so every
//! iteration (pages, groups, summary rows) is deterministic for a given
//! export snapshot.
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::core::model::{
    AccessibilityViolation, Issue, Page, PageEntry, PageGroup, Signature, name_key, priority_rank,
};
use crate::core::urls;
use crate::io::exports::{ExportSet, IssueOverviewRow};
use crate::types::EntryKind;

/// Number of sample URLs kept per accessibility violation
pub const SAMPLE_URLS: usize = 3;

/// Everything the workbook writer needs
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub pages: BTreeMap<String, Page>,
    pub groups: Vec<PageGroup>,
    /// Comparison key -> index into `groups`
    pub group_of: BTreeMap<String, usize>,
    pub issues: Vec<Issue>,
    pub violations: Vec<AccessibilityViolation>,
}

impl Aggregation {
    pub fn page(&self, key: &str) -> Option<&Page> {
        self.pages.get(key)
    }

    pub fn group_pages<'a>(&'a self, group: &'a PageGroup) -> impl Iterator<Item = &'a Page> + 'a {
        group.pages.iter().filter_map(move |key| self.pages.get(key))
    }

    pub fn duplicates_collapsed(&self) -> usize {
        self.groups.iter().map(|g| g.len() - 1).sum()
    }
}

/// Overview metadata matched to an issue report
#[derive(Debug, Clone, Default)]
struct IssueMeta<'a> {
    name: String,
    overview: Option<&'a IssueOverviewRow>,
}

fn words(value: &str) -> Vec<String> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Match an issue name derived from a report file name to an Issues Overview entry:
/// exact (case-insensitive) name first, else the entry sharing the most words
/// (at least two). Accessibility entries are never matched; those come from the
/// violations export.
fn match_overview<'a>(report_name: &str, overview: &'a [IssueOverviewRow]) -> IssueMeta<'a> {
    let key = name_key(report_name);
    if let Some(row) = overview.iter().find(|row| name_key(&row.name) == key) {
        return IssueMeta {
            name: row.name.clone(),
            overview: Some(row),
        };
    }

    let report_words = words(report_name);
    let mut best: Option<(&IssueOverviewRow, usize)> = None;
    for row in overview {
        if name_key(&row.name).starts_with("accessibility:") {
            continue;
        }
        let mut row_words = words(&row.name);
        row_words.dedup();
        let overlap = row_words
            .iter()
            .filter(|w| report_words.contains(w))
            .count();
        if overlap >= 2 && best.is_none_or(|(_, score)| overlap > score) {
            best = Some((row, overlap));
        }
    }

    match best {
        Some((row, _)) => IssueMeta {
            name: row.name.clone(),
            overview: Some(row),
        },
        None => IssueMeta {
            name: report_name.to_string(),
            overview: None,
        },
    }
}

fn page_entry<'m>(
    pages: &'m mut BTreeMap<String, Page>,
    restrict_to: Option<&BTreeMap<String, String>>,
    raw_url: &str,
) -> Option<&'m mut Page> {
    let key = urls::comparison_key(raw_url);
    if let Some(internal) = restrict_to {
        if !internal.contains_key(&key) {
            return None;
        }
    }
    Some(
        pages
            .entry(key.clone())
            .or_insert_with(|| Page::new(key, urls::display_url(raw_url))),
    )
}

/// Build pages, groups and summaries from one export snapshot.
pub fn aggregate(exports: &ExportSet) -> Aggregation {
    let mut pages: BTreeMap<String, Page> = BTreeMap::new();

    let internal: BTreeMap<String, String> = exports
        .internal_pages
        .iter()
        .map(|url| (urls::comparison_key(url), urls::display_url(url)))
        .collect();
    for (key, url) in &internal {
        pages
            .entry(key.clone())
            .or_insert_with(|| Page::new(key.clone(), url.clone()));
    }
    // Only internal HTML pages are reported once the crawl's page list is known.
    let restrict_to = (!internal.is_empty()).then_some(&internal);

    for row in exports.violations.iter().flatten() {
        let Some(page) = page_entry(&mut pages, restrict_to, &row.url) else {
            continue;
        };
        page.push(PageEntry {
            kind: EntryKind::Accessibility,
            name: row.name.clone(),
            priority: row.priority.clone(),
            details: row.location.clone(),
            description: row.description.clone(),
            how_to_fix: row.how_to_fix.clone(),
            help_url: row.help_url.clone(),
        });
    }

    let overview: &[IssueOverviewRow] = exports.issues_overview.as_deref().unwrap_or(&[]);
    for report in &exports.issue_reports {
        let meta = match_overview(&report.name, overview);
        debug!("Issue report '{}' -> '{}'", report.name, meta.name);
        for row in &report.rows {
            let Some(page) = page_entry(&mut pages, restrict_to, &row.url) else {
                continue;
            };
            page.push(PageEntry {
                kind: EntryKind::Issue,
                name: meta.name.clone(),
                priority: meta.overview.map(|o| o.priority.clone()).unwrap_or_default(),
                details: row.details.clone(),
                description: meta
                    .overview
                    .map(|o| o.description.clone())
                    .unwrap_or_default(),
                how_to_fix: meta
                    .overview
                    .map(|o| o.how_to_fix.clone())
                    .unwrap_or_default(),
                help_url: meta.overview.map(|o| o.help_url.clone()).unwrap_or_default(),
            });
        }
    }

    let (groups, group_of) = group_pages(&pages);
    let issues = summarize_issues(overview, &pages);
    let violations = summarize_violations(exports, &pages);

    Aggregation {
        pages,
        groups,
        group_of,
        issues,
        violations,
    }
}

/// Group pages with entries by signature. Groups are ordered by their first
/// page key; pages within a group stay in key order.
pub fn group_pages(pages: &BTreeMap<String, Page>) -> (Vec<PageGroup>, BTreeMap<String, usize>) {
    let mut groups: Vec<PageGroup> = Vec::new();
    let mut index: HashMap<Signature, usize> = HashMap::new();
    let mut group_of = BTreeMap::new();

    for (key, page) in pages {
        if !page.has_entries() {
            continue;
        }
        let signature = page.signature();
        let idx = match index.get(&signature) {
            Some(&idx) => idx,
            None => {
                groups.push(PageGroup {
                    signature: signature.clone(),
                    pages: Vec::new(),
                });
                index.insert(signature, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[idx].pages.push(key.clone());
        group_of.insert(key.clone(), idx);
    }
    (groups, group_of)
}

/// Issues Summary rows: overview entries plus issues only seen in reports, ordered by
/// priority rank, pages affected (desc), reported URLs (desc), then name.
pub fn summarize_issues(overview: &[IssueOverviewRow], pages: &BTreeMap<String, Page>) -> Vec<Issue> {
    let mut issues: Vec<Issue> = Vec::with_capacity(overview.len());
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for row in overview {
        let id = name_key(&row.name);
        if by_name.contains_key(&id) {
            continue;
        }
        by_name.insert(id, issues.len());
        issues.push(Issue {
            name: row.name.clone(),
            issue_type: row.issue_type.clone(),
            priority: row.priority.clone(),
            description: row.description.clone(),
            how_to_fix: row.how_to_fix.clone(),
            help_url: row.help_url.clone(),
            urls_reported: row.urls,
            percent_reported: row.percent,
            ..Issue::default()
        });
    }

    for page in pages.values() {
        for entry in page.entries.iter().filter(|e| e.kind == EntryKind::Issue) {
            let id = name_key(&entry.name);
            let idx = *by_name.entry(id).or_insert_with(|| {
                issues.push(Issue {
                    name: entry.name.clone(),
                    priority: entry.priority.clone(),
                    description: entry.description.clone(),
                    how_to_fix: entry.how_to_fix.clone(),
                    help_url: entry.help_url.clone(),
                    ..Issue::default()
                });
                issues.len() - 1
            });
            issues[idx].pages.insert(page.url.clone());
        }
    }

    issues.sort_by(|a, b| {
        priority_rank(&a.priority)
            .cmp(&priority_rank(&b.priority))
            .then_with(|| b.pages.len().cmp(&a.pages.len()))
            .then_with(|| b.urls_reported.unwrap_or(0).cmp(&a.urls_reported.unwrap_or(0)))
            .then_with(|| name_key(&a.name).cmp(&name_key(&b.name)))
    });
    issues
}

/// Accessibility Summary rows: the crawler's summary when exported, completed with
/// violations only seen per page. Percentages missing from the export are computed
/// against the total page count.
pub fn summarize_violations(
    exports: &ExportSet,
    pages: &BTreeMap<String, Page>,
) -> Vec<AccessibilityViolation> {
    let total_pages = pages.len();
    let mut violations: Vec<AccessibilityViolation> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut reported: Vec<bool> = Vec::new();

    for row in exports.accessibility_summary.iter().flatten() {
        let id = name_key(&row.name);
        if by_name.contains_key(&id) {
            continue;
        }
        by_name.insert(id, violations.len());
        reported.push(row.percent.is_some());
        violations.push(AccessibilityViolation {
            name: row.name.clone(),
            priority: row.priority.clone(),
            guidelines: row.guidelines.clone(),
            urls: row.urls.unwrap_or(0),
            percent: row.percent.unwrap_or(0.0),
            pages: Default::default(),
        });
    }
    let from_summary = violations.len();

    // Guidelines only live on the per-page export.
    let guidelines: HashMap<String, &str> = exports
        .violations
        .iter()
        .flatten()
        .filter(|row| !row.guidelines.is_empty())
        .map(|row| (name_key(&row.name), row.guidelines.as_str()))
        .collect();

    for page in pages.values() {
        for entry in page
            .entries
            .iter()
            .filter(|e| e.kind == EntryKind::Accessibility)
        {
            let id = name_key(&entry.name);
            let idx = match by_name.get(&id) {
                Some(&idx) => idx,
                None => {
                    by_name.insert(id.clone(), violations.len());
                    reported.push(false);
                    violations.push(AccessibilityViolation {
                        name: entry.name.clone(),
                        priority: entry.priority.clone(),
                        guidelines: guidelines.get(&id).copied().unwrap_or_default().to_string(),
                        ..AccessibilityViolation::default()
                    });
                    violations.len() - 1
                }
            };
            if idx >= from_summary {
                violations[idx].urls += 1;
            }
            violations[idx].pages.insert(page.url.clone());
        }
    }

    for (violation, has_percent) in violations.iter_mut().zip(&reported) {
        if violation.urls == 0 {
            violation.urls = violation.pages.len() as u64;
        }
        if !has_percent && total_pages > 0 {
            violation.percent = violation.pages.len() as f64 * 100.0 / total_pages as f64;
        }
    }

    violations.sort_by(|a, b| {
        b.pages
            .len()
            .cmp(&a.pages.len())
            .then_with(|| name_key(&a.name).cmp(&name_key(&b.name)))
    });
    violations
}

//! Report domain model: pages, the issues and accessibility violations
//! attached to them, and the signature-based page groups rendered as sheets.
use std::collections::BTreeSet;

use crate::types::EntryKind;

/// One row of a page sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub kind: EntryKind,
    pub name: String,
    pub priority: String,
    pub details: String,
    pub description: String,
    pub how_to_fix: String,
    pub help_url: String,
}

/// Identity of an issue or violation: names compare case-insensitively.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A crawled page, keyed by its scheme-less URL
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Comparison key (see [`crate::core::urls::comparison_key`])
    pub key: String,
    /// Display URL
    pub url: String,
    pub entries: Vec<PageEntry>,
    pub issues: BTreeSet<String>,
    pub violations: BTreeSet<String>,
}

impl Page {
    pub fn new(key: String, url: String) -> Self {
        Self {
            key,
            url,
            ..Self::default()
        }
    }

    pub fn push(&mut self, entry: PageEntry) {
        let id = name_key(&entry.name);
        match entry.kind {
            EntryKind::Issue => self.issues.insert(id),
            EntryKind::Accessibility => self.violations.insert(id),
        };
        self.entries.push(entry);
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn signature(&self) -> Signature {
        Signature {
            issues: self.issues.clone(),
            violations: self.violations.clone(),
        }
    }

    /// Entries in sheet order: accessibility rows first, then issues, each in source order.
    pub fn sorted_entries(&self) -> Vec<&PageEntry> {
        let mut entries: Vec<&PageEntry> = self.entries.iter().collect();
        entries.sort_by_key(|e| e.kind);
        entries
    }
}

/// Set of issue and violation names attached to a page; the dedup key for page groups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Signature {
    pub issues: BTreeSet<String>,
    pub violations: BTreeSet<String>,
}

impl Signature {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.violations.is_empty()
    }
}

/// Pages sharing one signature. `pages` holds comparison keys in key order;
/// the first page is the representative shown on the group sheet.
#[derive(Debug, Clone)]
pub struct PageGroup {
    pub signature: Signature,
    pub pages: Vec<String>,
}

impl PageGroup {
    /// Key of the first page; its entries stand for the whole group.
    pub fn representative(&self) -> &str {
        self.pages.first().map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// SEO issue type with its crawler-reported totals and affected pages
#[derive(Debug, Clone, Default)]
pub struct Issue {
    pub name: String,
    pub issue_type: String,
    pub priority: String,
    pub description: String,
    pub how_to_fix: String,
    pub help_url: String,
    /// URL count reported by the Issues Overview export
    pub urls_reported: Option<u64>,
    pub percent_reported: Option<f64>,
    /// Display URLs of pages carrying the issue
    pub pages: BTreeSet<String>,
}

/// WCAG violation type with affected-page totals and sample URLs
#[derive(Debug, Clone, Default)]
pub struct AccessibilityViolation {
    pub name: String,
    pub priority: String,
    pub guidelines: String,
    /// URL (or occurrence) count
    pub urls: u64,
    /// Share of all pages affected, 0-100
    pub percent: f64,
    pub pages: BTreeSet<String>,
}

impl AccessibilityViolation {
    pub fn sample_urls(&self, limit: usize) -> Vec<&str> {
        self.pages.iter().take(limit).map(String::as_str).collect()
    }
}

/// Sort rank for priority labels: High, Medium, Low, then anything else.
pub fn priority_rank(priority: &str) -> u8 {
    match priority.trim().to_ascii_lowercase().as_str() {
        "high" => 0,
        "medium" => 1,
        "low" => 2,
        _ => 3,
    }
}

//! Excel-safe, unique sheet names derived from page URLs.
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::urls;

/// Excel's hard limit on sheet name length
pub const MAX_SHEET_NAME: usize = 31;
// Room for a " (n)" suffix
const MAX_BASE_NAME: usize = MAX_SHEET_NAME - 4;

static INVALID_SHEET_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\\/*?\[\]:]").expect("valid sheet-name regex"));

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Base sheet name for a URL: path segments joined with ` - `, `home` for the root.
pub fn base_name(url: &str) -> String {
    let path = urls::path_of(url);
    let name = if path.is_empty() {
        "home".to_string()
    } else {
        path.replace('/', " - ")
    };
    let cleaned = INVALID_SHEET_CHARS.replace_all(&name, "");
    let cleaned = cleaned.trim().trim_matches('\'').trim();
    let cleaned = if cleaned.is_empty() { "page" } else { cleaned };

    if cleaned.chars().count() <= MAX_BASE_NAME {
        return cleaned.to_string();
    }
    // Excel rejects names ending in an apostrophe.
    let truncated = truncate_chars(cleaned, MAX_BASE_NAME);
    let truncated = truncated.trim_end_matches([' ', '-', '\'']);
    if truncated.is_empty() {
        "page".to_string()
    } else {
        truncated.to_string()
    }
}

/// Hands out unique names; Excel compares sheet names case-insensitively.
#[derive(Debug, Default)]
pub struct SheetNamer {
    seen: HashMap<String, usize>,
    used: HashSet<String>,
}

impl SheetNamer {
    /// A namer that never returns any of `reserved`.
    pub fn with_reserved(reserved: &[&str]) -> Self {
        let mut namer = Self::default();
        for name in reserved {
            namer.used.insert(name.to_lowercase());
        }
        namer
    }

    pub fn name_for_url(&mut self, url: &str) -> String {
        self.unique(base_name(url))
    }

    fn unique(&mut self, base: String) -> String {
        let counter = self.seen.entry(base.to_lowercase()).or_insert(0);
        let mut name = base.clone();
        while self.used.contains(&name.to_lowercase()) {
            *counter += 1;
            let suffix = format!(" ({})", counter);
            name = format!(
                "{}{}",
                truncate_chars(&base, MAX_SHEET_NAME - suffix.len()),
                suffix
            );
        }
        self.used.insert(name.to_lowercase());
        name
    }
}

/// Target of an internal hyperlink to cell A1 of `sheet`.
pub fn internal_link(sheet: &str) -> String {
    format!("internal:'{}'!A1", sheet.replace('\'', "''"))
}

//! Shared types and enums used across sfreport.
//! Includes the inlinks `StatusFilter` and `LinkScope`, and the `EntryKind` tag
//! used on per-page rows.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Response-status filter for inlink exports
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum StatusFilter {
    All,
    #[value(name = "2xx")]
    Success,
    #[value(name = "3xx")]
    Redirection,
    #[value(name = "4xx")]
    ClientError,
    #[value(name = "5xx")]
    ServerError,
}

impl StatusFilter {
    /// Label used by Screaming Frog's "Response Codes" bulk exports
    pub fn export_label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Success => "Success (2xx)",
            StatusFilter::Redirection => "Redirection (3xx)",
            StatusFilter::ClientError => "Client Error (4xx)",
            StatusFilter::ServerError => "Server Error (5xx)",
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatusFilter::All => "all",
            StatusFilter::Success => "2xx",
            StatusFilter::Redirection => "3xx",
            StatusFilter::ClientError => "4xx",
            StatusFilter::ServerError => "5xx",
        };
        write!(f, "{}", s)
    }
}

/// Which side of the site an inlink export covers
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub enum LinkScope {
    Internal,
    External,
    #[default]
    Both,
}

impl LinkScope {
    pub fn from_flags(internal: bool, external: bool) -> Self {
        match (internal, external) {
            (true, false) => LinkScope::Internal,
            (false, true) => LinkScope::External,
            _ => LinkScope::Both,
        }
    }

    pub fn export_label(&self) -> &'static str {
        match self {
            LinkScope::Internal => "Internal",
            LinkScope::External => "External",
            LinkScope::Both => "Internal & External",
        }
    }
}

impl std::fmt::Display for LinkScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkScope::Internal => write!(f, "internal"),
            LinkScope::External => write!(f, "external"),
            LinkScope::Both => write!(f, "both"),
        }
    }
}

/// Source of a per-page row: an SEO issue or an accessibility violation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum EntryKind {
    // Declaration order is the row order on page sheets.
    Accessibility,
    Issue,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Accessibility => write!(f, "Accessibility"),
            EntryKind::Issue => write!(f, "Issue"),
        }
    }
}

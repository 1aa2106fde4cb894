#![doc = r#"
sfreport: Screaming Frog crawls to accessibility and SEO Excel reports.

This crate drives the Screaming Frog SEO Spider headless (fresh crawls, saved crawl
re-exports, inlink exports) and turns its CSV exports into a single `.xlsx` workbook:
an issues summary, an accessibility summary, a pages index, and one sheet per group
of pages sharing identical findings. It powers the `sfreport` CLI and can be embedded
in your own Rust applications.

Stability
---------
The public library API is experimental in initial releases and may evolve as the
crate stabilizes. Breaking changes can occur.

Requirements
------------
- Screaming Frog SEO Spider installed with a licence that allows headless crawling
  (only needed for the crawl, from-db, inlinks and sf flows; building a report from
  existing exports needs nothing external).
- Rust 2024 edition toolchain.

Add dependency
--------------
```toml
[dependencies]
sfreport = "0.1"
```

Quick start: report from existing exports
-----------------------------------------
```rust,no_run
use std::path::Path;
use sfreport::generate_report;

fn main() -> sfreport::Result<()> {
    let summary = generate_report(Path::new("exports/example.com"), Path::new("report.xlsx"))?;
    println!(
        "{} pages in {} sheets ({} duplicates collapsed)",
        summary.pages, summary.page_sheets, summary.duplicates_collapsed
    );
    Ok(())
}
```

Crawl, then report
------------------
```rust,no_run
use std::path::Path;
use sfreport::{ConfigSources, ExportFolder, SeoSpider, crawl_to_report, resolve_binary};

fn main() -> sfreport::Result<()> {
    // --sf-binary override, ./.sfreport.toml, ~/.sfreport.toml, platform default
    let binary = resolve_binary(None, &ConfigSources::discover())?;
    let spider = SeoSpider::new(binary);

    // Exports live in a temporary directory removed when `folder` is dropped.
    let folder = ExportFolder::temporary()?;
    crawl_to_report(
        &spider,
        "https://example.com",
        Some(Path::new("config/Accessibility.seospiderconfig")),
        &folder,
        Path::new("report.xlsx"),
    )?;
    Ok(())
}
```

Inspect the aggregation without writing a workbook
--------------------------------------------------
```rust,no_run
use std::path::Path;
use sfreport::api::load_report_data;

fn main() -> sfreport::Result<()> {
    let agg = load_report_data(Path::new("exports/example.com"))?;
    for group in &agg.groups {
        println!("{} -> {} pages", group.representative(), group.len());
    }
    Ok(())
}
```

Error handling
--------------
All public functions return `sfreport::Result<T>`; match on `sfreport::Error` to handle
specific cases.

```rust,no_run
use std::path::Path;
use sfreport::{Error, generate_report};

fn main() {
    match generate_report(Path::new("exports/empty"), Path::new("out.xlsx")) {
        Ok(_) => {}
        Err(Error::NoValidRows { dir }) => eprintln!("nothing to report in {}", dir.display()),
        Err(Error::InputNotFound { path }) => eprintln!("missing: {}", path.display()),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`config`]: `.sfreport.toml` settings and binary resolution.
- [`core`]: URL normalization, the page/issue model and aggregation.
- [`io`]: crawler invocation, CSV export loading and the workbook writer.
- [`types`]: CLI-facing enums (`StatusFilter`, `LinkScope`, `EntryKind`).
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use error::{Error, Result};
pub use types::{EntryKind, LinkScope, StatusFilter};

pub use crate::config::{ConfigSources, Settings, resolve_binary};
pub use crate::core::aggregate::Aggregation;
pub use crate::core::model::{AccessibilityViolation, Issue, Page, PageEntry, PageGroup, Signature};
pub use crate::io::{ExportSet, SeoSpider};

// High-level API re-exports
pub use api::{
    ExportFolder, ReportSummary, crawl_file_to_report, crawl_to_report, export_inlinks,
    generate_report,
};

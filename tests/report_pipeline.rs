use std::fs;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use sfreport::api::load_report_data;
use sfreport::{Error, generate_report};

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn read_sheet(path: &Path, name: &str) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(name).unwrap();
    range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.sheet_names()
}

/// Site with four internal pages: `/a` and `/b` share one issue, `/c` has another,
/// the home page has none.
fn site_exports(dir: &Path) {
    write(
        dir,
        "issues_overview_report.csv",
        "\u{feff}Issue Name,Issue Type,Issue Priority,URLs,% of Total,Description,How To Fix,Help URL\n\
         H1: Missing,Warning,Medium,1,25.0,No h1 heading,Add an h1,https://example.org/h1\n\
         Page Titles: Missing,Issue,High,2,50.0,Pages without a title,Add a title,https://example.org/titles\n",
    );
    write(
        dir,
        "internal_all.csv",
        "Address,Content Type,Status Code\n\
         https://example.com/,text/html; charset=UTF-8,200\n\
         https://example.com/a,text/html,200\n\
         https://example.com/b,text/html,200\n\
         https://example.com/c,text/html,200\n\
         https://example.com/logo.png,image/png,200\n",
    );
    write(
        dir,
        "issues_reports/page_titles_missing.csv",
        "Address,Indexability,Occurrences\n\
         http://example.com/a,Indexable,0\n\
         https://example.com/b,Indexable,0\n\
         ,Indexable,0\n\
         https://other.example.net/x,Indexable,0\n",
    );
    write(
        dir,
        "issues_reports/h1_missing.csv",
        "Address,Indexability\nhttps://example.com/c,Indexable\n",
    );
    write(
        dir,
        "issues_reports/h1_missing_inlinks.csv",
        "Source,Destination\nhttps://example.com/,https://example.com/c\n",
    );
}

#[test]
fn report_has_summaries_index_and_group_sheets() {
    let dir = tempfile::tempdir().unwrap();
    site_exports(dir.path());
    let output = dir.path().join("out/report.xlsx");

    let summary = generate_report(dir.path(), &output).unwrap();
    assert_eq!(summary.pages, 4);
    assert_eq!(summary.page_sheets, 2);
    assert_eq!(summary.duplicates_collapsed, 1);
    assert_eq!(summary.issue_types, 2);
    assert_eq!(summary.violation_types, 0);

    assert_eq!(
        sheet_names(&output),
        vec!["Issues Summary", "Accessibility Summary", "Pages", "a", "c"]
    );

    let issues = read_sheet(&output, "Issues Summary");
    assert_eq!(issues[0][0], "Issue Name");
    assert_eq!(issues[0][8], "Help URL");
    assert_eq!(issues[1][0], "Page Titles: Missing");
    assert_eq!(issues[1][2], "High");
    assert_eq!(issues[1][5], "2");
    assert_eq!(issues[2][0], "H1: Missing");
    assert_eq!(issues[2][5], "1");

    let pages = read_sheet(&output, "Pages");
    assert_eq!(pages[0], vec!["URL", "Sheet", "Accessibility", "Issues", "Duplicates"]);
    let rows: Vec<(&str, &str, &str)> = pages[1..]
        .iter()
        .map(|r| (r[0].as_str(), r[1].as_str(), r[4].as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("https://example.com/", "", ""),
            ("https://example.com/a", "a", "2"),
            ("https://example.com/b", "a", "2"),
            ("https://example.com/c", "c", ""),
        ]
    );

    let group = read_sheet(&output, "a");
    assert_eq!(group[0][0], "URLs");
    assert_eq!(group[0][1], "2 pages with identical issues");
    assert_eq!(group[1][1], "https://example.com/a");
    assert_eq!(group[2][1], "https://example.com/b");
    assert_eq!(group[4][0], "Type");
    assert_eq!(group[5][0], "Issue");
    assert_eq!(group[5][1], "Page Titles: Missing");
    assert_eq!(group[5][2], "High");
    assert_eq!(group[5][3], "Occurrences: 0");
    assert_eq!(group[5][6], "https://example.org/titles");

    let single = read_sheet(&output, "c");
    assert_eq!(single[0][0], "URL");
    assert_eq!(single[0][1], "https://example.com/c");
    assert_eq!(single[3][1], "H1: Missing");
}

#[test]
fn empty_accessibility_summary_keeps_its_header() {
    let dir = tempfile::tempdir().unwrap();
    site_exports(dir.path());
    let output = dir.path().join("report.xlsx");
    generate_report(dir.path(), &output).unwrap();

    let sheet = read_sheet(&output, "Accessibility Summary");
    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet[0][0], "Violation");
    assert_eq!(sheet[0][6], "Sample URLs");
}

#[test]
fn page_to_sheet_mapping_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    site_exports(dir.path());
    let first = dir.path().join("first.xlsx");
    let second = dir.path().join("second.xlsx");
    generate_report(dir.path(), &first).unwrap();
    generate_report(dir.path(), &second).unwrap();

    let mapping = |path: &Path| -> Vec<(String, String)> {
        read_sheet(path, "Pages")
            .into_iter()
            .skip(1)
            .map(|r| (r[0].clone(), r[1].clone()))
            .collect()
    };
    assert_eq!(mapping(&first), mapping(&second));
    assert_eq!(sheet_names(&first), sheet_names(&second));
}

#[test]
fn scheme_variants_merge_into_one_page() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "issues_reports/missing_title.csv",
        "Address\nhttp://example.com/a\nhttps://example.com/a\n",
    );
    let agg = load_report_data(dir.path()).unwrap();
    assert_eq!(agg.pages.len(), 1);
    assert_eq!(agg.groups.len(), 1);

    let output = dir.path().join("report.xlsx");
    let summary = generate_report(dir.path(), &output).unwrap();
    assert_eq!(summary.page_sheets, 1);
    assert_eq!(sheet_names(&output).len(), 4);
    let pages = read_sheet(&output, "Pages");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1][0], "https://example.com/a");
}

#[test]
fn violations_and_issues_share_a_page_sheet() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "accessibility_all_violations.csv",
        "Address,Issue,Priority,Guidelines,Location on Page,Help URL\n\
         https://example.com/a,Image Alt,Critical,WCAG 2.0 A,img.logo,https://example.org/alt\n\
         https://example.com/b,Image Alt,Critical,WCAG 2.0 A,img.hero,https://example.org/alt\n",
    );
    write(
        dir.path(),
        "issues_reports/missing_title.csv",
        "Address\nhttps://example.com/a\n",
    );
    let output = dir.path().join("report.xlsx");
    let summary = generate_report(dir.path(), &output).unwrap();
    // /a has both findings, /b only the violation
    assert_eq!(summary.page_sheets, 2);

    let sheet = read_sheet(&output, "a");
    assert_eq!(sheet[0][0], "URL");
    assert_eq!(sheet[3][0], "Accessibility");
    assert_eq!(sheet[3][1], "Image Alt");
    assert_eq!(sheet[3][3], "img.logo");
    assert_eq!(sheet[4][0], "Issue");
    assert_eq!(sheet[4][1], "Missing Title");

    let access = read_sheet(&output, "Accessibility Summary");
    assert_eq!(access.len(), 2);
    assert_eq!(access[1][0], "Image Alt");
    assert_eq!(access[1][2], "WCAG 2.0 A");
    assert_eq!(access[1][5], "2");
}

#[test]
fn exports_without_valid_rows_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "accessibility_all_violations.csv",
        "Address,Issue,Priority\n,Image Alt,Critical\nnot-a-url,Image Alt,Critical\n",
    );
    write(dir.path(), "issues_reports/missing_title.csv", "Address\n\n");
    let output = dir.path().join("report.xlsx");

    let err = generate_report(dir.path(), &output).unwrap_err();
    assert!(matches!(err, Error::NoValidRows { .. }));
    assert!(!output.exists());
}

#[test]
fn truncated_sheet_name_with_apostrophe_still_writes() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "issues_reports/missing_title.csv",
        "Address\nhttps://example.com/abcdefghijklmnopqrstuvwxyz'rest-of-path\n",
    );
    let output = dir.path().join("report.xlsx");
    let summary = generate_report(dir.path(), &output).unwrap();
    assert_eq!(summary.page_sheets, 1);
    assert!(sheet_names(&output).contains(&"abcdefghijklmnopqrstuvwxyz".to_string()));
}

//! Report writers: the Excel workbook and its sheet naming rules.
pub mod sheet_names;
pub mod workbook;

pub use workbook::{WorkbookLayout, build_workbook, write_workbook};

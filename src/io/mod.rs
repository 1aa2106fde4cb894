//! I/O layer: the Screaming Frog process wrapper (`crawler`), CSV export
//! readers (`exports`), and the Excel report `writers`.
pub mod crawler;
pub use crawler::SeoSpider;

pub mod exports;
pub use exports::ExportSet;

pub mod writers;

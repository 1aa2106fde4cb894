//! Command Line Interface (CLI) layer for sfreport.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for the crawl, report, from-db,
//! inlinks and raw passthrough commands. It wires user-provided options to
//! the library functionality exposed via `sfreport::api`.
//!
//! If you are embedding sfreport into another application, prefer using
//! the high-level `sfreport::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;

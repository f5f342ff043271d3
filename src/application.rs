//! Application layer module
//!
//! Collaborators that consume a finished crawl result on behalf of the
//! surrounding desktop tooling.

pub mod export;

pub use export::{default_export_path, export_csv};

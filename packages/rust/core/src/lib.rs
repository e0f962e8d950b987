//! Category preprocessing for labelprep.
//!
//! This crate discovers category folders, merges each category's classified
//! and unclassified segments into one table, and normalizes its guidance
//! ontology into JSON. Every batch visits all categories and reports a
//! per-category outcome; no single category can abort the run.

pub mod categories;
pub mod guidance;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod table;

#[cfg(test)]
mod test_support;

pub use categories::{CategoryListing, EmptyReason, list_categories};
pub use pipeline::{PrepareReport, ProgressReporter, SilentProgress, prepare};
pub use report::{BatchReport, CategoryOutcome, Outcome, Status};

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - field values and summary records (`Value`, `SummaryRecord`)
//! - the unified feature table and its join (`FeatureTable`)
//! - per-stage accounting (`Stage`, `StageReport`)

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;

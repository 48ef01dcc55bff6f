//! `abs-features` library crate.
//!
//! The binary (`abs-features`) is a thin wrapper around this library so that:
//!
//! - the reconstruction and merge logic is testable without spawning processes
//! - the pipeline can run against any `SourceLoader`, not just files on disk

pub mod app;
pub mod buckets;
pub mod cli;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod io;
pub mod math;
pub mod report;

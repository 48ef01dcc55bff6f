//! Input/output helpers.
//!
//! - DataPack CSV ingest + validation (`ingest`)
//! - feature table CSV export (`export`)
//! - run manifest JSON read/write (`manifest`)
//! - temp-then-rename output files (`staged`)

pub mod export;
pub mod ingest;
pub mod manifest;
pub mod staged;

pub use export::*;
pub use ingest::*;
pub use manifest::*;
pub use staged::*;

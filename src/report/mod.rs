//! Reporting utilities: formatted terminal output for runs and bucket schemes.

pub mod format;

pub use format::*;

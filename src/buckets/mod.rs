//! Income bucket schemes.
//!
//! Census tables report income as counts per interval. A `BucketScheme` maps an
//! interval label to a representative value (its midpoint) and maps a value back
//! to the label of the interval containing it.

pub mod scheme;

pub use scheme::*;

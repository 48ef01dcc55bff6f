//! Statistical primitives: sequence description and grouped-count reconstruction.

pub mod describe;
pub mod reconstruct;

pub use describe::*;
pub use reconstruct::*;

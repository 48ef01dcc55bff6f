//! Distribution reconstruction from grouped counts.
//!
//! A frequency record says how many entities of one geographic unit fall in each
//! bucket. We expand it into a synthetic sequence where every entity sits exactly
//! on its bucket's midpoint, then describe that sequence.
//!
//! Midpoint imputation ignores the spread inside each bucket, so the
//! reconstructed standard deviation understates the true one.

use nalgebra::DVector;

use crate::buckets::BucketScheme;
use crate::math::describe::{describe, min_max_normalize};

/// Counts per bucket, in scheme order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyRecord {
    counts: Vec<u64>,
}

impl FrequencyRecord {
    pub fn new(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    /// Build a record from `(label, count)` pairs; labels not listed count 0.
    ///
    /// Returns `None` if a label is not part of `scheme`.
    pub fn from_labels(scheme: &BucketScheme, pairs: &[(&str, u64)]) -> Option<Self> {
        let mut counts = vec![0; scheme.len()];
        for (label, count) in pairs {
            counts[scheme.position(label)?] = *count;
        }
        Some(Self { counts })
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Reporting population for this attribute.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Statistics of the min-max normalized sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedStats {
    pub mean: f64,
    pub std: f64,
}

/// Raw statistics of a reconstructed sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconstruction {
    pub len: usize,
    pub mean: f64,
    /// Sample std; a single entity has no spread and reports 0.
    pub std: f64,
    /// `None` when every entity sits on the same midpoint (`max == min`).
    pub normalized: Option<NormalizedStats>,
}

/// Expand a record into its synthetic midpoint sequence.
pub fn expand(scheme: &BucketScheme, record: &FrequencyRecord) -> DVector<f64> {
    debug_assert_eq!(scheme.len(), record.counts.len());
    let values: Vec<f64> = scheme
        .buckets()
        .iter()
        .zip(&record.counts)
        .flat_map(|(bucket, &count)| std::iter::repeat_n(bucket.midpoint, count as usize))
        .collect();
    DVector::from_vec(values)
}

/// Reconstruct and describe one unit. Returns `None` when every count is zero.
pub fn reconstruct(scheme: &BucketScheme, record: &FrequencyRecord) -> Option<Reconstruction> {
    let sequence = expand(scheme, record);
    let raw = describe(&sequence)?;

    let normalized = min_max_normalize(&sequence)
        .and_then(|norm| describe(&norm))
        .map(|d| NormalizedStats {
            mean: d.mean,
            std: d.std.unwrap_or(0.0),
        });

    Some(Reconstruction {
        len: raw.n,
        mean: raw.mean,
        std: raw.std.unwrap_or(0.0),
        normalized,
    })
}

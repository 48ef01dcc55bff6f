//! Shared domain types.
//!
//! These are kept small and serializable so the same values flow through the
//! pipeline, the CSV export and the JSON run manifest.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Geographic unit code (postcode, statistical area, suburb code, ...).
pub type GeoKey = String;

/// A single field of the unified table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    /// Categorical value, e.g. a median income interval label.
    Label(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Label(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Label(s) => f.write_str(s),
        }
    }
}

/// Reconstructed income statistics for one unit.
///
/// Always finite: undefined statistics are replaced before a record is built.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub mean: f64,
    pub std: f64,
    pub mean_norm: f64,
    pub std_norm: f64,
}

impl SummaryRecord {
    /// Record for a unit where nobody reported a bucket.
    pub const ZERO: SummaryRecord = SummaryRecord {
        mean: 0.0,
        std: 0.0,
        mean_norm: 0.0,
        std_norm: 0.0,
    };
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PersonalIncome,
    Medians,
    HouseholdIncome,
    Occupation,
    Employment,
    Cleanup,
}

impl Stage {
    pub fn display_name(self) -> &'static str {
        match self {
            Stage::PersonalIncome => "Weekly personal income",
            Stage::Medians => "Medians",
            Stage::HouseholdIncome => "Weekly household income",
            Stage::Occupation => "Occupation",
            Stage::Employment => "Employment",
            Stage::Cleanup => "Cleanup",
        }
    }
}

/// Row accounting for one stage of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
    pub elapsed_ms: f64,
}

impl StageReport {
    pub fn dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

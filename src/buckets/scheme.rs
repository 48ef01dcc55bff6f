//! Fixed bucket tables for weekly personal and household income.
//!
//! Both schemes are plain data: an ordered list of half-open intervals
//! `[lower, upper)` terminated by an open-ended top interval. Each bucket also
//! records the DataPack column that carries its count.
//!
//! Midpoints are conventions, not statistics. The top interval is represented by
//! its lower bound.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One interval of a scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Canonical label (used for median interval classification).
    pub label: &'static str,
    /// Column holding this bucket's count in the source table.
    pub column: &'static str,
    pub lower: f64,
    /// Exclusive upper bound; `None` for the open top interval.
    pub upper: Option<f64>,
    pub midpoint: f64,
}

impl Bucket {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && self.upper.is_none_or(|upper| value < upper)
    }
}

const fn bucket(label: &'static str, column: &'static str, lower: f64, upper: f64, midpoint: f64) -> Bucket {
    Bucket {
        label,
        column,
        lower,
        upper: Some(upper),
        midpoint,
    }
}

const fn top(label: &'static str, column: &'static str, lower: f64) -> Bucket {
    Bucket {
        label,
        column,
        lower,
        upper: None,
        midpoint: lower,
    }
}

/// An ordered, contiguous partition of `[0, ∞)` into labelled intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketScheme {
    pub name: &'static str,
    buckets: &'static [Bucket],
}

/// Weekly personal income (G17, persons total columns).
///
/// "Not stated" is deliberately absent: those persons carry no income value.
pub const PERSONAL_WEEKLY_INCOME: BucketScheme = BucketScheme {
    name: "personal weekly income",
    buckets: &[
        bucket("Neg_Nil_income", "P_Neg_Nil_income_Tot", 0.0, 1.0, 0.0),
        bucket("1_149", "P_1_149_Tot", 1.0, 150.0, 75.0),
        bucket("150_299", "P_150_299_Tot", 150.0, 300.0, 225.0),
        bucket("300_399", "P_300_399_Tot", 300.0, 400.0, 350.0),
        bucket("400_499", "P_400_499_Tot", 400.0, 500.0, 450.0),
        bucket("500_649", "P_500_649_Tot", 500.0, 650.0, 575.0),
        // 625 sits below its own interval, so this bucket's midpoint does not
        // classify back to its label. Existing feature files were built with it.
        bucket("650_799", "P_650_799_Tot", 650.0, 800.0, 625.0),
        bucket("800_999", "P_800_999_Tot", 800.0, 1000.0, 850.0),
        bucket("1000_1249", "P_1000_1249_Tot", 1000.0, 1250.0, 1125.0),
        bucket("1250_1499", "P_1250_1499_Tot", 1250.0, 1500.0, 1375.0),
        bucket("1500_1749", "P_1500_1749_Tot", 1500.0, 1750.0, 1625.0),
        bucket("1750_1999", "P_1750_1999_Tot", 1750.0, 2000.0, 1875.0),
        bucket("2000_2999", "P_2000_2999_Tot", 2000.0, 3000.0, 2500.0),
        top("3000_more", "P_3000_more_Tot", 3000.0),
    ],
};

/// Weekly household income (G29, totals). Labels are the column names.
pub const HOUSEHOLD_WEEKLY_INCOME: BucketScheme = BucketScheme {
    name: "household weekly income",
    buckets: &[
        bucket("Negative_Nil_income_Tot", "Negative_Nil_income_Tot", 0.0, 1.0, 0.0),
        bucket("HI_1_149_Tot", "HI_1_149_Tot", 1.0, 150.0, 75.0),
        bucket("HI_150_299_Tot", "HI_150_299_Tot", 150.0, 300.0, 225.0),
        bucket("HI_300_399_Tot", "HI_300_399_Tot", 300.0, 400.0, 350.0),
        bucket("HI_400_499_Tot", "HI_400_499_Tot", 400.0, 500.0, 450.0),
        bucket("HI_500_649_Tot", "HI_500_649_Tot", 500.0, 650.0, 575.0),
        // Same 625 convention as the personal scheme.
        bucket("HI_650_799_Tot", "HI_650_799_Tot", 650.0, 800.0, 625.0),
        bucket("HI_800_999_Tot", "HI_800_999_Tot", 800.0, 1000.0, 850.0),
        bucket("HI_1000_1249_Tot", "HI_1000_1249_Tot", 1000.0, 1250.0, 1125.0),
        bucket("HI_1250_1499_Tot", "HI_1250_1499_Tot", 1250.0, 1500.0, 1375.0),
        bucket("HI_1500_1749_Tot", "HI_1500_1749_Tot", 1500.0, 1750.0, 1625.0),
        bucket("HI_1750_1999_Tot", "HI_1750_1999_Tot", 1750.0, 2000.0, 1875.0),
        bucket("HI_2000_2499_Tot", "HI_2000_2499_Tot", 2000.0, 2500.0, 2250.0),
        bucket("HI_2500_2999_Tot", "HI_2500_2999_Tot", 2500.0, 3000.0, 2750.0),
        bucket("HI_3000_3499_Tot", "HI_3000_3499_Tot", 3000.0, 3500.0, 3250.0),
        bucket("HI_3500_3999_Tot", "HI_3500_3999_Tot", 3500.0, 4000.0, 3750.0),
        top("HI_4000_more_Tot", "HI_4000_more_Tot", 4000.0),
    ],
};

impl BucketScheme {
    pub fn buckets(&self) -> &'static [Bucket] {
        self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.buckets.iter().position(|b| b.label == label)
    }

    /// Representative value for `label`, if the label belongs to this scheme.
    pub fn midpoint(&self, label: &str) -> Option<f64> {
        self.position(label).map(|idx| self.buckets[idx].midpoint)
    }

    /// Representative value for `label`.
    ///
    /// # Panics
    /// Panics if `label` is not part of this scheme. Labels only ever come from
    /// the scheme itself, so an unknown label is a programming error.
    pub fn label_to_midpoint(&self, label: &str) -> f64 {
        self.midpoint(label)
            .unwrap_or_else(|| panic!("unknown {} bucket label `{label}`", self.name))
    }

    /// Label of the interval containing `value`.
    ///
    /// Zero, negative values and values below the first positive boundary map
    /// to the negative/nil bucket; everything at or above the top lower bound
    /// maps to the open top bucket.
    pub fn value_to_label(&self, value: f64) -> &'static str {
        let first = &self.buckets[0];
        if value.is_nan() || value < first.lower {
            return first.label;
        }
        self.buckets
            .iter()
            .find(|b| b.contains(value))
            .unwrap_or(&self.buckets[self.buckets.len() - 1])
            .label
    }
}

/// The two income schemes, selectable by name (CLI, reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IncomeScheme {
    Personal,
    Household,
}

impl IncomeScheme {
    pub const ALL: [IncomeScheme; 2] = [IncomeScheme::Personal, IncomeScheme::Household];

    pub fn scheme(self) -> &'static BucketScheme {
        match self {
            IncomeScheme::Personal => &PERSONAL_WEEKLY_INCOME,
            IncomeScheme::Household => &HOUSEHOLD_WEEKLY_INCOME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(scheme: &BucketScheme) {
        let buckets = scheme.buckets();
        assert_eq!(buckets[0].lower, 0.0);
        for pair in buckets.windows(2) {
            let upper = pair[0].upper.expect("only the last bucket is open");
            assert_eq!(upper, pair[1].lower, "{}: gap after {}", scheme.name, pair[0].label);
            assert!(pair[1].lower > pair[0].lower);
        }
        assert!(buckets.last().unwrap().upper.is_none());
    }

    #[test]
    fn schemes_are_contiguous_partitions() {
        assert_eq!(PERSONAL_WEEKLY_INCOME.len(), 14);
        assert_eq!(HOUSEHOLD_WEEKLY_INCOME.len(), 17);
        for kind in IncomeScheme::ALL {
            assert_contiguous(kind.scheme());
        }
    }

    /// Buckets whose conventional midpoint lies outside the interval.
    const OFF_INTERVAL_MIDPOINTS: [&str; 2] = ["650_799", "HI_650_799_Tot"];

    #[test]
    fn midpoints_fall_inside_their_bucket_except_650_799() {
        for kind in IncomeScheme::ALL {
            let scheme = kind.scheme();
            for b in scheme.buckets() {
                if OFF_INTERVAL_MIDPOINTS.contains(&b.label) {
                    assert_eq!(b.midpoint, 625.0);
                    assert!(!b.contains(b.midpoint));
                    // The midpoint classifies into the bucket below.
                    assert_eq!(scheme.value_to_label(b.midpoint), scheme.buckets()[5].label);
                } else {
                    assert!(b.contains(b.midpoint), "{} midpoint {} outside bucket", b.label, b.midpoint);
                }
            }
        }
    }

    #[test]
    fn midpoint_label_round_trip() {
        for kind in IncomeScheme::ALL {
            let scheme = kind.scheme();
            for b in scheme.buckets().iter().filter(|b| !OFF_INTERVAL_MIDPOINTS.contains(&b.label)) {
                let label = scheme.value_to_label(b.midpoint);
                assert_eq!(label, b.label);
                assert_eq!(scheme.label_to_midpoint(label), b.midpoint);
            }
        }
    }

    #[test]
    fn arbitrary_values_round_trip_to_their_bucket_midpoint() {
        let scheme = &PERSONAL_WEEKLY_INCOME;
        for (value, expected) in [(42.0, 75.0), (299.99, 225.0), (1999.0, 1875.0), (10_000.0, 3000.0)] {
            assert_eq!(scheme.label_to_midpoint(scheme.value_to_label(value)), expected);
        }
    }

    #[test]
    fn value_to_label_boundaries() {
        let p = &PERSONAL_WEEKLY_INCOME;
        assert_eq!(p.value_to_label(0.0), "Neg_Nil_income");
        assert_eq!(p.value_to_label(-25.0), "Neg_Nil_income");
        assert_eq!(p.value_to_label(1.0), "1_149");
        assert_eq!(p.value_to_label(149.0), "1_149");
        assert_eq!(p.value_to_label(150.0), "150_299");
        assert_eq!(p.value_to_label(2999.0), "2000_2999");
        assert_eq!(p.value_to_label(3000.0), "3000_more");

        let h = &HOUSEHOLD_WEEKLY_INCOME;
        assert_eq!(h.value_to_label(0.0), "Negative_Nil_income_Tot");
        assert_eq!(h.value_to_label(2499.0), "HI_2000_2499_Tot");
        assert_eq!(h.value_to_label(2500.0), "HI_2500_2999_Tot");
        assert_eq!(h.value_to_label(4000.0), "HI_4000_more_Tot");
        assert_eq!(h.value_to_label(1_000_000.0), "HI_4000_more_Tot");
    }

    #[test]
    #[should_panic(expected = "unknown personal weekly income bucket label")]
    fn unknown_label_panics() {
        PERSONAL_WEEKLY_INCOME.label_to_midpoint("HI_1_149_Tot");
    }
}

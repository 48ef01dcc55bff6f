//! Income reconstruction stages.
//!
//! Personal (G17) and household (G29) income go through the same operation:
//! reconstruct a summary per unit from bucket counts, then classify the exact
//! median (G02) into the scheme's interval labels. Only the scheme and the
//! column names differ.

use tracing::debug;

use crate::buckets::{BucketScheme, HOUSEHOLD_WEEKLY_INCOME, PERSONAL_WEEKLY_INCOME};
use crate::domain::{FeatureTable, GeoKey, Placement, SummaryRecord, Value};
use crate::enrich::join_source;
use crate::error::AppError;
use crate::io::SourceTable;
use crate::math::{FrequencyRecord, reconstruct};

/// Output column names of one income attribute.
#[derive(Debug, Clone, Copy)]
pub struct IncomeColumns {
    pub median: &'static str,
    pub interval: &'static str,
    pub std: &'static str,
    pub std_norm: &'static str,
    pub mean: &'static str,
    pub mean_norm: &'static str,
}

/// One income attribute: its bucket scheme, G02 median column and output names.
#[derive(Debug, Clone, Copy)]
pub struct IncomeAttribute {
    pub scheme: &'static BucketScheme,
    pub median_source: &'static str,
    pub columns: IncomeColumns,
}

pub const PERSONAL_INCOME: IncomeAttribute = IncomeAttribute {
    scheme: &PERSONAL_WEEKLY_INCOME,
    median_source: "Median_tot_prsnl_inc_weekly",
    columns: IncomeColumns {
        median: "median_personal_weekly_income",
        interval: "median_personal_weekly_income_interval",
        std: "std_personal_weekly_income",
        std_norm: "std_norm_personal_weekly_income",
        mean: "mean_personal_weekly_income",
        mean_norm: "mean_norm_personal_weekly_income",
    },
};

pub const HOUSEHOLD_INCOME: IncomeAttribute = IncomeAttribute {
    scheme: &HOUSEHOLD_WEEKLY_INCOME,
    median_source: "Median_tot_hhd_inc_weekly",
    columns: IncomeColumns {
        median: "hhld_weekly_income_median",
        interval: "hhld_weekly_income_median_interval",
        std: "hhld_weekly_income_std",
        std_norm: "hhld_weekly_income_std_norm",
        mean: "hhld_weekly_income_mean",
        mean_norm: "hhld_weekly_income_mean_norm",
    },
};

/// Per-unit statistics before the normalization fallback is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DraftSummary {
    mean: f64,
    std: f64,
    mean_norm: Option<f64>,
    std_norm: Option<f64>,
}

impl DraftSummary {
    fn from_record(scheme: &BucketScheme, record: &FrequencyRecord) -> Self {
        match reconstruct(scheme, record) {
            // Nobody reported a bucket: define everything as 0.
            None => DraftSummary {
                mean: 0.0,
                std: 0.0,
                mean_norm: Some(0.0),
                std_norm: Some(0.0),
            },
            Some(r) => DraftSummary {
                mean: r.mean,
                std: r.std,
                mean_norm: r.normalized.map(|n| n.mean),
                std_norm: r.normalized.map(|n| n.std),
            },
        }
    }

    /// Fill undefined normalized statistics; returns whether the fallback fired.
    ///
    /// The fallback reuses the raw mean as `mean_norm`, so that column mixes two
    /// scales for constant-sequence units.
    fn resolve(self) -> (SummaryRecord, bool) {
        match (self.mean_norm, self.std_norm) {
            (Some(mean_norm), Some(std_norm)) => (
                SummaryRecord {
                    mean: self.mean,
                    std: self.std,
                    mean_norm,
                    std_norm,
                },
                false,
            ),
            _ => (
                SummaryRecord {
                    mean: self.mean,
                    std: self.std,
                    mean_norm: self.mean,
                    std_norm: 0.0,
                },
                true,
            ),
        }
    }
}

/// Summary records for every unit of a source table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub records: Vec<(GeoKey, SummaryRecord)>,
    /// Units that needed the constant-sequence fallback.
    pub fallbacks: usize,
}

impl SummaryTable {
    pub fn get(&self, geo_key: &str) -> Option<&SummaryRecord> {
        self.records.iter().find(|(k, _)| k == geo_key).map(|(_, r)| r)
    }

    /// Four-column feature table `[std, std_norm, mean, mean_norm]`.
    pub fn to_frame(&self, columns: &IncomeColumns) -> FeatureTable {
        let mut table = FeatureTable::new(
            [columns.std, columns.std_norm, columns.mean, columns.mean_norm]
                .map(str::to_string)
                .to_vec(),
        );
        for (key, r) in &self.records {
            table.push_row(
                key.clone(),
                vec![
                    Value::Number(r.std),
                    Value::Number(r.std_norm),
                    Value::Number(r.mean),
                    Value::Number(r.mean_norm),
                ],
            );
        }
        table
    }
}

/// Reconstruct a summary for every unit of `source` under `scheme`.
pub fn build_summary_table(source: &SourceTable, scheme: &BucketScheme) -> Result<SummaryTable, AppError> {
    let drafts: Vec<(GeoKey, DraftSummary)> = source
        .frequency_records(scheme)?
        .into_iter()
        .map(|(key, record)| {
            let draft = DraftSummary::from_record(scheme, &record);
            (key, draft)
        })
        .collect();

    // Second pass: units whose normalization was undefined (all entities in one
    // bucket) get the fallback. All-zero units were already defined above.
    let mut fallbacks = 0;
    let records = drafts
        .into_iter()
        .map(|(key, draft)| {
            let (record, fell_back) = draft.resolve();
            if fell_back {
                fallbacks += 1;
            }
            (key, record)
        })
        .collect();

    debug!(
        scheme = scheme.name,
        units = source.len(),
        fallbacks,
        "built income summary table"
    );
    Ok(SummaryTable { records, fallbacks })
}

/// Exact median plus its interval label: `[median, interval]`.
pub fn classified_median(medians: &SourceTable, attr: &IncomeAttribute) -> Result<FeatureTable, AppError> {
    let idx = medians.column(attr.median_source)?;
    let mut table = FeatureTable::new(vec![attr.columns.median.to_string(), attr.columns.interval.to_string()]);
    for row in medians.rows() {
        let median = medians.number(row, idx)?;
        table.push_row(
            row.geo_key.clone(),
            vec![
                Value::Number(median),
                Value::Label(attr.scheme.value_to_label(median).to_string()),
            ],
        );
    }
    Ok(table)
}

/// Stage 1: personal income summary from G17.
pub fn personal_income(g17: &SourceTable) -> Result<FeatureTable, AppError> {
    Ok(build_summary_table(g17, PERSONAL_INCOME.scheme)?.to_frame(&PERSONAL_INCOME.columns))
}

/// Stage 3: household income summary from G29, classified against the G02
/// household median, appended to the running table.
pub fn household_income(table: FeatureTable, g29: &SourceTable, g02: &SourceTable) -> Result<FeatureTable, AppError> {
    let summary = build_summary_table(g29, HOUSEHOLD_INCOME.scheme)?.to_frame(&HOUSEHOLD_INCOME.columns);
    let median = classified_median(g02, &HOUSEHOLD_INCOME)?;
    let household = join_source(summary, median, Placement::Front, "G02 household median");
    Ok(join_source(table, household, Placement::Back, g29.name()))
}

//! Stage 2: exact medians and averages from G02.

use crate::domain::{FeatureTable, Placement};
use crate::enrich::income::{PERSONAL_INCOME, classified_median};
use crate::enrich::join_source;
use crate::error::AppError;
use crate::io::SourceTable;

/// G02 fields carried into the feature table, as `(source, output)`.
pub const PASS_THROUGH: [(&str, &str); 6] = [
    ("Median_mortgage_repay_monthly", "Median_mortgage_repay_monthly"),
    ("Median_rent_weekly", "Median_rent_weekly"),
    ("Median_tot_fam_inc_weekly", "Median_tot_fam_inc_weekly"),
    ("Average_num_psns_per_bedroom", "Average_num_psns_per_bedroom"),
    ("Average_household_size", "Average_household_size"),
    ("Median_age_persons", "median_age_persons"),
];

/// Put the classified personal median in front of the income summary, then
/// append the pass-through fields.
pub fn enrich(table: FeatureTable, g02: &SourceTable) -> Result<FeatureTable, AppError> {
    let median = classified_median(g02, &PERSONAL_INCOME)?;
    let extra = g02.select_numeric(&PASS_THROUGH)?;

    let table = join_source(table, median, Placement::Front, g02.name());
    Ok(join_source(table, extra, Placement::Back, g02.name()))
}

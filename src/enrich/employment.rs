//! Stage 5: labour force shares and rates from G40.

use crate::domain::{FeatureTable, Placement, Value};
use crate::enrich::join_source;
use crate::error::AppError;
use crate::io::SourceTable;

const LABOUR_FORCE: &str = "lfs_Tot_LF_P";

/// Counts expressed as a share of the labour force.
const SHARES: [(&str, &str); 3] = [
    ("lfs_Emplyed_wrked_full_time_P", "pct_full_time_labourforce"),
    (
        "lfs_Emplyed_wrked_part_time_P",
        "pct_part_time_labourforce_part_time_labourforce",
    ),
    ("lfs_Unmplyed_lookng_for_wrk_P", "pct_labourforce_looking_for_work"),
];

/// Census percentages rescaled to fractions.
const RATES: [(&str, &str); 3] = [
    ("Percent_Unem_loyment_P", "pct_unemployment"),
    ("Percnt_LabForc_prticipation_P", "pct_labourforce_participation"),
    ("Percnt_Employment_to_populn_P", "pct_employment_to_population"),
];

/// Output columns, in order.
pub const COLUMNS: [&str; 6] = [
    "pct_full_time_labourforce",
    "pct_part_time_labourforce_part_time_labourforce",
    "pct_labourforce_looking_for_work",
    "pct_unemployment",
    "pct_labourforce_participation",
    "pct_employment_to_population",
];

/// `numerator / denominator`, with undefined results (empty labour force) as 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    let r = numerator / denominator;
    if r.is_finite() { r } else { 0.0 }
}

pub fn enrich(table: FeatureTable, g40: &SourceTable) -> Result<FeatureTable, AppError> {
    let mut selected: Vec<(&str, &str)> = SHARES.iter().chain(RATES.iter()).map(|&(s, _)| (s, s)).collect();
    selected.push((LABOUR_FORCE, LABOUR_FORCE));
    let mut derived = g40.select_numeric(&selected)?;

    let lf_idx = derived.require_column(LABOUR_FORCE)?;
    for (source, target) in SHARES {
        let idx = derived.require_column(source)?;
        derived = derived.with_column(target, |row| Value::Number(ratio(row.number(idx), row.number(lf_idx))));
    }
    for (source, target) in RATES {
        let idx = derived.require_column(source)?;
        derived = derived.with_column(target, |row| Value::Number(row.number(idx) / 100.0));
    }
    let derived = derived.project(&COLUMNS)?;

    Ok(join_source(table, derived, Placement::Back, g40.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::fixtures;
    use pretty_assertions::assert_eq;

    fn base() -> FeatureTable {
        let mut t = FeatureTable::new(vec!["population".to_string()]);
        t.push_row("A".to_string(), vec![Value::Number(10.0)]);
        t.push_row("B".to_string(), vec![Value::Number(20.0)]);
        t
    }

    #[test]
    fn shares_and_rates_are_appended_in_order() {
        let g40 = fixtures::g40(vec![
            (
                "A",
                vec![
                    ("lfs_Emplyed_wrked_full_time_P", 30.0),
                    ("lfs_Emplyed_wrked_part_time_P", 15.0),
                    ("lfs_Unmplyed_lookng_for_wrk_P", 5.0),
                    ("lfs_Tot_LF_P", 60.0),
                    ("Percent_Unem_loyment_P", 8.0),
                    ("Percnt_LabForc_prticipation_P", 50.0),
                    ("Percnt_Employment_to_populn_P", 25.0),
                ],
            ),
            ("B", vec![("Percent_Unem_loyment_P", 4.0)]),
        ]);
        let table = enrich(base(), &g40).unwrap();

        let mut expected = vec!["population"];
        expected.extend(COLUMNS);
        assert_eq!(table.columns().iter().map(String::as_str).collect::<Vec<_>>(), expected);

        let a = &table.rows()[0].values;
        assert_eq!(
            a[1..].iter().filter_map(Value::as_number).collect::<Vec<_>>(),
            vec![0.5, 0.25, 5.0 / 60.0, 0.08, 0.5, 0.25]
        );
    }

    #[test]
    fn empty_labour_force_gives_zero_shares() {
        let g40 = fixtures::g40(vec![("A", vec![]), ("B", vec![("Percent_Unem_loyment_P", 4.0)])]);
        let table = enrich(base(), &g40).unwrap();
        for row in table.rows() {
            assert!(row.values.iter().filter_map(Value::as_number).all(f64::is_finite));
        }
        assert_eq!(table.value("B", "pct_full_time_labourforce"), Some(&Value::Number(0.0)));
        assert_eq!(table.value("B", "pct_unemployment"), Some(&Value::Number(0.04)));
    }

    #[test]
    fn ratio_replaces_non_finite_results() {
        assert_eq!(ratio(0.0, 0.0), 0.0);
        assert_eq!(ratio(3.0, 0.0), 0.0);
        assert_eq!(ratio(3.0, 4.0), 0.75);
    }
}

//! Final stage: drop units with no population.

use tracing::{debug, warn};

use crate::domain::{FeatureTable, GeoKey};
use crate::enrich::occupation::{POPULATION, STANDARDISED_SUFFIX};
use crate::error::AppError;

/// Remove every unit whose population is 0. Returns the kept table and the
/// removed keys.
pub fn run(table: FeatureTable) -> Result<(FeatureTable, Vec<GeoKey>), AppError> {
    let pop_idx = table.require_column(POPULATION)?;
    let (table, removed) = table.partition(|row| row.number(pop_idx) != 0.0);

    if !removed.is_empty() {
        warn!(
            removed = removed.len(),
            sample = ?&removed[..removed.len().min(5)],
            "removed units with zero population"
        );
    }

    let standardised: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.ends_with(STANDARDISED_SUFFIX))
        .map(|(i, _)| i)
        .collect();
    // Only zero-population units may carry non-finite standardised values.
    for row in table.rows() {
        if let Some(&i) = standardised.iter().find(|&&i| !row.number(i).is_finite()) {
            return Err(AppError::InvalidValue {
                table: "unified table".to_string(),
                column: table.columns()[i].clone(),
                geo_key: row.geo_key.clone(),
                value: row.number(i).to_string(),
            });
        }
    }
    debug!(rows = table.len(), "standardised columns are finite");

    Ok((table, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    #[test]
    fn zero_population_units_are_removed() {
        let mut t = FeatureTable::new(vec![POPULATION.to_string(), "occupation_total_Managers_standardised".to_string()]);
        t.push_row("1".to_string(), vec![Value::Number(0.0), Value::Number(f64::INFINITY)]);
        t.push_row("2".to_string(), vec![Value::Number(50.0), Value::Number(0.1)]);
        t.push_row("3".to_string(), vec![Value::Number(0.0), Value::Number(f64::NAN)]);

        let (kept, removed) = run(t).unwrap();
        assert_eq!(kept.keys().collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(removed, vec!["1".to_string(), "3".to_string()]);
        assert!(kept.rows().iter().all(|r| r.number(1).is_finite()));
    }

    #[test]
    fn non_finite_standardised_value_on_populated_unit_fails() {
        let mut t = FeatureTable::new(vec![POPULATION.to_string(), "occupation_total_Managers_standardised".to_string()]);
        t.push_row("1".to_string(), vec![Value::Number(50.0), Value::Number(0.2)]);
        t.push_row("2".to_string(), vec![Value::Number(50.0), Value::Number(f64::INFINITY)]);

        match run(t) {
            Err(AppError::InvalidValue { column, geo_key, .. }) => {
                assert_eq!(column, "occupation_total_Managers_standardised");
                assert_eq!(geo_key, "2");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn table_without_population_is_rejected() {
        let t = FeatureTable::new(vec!["x".to_string()]);
        assert!(matches!(run(t), Err(AppError::SchemaMismatch { .. })));
    }
}

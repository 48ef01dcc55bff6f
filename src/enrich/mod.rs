//! The enrichment pipeline.
//!
//! Stages run in a fixed order, each joining new columns onto the running
//! feature table:
//!
//! personal income (G17) -> medians (G02) -> household income (G29 + G02)
//! -> occupation (G57 + G01) -> employment (G40) -> cleanup
//!
//! Every join is an inner join on the geo key. Units missing from a source are
//! dropped and the drop is logged, so the stage reports always add up.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::{FeatureTable, GeoKey, Placement, Stage, StageReport};
use crate::error::AppError;
use crate::io::{SourceId, SourceLoader};

pub mod cleanup;
pub mod employment;
pub mod income;
pub mod medians;
pub mod occupation;

pub use income::{HOUSEHOLD_INCOME, IncomeAttribute, IncomeColumns, PERSONAL_INCOME, SummaryTable, build_summary_table};

/// Output of a full enrichment run.
#[derive(Debug, Clone)]
pub struct FeatureRun {
    pub table: FeatureTable,
    pub stages: Vec<StageReport>,
    /// Units removed by the cleanup stage (zero population).
    pub removed: Vec<GeoKey>,
}

/// Inner-join `other` onto `table`, logging units that had no match.
pub(crate) fn join_source(table: FeatureTable, other: FeatureTable, placement: Placement, source: &str) -> FeatureTable {
    let (joined, stats) = table.inner_join(other, placement);
    if stats.dropped() > 0 {
        warn!(
            source,
            dropped = stats.dropped(),
            rows_in = stats.rows_in,
            rows_out = stats.rows_out,
            "units missing from source were dropped"
        );
    } else {
        debug!(source, rows = stats.rows_out, "joined source");
    }
    joined
}

/// Times stages and collects their row accounting.
struct StageLedger {
    reports: Vec<StageReport>,
}

impl StageLedger {
    fn new() -> Self {
        Self { reports: Vec::new() }
    }

    fn run<T>(
        &mut self,
        stage: Stage,
        rows_in: usize,
        body: impl FnOnce() -> Result<(FeatureTable, T), AppError>,
    ) -> Result<(FeatureTable, T), AppError> {
        let started = Instant::now();
        let (table, extra) = body()?;
        let report = StageReport {
            stage,
            rows_in,
            rows_out: table.len(),
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        info!(
            stage = stage.display_name(),
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            elapsed_ms = report.elapsed_ms,
            "stage complete"
        );
        self.reports.push(report);
        Ok((table, extra))
    }
}

/// Run every stage against `loader` and return the cleaned feature table.
pub fn build_features(loader: &dyn SourceLoader) -> Result<FeatureRun, AppError> {
    let mut ledger = StageLedger::new();

    let g17 = loader.load(SourceId::PersonalIncome)?;
    let (table, ()) = ledger.run(Stage::PersonalIncome, g17.len(), || {
        Ok((income::personal_income(&g17)?, ()))
    })?;
    drop(g17);

    // G02 feeds both the medians and the household stage.
    let g02 = loader.load(SourceId::Medians)?;
    let rows = table.len();
    let (table, ()) = ledger.run(Stage::Medians, rows, || Ok((medians::enrich(table, &g02)?, ())))?;

    let g29 = loader.load(SourceId::HouseholdIncome)?;
    let rows = table.len();
    let (table, ()) = ledger.run(Stage::HouseholdIncome, rows, || {
        Ok((income::household_income(table, &g29, &g02)?, ()))
    })?;
    drop((g02, g29));

    let g57 = loader.load(SourceId::Occupation)?;
    let g01 = loader.load(SourceId::Population)?;
    let rows = table.len();
    let (table, ()) = ledger.run(Stage::Occupation, rows, || {
        Ok((occupation::enrich(table, &g57, &g01)?, ()))
    })?;
    drop((g57, g01));

    let g40 = loader.load(SourceId::Employment)?;
    let rows = table.len();
    let (table, ()) = ledger.run(Stage::Employment, rows, || Ok((employment::enrich(table, &g40)?, ())))?;
    drop(g40);

    let rows = table.len();
    let (table, removed) = ledger.run(Stage::Cleanup, rows, || cleanup::run(table))?;

    Ok(FeatureRun {
        table,
        stages: ledger.reports,
        removed,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use crate::io::MemoryLoader;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_run_produces_documented_column_order() {
        let run = build_features(&fixtures::loader()).unwrap();
        let columns = run.table.columns();

        assert_eq!(columns[0], "population");
        assert_eq!(columns[1], "median_personal_weekly_income");
        assert_eq!(columns[2], "median_personal_weekly_income_interval");
        assert_eq!(columns[3], "std_personal_weekly_income");
        assert_eq!(columns.last().map(String::as_str), Some("pct_employment_to_population"));
        assert!(columns.iter().any(|c| c == "hhld_weekly_income_median_interval"));
        assert!(columns.iter().any(|c| c == "occupation_total_Managers_standardised"));
        assert_eq!(columns.len(), 43);
    }

    #[test]
    fn full_run_removes_zero_population_and_sorts_units() {
        let run = build_features(&fixtures::loader()).unwrap();
        assert_eq!(run.table.keys().collect::<Vec<_>>(), vec!["2000", "3000"]);
        assert_eq!(run.removed, vec!["4000".to_string()]);

        let stages: Vec<Stage> = run.stages.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![
                Stage::PersonalIncome,
                Stage::Medians,
                Stage::HouseholdIncome,
                Stage::Occupation,
                Stage::Employment,
                Stage::Cleanup
            ]
        );
        assert_eq!(run.stages.last().unwrap().dropped(), 1);

        assert_eq!(
            run.table.value("2000", "occupation_total_Managers_standardised"),
            Some(&Value::Number(0.1))
        );
        assert_eq!(
            run.table.value("3000", "median_personal_weekly_income_interval"),
            Some(&Value::Label("650_799".to_string()))
        );
    }

    #[test]
    fn missing_source_fails_the_run() {
        let loader = MemoryLoader::new().with(SourceId::PersonalIncome, fixtures::g17(vec![("1", vec![])]));
        let err = build_features(&loader).unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(ref t) if t == "G02"));
    }
}

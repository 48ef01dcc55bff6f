//! Stage 4: occupation totals (G57) standardised by population (G01).

use crate::domain::{FeatureTable, Placement, Value};
use crate::enrich::join_source;
use crate::error::AppError;
use crate::io::SourceTable;

pub const POPULATION: &str = "population";

/// Suffix of the per-capita occupation columns.
pub const STANDARDISED_SUFFIX: &str = "_standardised";

pub const OCCUPATIONS: [(&str, &str); 9] = [
    ("P_Tot_Managers", "occupation_total_Managers"),
    ("P_Tot_Professionals", "occupation_total_Professionals"),
    ("P_Tot_TechnicTrades_W", "occupation_total_TechTradeWorkers"),
    ("P_Tot_CommunPersnlSvc_W", "occupation_total_CommunityPersonalService"),
    ("P_Tot_ClericalAdminis_W", "occupation_total_ClericalAdminWorkers"),
    ("P_Tot_Sales_W", "occupation_total_SalesWorkers"),
    ("P_Tot_Mach_oper_drivers", "occupation_total_MachineOperators"),
    ("P_Tot_Labourers", "occupation_total_Labourers"),
    ("P_Tot_Occu_ID_NS", "occupation_total_NotStated"),
];

pub fn enrich(table: FeatureTable, g57: &SourceTable, g01: &SourceTable) -> Result<FeatureTable, AppError> {
    let totals = g57.select_numeric(&OCCUPATIONS)?;
    let population = g01.select_numeric(&[("Tot_P_P", POPULATION)])?;

    let table = join_source(table, totals, Placement::Back, g57.name());
    let mut table = join_source(table, population, Placement::Front, g01.name()).sorted_by_key();

    let pop_idx = table.require_column(POPULATION)?;
    for (_, name) in OCCUPATIONS {
        let idx = table.require_column(name)?;
        // Zero population gives inf/NaN here; cleanup drops those units.
        table = table.with_column(format!("{name}{STANDARDISED_SUFFIX}"), |row| {
            Value::Number(row.number(idx) / row.number(pop_idx))
        });
    }
    Ok(table)
}

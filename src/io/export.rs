//! Export the feature table to CSV.
//!
//! One row per geographic unit; the first column is the key, named after the
//! run's index code so the file joins back onto the DataPack.

use std::path::Path;

use crate::domain::{FeatureTable, Value};
use crate::error::AppError;

/// Write `table` to `path`, creating parent directories as needed.
pub fn write_features_csv(path: &Path, table: &FeatureTable, index_code: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AppError::io("create directory", parent, e))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;

    let header = std::iter::once(index_code).chain(table.columns().iter().map(String::as_str));
    writer.write_record(header).map_err(|e| csv_error(path, e))?;

    for row in table.rows() {
        let fields = std::iter::once(row.geo_key.clone()).chain(row.values.iter().map(format_value));
        writer.write_record(fields).map_err(|e| csv_error(path, e))?;
    }

    writer.flush().map_err(|e| AppError::io("write", path, e))?;
    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        // Keep full precision; integral values print without a trailing ".0".
        Value::Number(v) => v.to_string(),
        Value::Label(s) => s.clone(),
    }
}

fn csv_error(path: &Path, source: csv::Error) -> AppError {
    AppError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_key_header_and_values_in_column_order() {
        let mut table = FeatureTable::new(vec!["population".to_string(), "interval".to_string()]);
        table.push_row("2000".to_string(), vec![Value::Number(120.0), Value::Label("650_799".to_string())]);
        table.push_row("3000".to_string(), vec![Value::Number(0.25), Value::Label("1_149".to_string())]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("features_by_POA.csv");
        write_features_csv(&path, &table, "POA_CODE_2016").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "POA_CODE_2016,population,interval\n2000,120,650_799\n3000,0.25,1_149\n"
        );
    }
}

//! The unified feature table.
//!
//! Rows are keyed by geo key and share one column list. Tables are consumed and
//! returned by value: a stage never edits a table someone else still holds.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::{GeoKey, Value};
use crate::error::AppError;

/// One geographic unit's fields, aligned with `FeatureTable::columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub geo_key: GeoKey,
    pub values: Vec<Value>,
}

impl FeatureRow {
    /// Numeric value at `idx` (NaN for labels, so arithmetic stays total).
    pub fn number(&self, idx: usize) -> f64 {
        self.values[idx].as_number().unwrap_or(f64::NAN)
    }
}

/// Where the columns of a joined table go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before the existing columns (right after the key).
    Front,
    /// After the existing columns.
    Back,
}

/// Row accounting for one join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinStats {
    pub rows_in: usize,
    pub rows_out: usize,
    pub source_rows: usize,
}

impl JoinStats {
    /// Units present in the running table but missing from the joined source.
    pub fn dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, geo_key: GeoKey, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.push(FeatureRow { geo_key, values });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.geo_key.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index`, but a missing column is a schema error.
    pub fn require_column(&self, name: &str) -> Result<usize, AppError> {
        self.column_index(name)
            .ok_or_else(|| AppError::schema("unified table", name))
    }

    pub fn row(&self, geo_key: &str) -> Option<&FeatureRow> {
        self.rows.iter().find(|r| r.geo_key == geo_key)
    }

    /// Value of `column` for `geo_key`, if both exist.
    pub fn value(&self, geo_key: &str, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.row(geo_key).map(|r| &r.values[idx])
    }

    /// Key-equality join keeping only units present on both sides.
    ///
    /// The running table's row order is preserved; `other`'s order is ignored.
    pub fn inner_join(self, other: FeatureTable, placement: Placement) -> (FeatureTable, JoinStats) {
        debug_assert!(
            other.columns.iter().all(|c| !self.columns.contains(c)),
            "joined columns must be new"
        );

        let rows_in = self.rows.len();
        let source_rows = other.rows.len();
        let mut lookup: HashMap<GeoKey, Vec<Value>> =
            other.rows.into_iter().map(|r| (r.geo_key, r.values)).collect();

        let columns = match placement {
            Placement::Front => other.columns.into_iter().chain(self.columns).collect(),
            Placement::Back => self.columns.into_iter().chain(other.columns).collect(),
        };

        let rows: Vec<FeatureRow> = self
            .rows
            .into_iter()
            .filter_map(|row| {
                let extra = lookup.remove(&row.geo_key)?;
                let values = match placement {
                    Placement::Front => extra.into_iter().chain(row.values).collect(),
                    Placement::Back => row.values.into_iter().chain(extra).collect(),
                };
                Some(FeatureRow {
                    geo_key: row.geo_key,
                    values,
                })
            })
            .collect();

        let stats = JoinStats {
            rows_in,
            rows_out: rows.len(),
            source_rows,
        };
        (FeatureTable { columns, rows }, stats)
    }

    /// Append a derived column computed from each row.
    pub fn with_column(mut self, name: impl Into<String>, mut derive: impl FnMut(&FeatureRow) -> Value) -> Self {
        for row in &mut self.rows {
            let value = derive(row);
            row.values.push(value);
        }
        self.columns.push(name.into());
        self
    }

    /// Keep only `names`, in that order.
    pub fn project(self, names: &[&str]) -> Result<FeatureTable, AppError> {
        let indices = names
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .into_iter()
            .map(|row| FeatureRow {
                values: indices.iter().map(|&i| row.values[i].clone()).collect(),
                geo_key: row.geo_key,
            })
            .collect();

        Ok(FeatureTable {
            columns: names.iter().map(|s| s.to_string()).collect(),
            rows,
        })
    }

    /// Split rows by `keep`; returns the kept table and the removed keys.
    pub fn partition(self, mut keep: impl FnMut(&FeatureRow) -> bool) -> (FeatureTable, Vec<GeoKey>) {
        let mut removed = Vec::new();
        let rows = self
            .rows
            .into_iter()
            .filter_map(|row| {
                if keep(&row) {
                    Some(row)
                } else {
                    removed.push(row.geo_key);
                    None
                }
            })
            .collect();
        (
            FeatureTable {
                columns: self.columns,
                rows,
            },
            removed,
        )
    }

    /// Order rows by geo key: numerically when every key is an integer code,
    /// lexicographically otherwise.
    pub fn sorted_by_key(mut self) -> Self {
        let numeric = self.rows.iter().all(|r| r.geo_key.parse::<u64>().is_ok());
        self.rows.sort_by(|a, b| compare_keys(&a.geo_key, &b.geo_key, numeric));
        self
    }
}

fn compare_keys(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        if let (Ok(x), Ok(y)) = (a.parse::<u64>(), b.parse::<u64>()) {
            return x.cmp(&y);
        }
    }
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(columns: &[&str], rows: &[(&str, Vec<f64>)]) -> FeatureTable {
        let mut t = FeatureTable::new(columns.iter().map(|s| s.to_string()).collect());
        for (key, values) in rows {
            t.push_row(key.to_string(), values.iter().map(|&v| Value::Number(v)).collect());
        }
        t
    }

    #[test]
    fn inner_join_drops_missing_keys_and_keeps_left_order() {
        let left = table(&["a"], &[("3", vec![3.0]), ("1", vec![1.0]), ("2", vec![2.0])]);
        let right = table(&["b"], &[("2", vec![20.0]), ("3", vec![30.0]), ("9", vec![90.0])]);

        let (joined, stats) = left.inner_join(right, Placement::Back);
        assert_eq!(joined.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(joined.keys().collect::<Vec<_>>(), vec!["3", "2"]);
        assert_eq!(joined.value("2", "b"), Some(&Value::Number(20.0)));
        assert_eq!(
            stats,
            JoinStats {
                rows_in: 3,
                rows_out: 2,
                source_rows: 3
            }
        );
        assert_eq!(stats.dropped(), 1);
    }

    #[test]
    fn join_with_full_coverage_preserves_row_count() {
        let left = table(&["a"], &[("1", vec![1.0]), ("2", vec![2.0])]);
        let right = table(&["b"], &[("1", vec![10.0]), ("2", vec![20.0])]);
        let (joined, stats) = left.inner_join(right, Placement::Front);
        assert_eq!(stats.dropped(), 0);
        assert_eq!(joined.columns(), &["b".to_string(), "a".to_string()]);
        assert_eq!(joined.rows()[1].values, vec![Value::Number(20.0), Value::Number(2.0)]);
    }

    #[test]
    fn project_reorders_and_rejects_unknown_columns() {
        let t = table(&["a", "b", "c"], &[("1", vec![1.0, 2.0, 3.0])]);
        let p = t.clone().project(&["c", "a"]).unwrap();
        assert_eq!(p.rows()[0].values, vec![Value::Number(3.0), Value::Number(1.0)]);

        let err = t.project(&["zzz"]).unwrap_err();
        assert!(matches!(err, AppError::SchemaMismatch { .. }));
    }

    #[test]
    fn sorted_by_key_uses_numeric_order_for_integer_codes() {
        let t = table(&["a"], &[("10", vec![0.0]), ("9", vec![0.0]), ("100", vec![0.0])]).sorted_by_key();
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["9", "10", "100"]);

        let t = table(&["a"], &[("POA2010", vec![0.0]), ("POA2000", vec![0.0])]).sorted_by_key();
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["POA2000", "POA2010"]);
    }

    #[test]
    fn partition_reports_removed_keys() {
        let t = table(&["a"], &[("1", vec![0.0]), ("2", vec![5.0])]);
        let (kept, removed) = t.partition(|r| r.number(0) != 0.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(removed, vec!["1".to_string()]);
    }
}

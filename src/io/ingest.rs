//! DataPack CSV ingest.
//!
//! This module turns the raw census CSV files into keyed `SourceTable`s. The
//! pipeline only sees the `SourceLoader` trait, so it can run against files on
//! disk (`DataPackLoader`) or tables built in memory (`MemoryLoader`).
//!
//! Design goals:
//! - **Strict schema**: a missing column is a hard error naming the table
//! - **Split tables**: files such as G17A/B/C are glued column-wise by row
//!   position, keeping the first copy of repeated columns
//! - **No fitting or derivation logic here**

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::debug;

use crate::buckets::BucketScheme;
use crate::config::RunConfig;
use crate::domain::{FeatureTable, GeoKey, Value};
use crate::error::AppError;
use crate::math::FrequencyRecord;

/// The census tables the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// G17: total personal income (weekly), split over three files.
    PersonalIncome,
    /// G02: selected medians and averages.
    Medians,
    /// G29: total household income (weekly).
    HouseholdIncome,
    /// G57: occupation by age and sex, split over two files.
    Occupation,
    /// G01: selected person characteristics (total population).
    Population,
    /// G40: labour force status and non-school qualifications.
    Employment,
}

impl SourceId {
    pub const ALL: [SourceId; 6] = [
        SourceId::PersonalIncome,
        SourceId::Medians,
        SourceId::HouseholdIncome,
        SourceId::Occupation,
        SourceId::Population,
        SourceId::Employment,
    ];

    /// Table name used in messages.
    pub fn table(self) -> &'static str {
        match self {
            SourceId::PersonalIncome => "G17",
            SourceId::Medians => "G02",
            SourceId::HouseholdIncome => "G29",
            SourceId::Occupation => "G57",
            SourceId::Population => "G01",
            SourceId::Employment => "G40",
        }
    }

    /// DataPack file codes that make up this table, in concatenation order.
    pub fn file_codes(self) -> &'static [&'static str] {
        match self {
            SourceId::PersonalIncome => &["G17A", "G17B", "G17C"],
            SourceId::Medians => &["G02"],
            SourceId::HouseholdIncome => &["G29"],
            SourceId::Occupation => &["G57A", "G57B"],
            SourceId::Population => &["G01"],
            SourceId::Employment => &["G40"],
        }
    }
}

/// Supplies source tables keyed by the run's geo key column.
pub trait SourceLoader {
    fn load(&self, source: SourceId) -> Result<SourceTable, AppError>;
}

/// Header row plus data rows of one CSV file, before keying.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One source row: the geo key and the raw cells (aligned with the headers).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub geo_key: GeoKey,
    pub cells: Vec<String>,
}

/// A census table keyed by geo unit, with raw string cells.
#[derive(Debug, Clone)]
pub struct SourceTable {
    name: String,
    key_column: String,
    headers: Vec<String>,
    header_map: HashMap<String, usize>,
    rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Key a single raw table by `key_column`.
    pub fn from_raw(name: &str, key_column: &str, raw: RawTable) -> Result<Self, AppError> {
        Self::concat(name, key_column, vec![raw])
    }

    /// Glue split files column-wise (row `i` of every part is the same unit),
    /// dropping repeated columns, then key the result by `key_column`.
    pub fn concat(name: &str, key_column: &str, parts: Vec<RawTable>) -> Result<Self, AppError> {
        let expected = parts.first().map(|p| p.rows.len()).unwrap_or(0);
        if let Some(bad) = parts.iter().find(|p| p.rows.len() != expected) {
            return Err(AppError::RowCountMismatch {
                table: name.to_string(),
                expected,
                found: bad.rows.len(),
            });
        }

        // Pick (part, column) pairs to keep: first occurrence of each header.
        let mut headers = Vec::new();
        let mut header_map = HashMap::new();
        let mut picks = Vec::new();
        for (part_idx, part) in parts.iter().enumerate() {
            for (col_idx, header) in part.headers.iter().enumerate() {
                if header_map.contains_key(header) {
                    continue;
                }
                header_map.insert(header.clone(), headers.len());
                headers.push(header.clone());
                picks.push((part_idx, col_idx));
            }
        }

        let key_idx = *header_map
            .get(key_column)
            .ok_or_else(|| AppError::schema(name, key_column))?;

        let mut rows = Vec::with_capacity(expected);
        let mut seen = HashMap::with_capacity(expected);
        for row_idx in 0..expected {
            let cells: Vec<String> = picks
                .iter()
                .map(|&(p, c)| parts[p].rows[row_idx].get(c).cloned().unwrap_or_default())
                .collect();
            let geo_key = cells[key_idx].trim().to_string();
            if seen.insert(geo_key.clone(), row_idx).is_some() {
                return Err(AppError::DuplicateKey {
                    table: name.to_string(),
                    geo_key,
                });
            }
            rows.push(SourceRow { geo_key, cells });
        }

        Ok(Self {
            name: name.to_string(),
            key_column: key_column.to_string(),
            headers,
            header_map,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of `column`, or a schema mismatch naming this table.
    pub fn column(&self, column: &str) -> Result<usize, AppError> {
        self.header_map
            .get(column)
            .copied()
            .ok_or_else(|| AppError::schema(&self.name, column))
    }

    /// Parse a numeric cell.
    pub fn number(&self, row: &SourceRow, idx: usize) -> Result<f64, AppError> {
        let raw = row.cells[idx].trim();
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(row, idx))
    }

    /// Parse a count cell (whole number in `0..=u32::MAX`; `12.0` is accepted).
    pub fn count(&self, row: &SourceRow, idx: usize) -> Result<u64, AppError> {
        let v = self.number(row, idx)?;
        if v < 0.0 || v.fract() != 0.0 || v > f64::from(u32::MAX) {
            return Err(self.invalid(row, idx));
        }
        Ok(v as u64)
    }

    fn invalid(&self, row: &SourceRow, idx: usize) -> AppError {
        AppError::InvalidValue {
            table: self.name.clone(),
            column: self.headers[idx].clone(),
            geo_key: row.geo_key.clone(),
            value: row.cells[idx].clone(),
        }
    }

    /// One frequency record per unit, with counts read from the scheme's columns.
    pub fn frequency_records(&self, scheme: &BucketScheme) -> Result<Vec<(GeoKey, FrequencyRecord)>, AppError> {
        let indices = scheme
            .buckets()
            .iter()
            .map(|b| self.column(b.column))
            .collect::<Result<Vec<_>, _>>()?;

        self.rows
            .iter()
            .map(|row| {
                let counts = indices
                    .iter()
                    .map(|&idx| self.count(row, idx))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((row.geo_key.clone(), FrequencyRecord::new(counts)))
            })
            .collect()
    }

    /// Select numeric columns as a feature table, renaming `(source, target)`.
    pub fn select_numeric(&self, columns: &[(&str, &str)]) -> Result<FeatureTable, AppError> {
        let indices = columns
            .iter()
            .map(|(source, _)| self.column(source))
            .collect::<Result<Vec<_>, _>>()?;

        let mut table = FeatureTable::new(columns.iter().map(|(_, target)| target.to_string()).collect());
        for row in &self.rows {
            let values = indices
                .iter()
                .map(|&idx| self.number(row, idx).map(Value::Number))
                .collect::<Result<Vec<_>, _>>()?;
            table.push_row(row.geo_key.clone(), values);
        }
        Ok(table)
    }
}

/// Reads DataPack CSVs for the configured granularity.
#[derive(Debug, Clone)]
pub struct DataPackLoader {
    dir: PathBuf,
    granularity_code: &'static str,
    index_code: String,
}

impl DataPackLoader {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            dir: config.datapack_dir(),
            granularity_code: config.granularity.code(),
            index_code: config.index_code.clone(),
        }
    }

    /// Path of one DataPack file, e.g. `2016Census_G17A_AUS_POA.csv`.
    pub fn path_for(&self, file_code: &str) -> PathBuf {
        self.dir
            .join(format!("2016Census_{file_code}_AUS_{}.csv", self.granularity_code))
    }
}

impl SourceLoader for DataPackLoader {
    fn load(&self, source: SourceId) -> Result<SourceTable, AppError> {
        let parts = source
            .file_codes()
            .iter()
            .map(|code| read_raw_csv(&self.path_for(code)))
            .collect::<Result<Vec<_>, _>>()?;
        let table = SourceTable::concat(source.table(), &self.index_code, parts)?;
        debug!(
            table = source.table(),
            rows = table.len(),
            columns = table.headers().len(),
            "loaded source table"
        );
        Ok(table)
    }
}

/// Serves pre-built tables; useful for tests and for embedding the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    tables: HashMap<SourceId, SourceTable>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: SourceId, table: SourceTable) {
        self.tables.insert(source, table);
    }

    pub fn with(mut self, source: SourceId, table: SourceTable) -> Self {
        self.insert(source, table);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, source: SourceId) -> Result<SourceTable, AppError> {
        self.tables
            .get(&source)
            .cloned()
            .ok_or_else(|| AppError::SourceUnavailable(source.table().to_string()))
    }
}

/// Read one CSV file into headers and string rows.
pub fn read_raw_csv(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path).map_err(|e| AppError::io("open", path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(normalize_header_name)
        .collect();

    let rows = reader
        .records()
        .map(|record| {
            record.map(record_cells).map_err(|e| AppError::Csv {
                path: path.to_path_buf(),
                source: e,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawTable { headers, rows })
}

fn record_cells(record: StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Left in place, the key column would never be found.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

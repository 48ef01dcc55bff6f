//! Run configuration.
//!
//! Parameters are resolved once at startup, with this precedence:
//!
//! 1. CLI flags (clap also folds in `ABS_*` environment variables and `.env`)
//! 2. the `[parameters]` table of a TOML config file
//! 3. built-in defaults
//!
//! Config files are TOML, not the INI `config.ini` of older tooling: string
//! values must be quoted (`granularity = "POA"`).
//!
//! The resulting `RunConfig` is passed by reference to the loader and exporter;
//! nothing in the pipeline reads process-wide state.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Folder layout of the 2016 General Community Profile DataPack.
const DATAPACK_ROOT: &str = "2016 Census GCP All Geographies for AUST";

/// Geographic level the DataPack is read at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    /// Postal area (postcode).
    Poa,
    Sa1,
    Sa2,
    Sa3,
    Sa4,
    /// State suburb.
    Ssc,
    /// Local government area.
    Lga,
    /// State / territory.
    Ste,
}

impl Granularity {
    pub const ALL: [Granularity; 8] = [
        Granularity::Poa,
        Granularity::Sa1,
        Granularity::Sa2,
        Granularity::Sa3,
        Granularity::Sa4,
        Granularity::Ssc,
        Granularity::Lga,
        Granularity::Ste,
    ];

    /// Code used in DataPack folder and file names.
    pub fn code(self) -> &'static str {
        match self {
            Granularity::Poa => "POA",
            Granularity::Sa1 => "SA1",
            Granularity::Sa2 => "SA2",
            Granularity::Sa3 => "SA3",
            Granularity::Sa4 => "SA4",
            Granularity::Ssc => "SSC",
            Granularity::Lga => "LGA",
            Granularity::Ste => "STE",
        }
    }

    /// Name of the geo key column (first column of every file at this level).
    pub fn default_index_code(self) -> &'static str {
        match self {
            Granularity::Poa => "POA_CODE_2016",
            Granularity::Sa1 => "SA1_7DIGITCODE_2016",
            Granularity::Sa2 => "SA2_MAINCODE_2016",
            Granularity::Sa3 => "SA3_CODE_2016",
            Granularity::Sa4 => "SA4_CODE_2016",
            Granularity::Ssc => "SSC_CODE_2016",
            Granularity::Lga => "LGA_CODE_2016",
            Granularity::Ste => "STE_CODE_2016",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Granularity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Granularity::ALL
            .into_iter()
            .find(|g| g.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Granularity::ALL.iter().map(|g| g.code()).collect();
                AppError::Config(format!("Unknown granularity '{s}' (expected one of {}).", known.join(", ")))
            })
    }
}

/// `[parameters]` table of the config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameters {
    pub granularity: Option<String>,
    pub index_code: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub parameters: Parameters,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| {
            AppError::Config(format!(
                "Invalid config file (TOML; quote string values, e.g. granularity = \"POA\"): {e}"
            ))
        })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| AppError::io("read config", path, e))?;
        Self::parse(&text)
    }

    /// Load `explicit` if given; otherwise the default file if it exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>, AppError> {
        match explicit {
            Some(path) => Self::load(path).map(Some),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Values supplied on the command line (or via environment).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub granularity: Option<Granularity>,
    pub index_code: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// Fully resolved parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub granularity: Granularity,
    /// Geo key column shared by every source file.
    pub index_code: String,
    /// Folder that contains the unpacked DataPack.
    pub base_dir: PathBuf,
    /// Feature CSV destination.
    pub output: PathBuf,
    /// Optional JSON run manifest destination.
    pub manifest: Option<PathBuf>,
}

impl RunConfig {
    pub fn resolve(overrides: Overrides, file: Option<FileConfig>) -> Result<Self, AppError> {
        let params = file.map(|f| f.parameters).unwrap_or_default();

        let granularity = match (overrides.granularity, params.granularity.as_deref()) {
            (Some(g), _) => g,
            (None, Some(s)) => s.parse()?,
            (None, None) => {
                return Err(AppError::Config(
                    "No granularity given (use --granularity, ABS_GRANULARITY or `granularity` in the config file)."
                        .to_string(),
                ));
            }
        };

        let index_code = overrides
            .index_code
            .or(params.index_code)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| granularity.default_index_code().to_string());
        if index_code.is_empty() {
            return Err(AppError::Config("Index code must not be empty.".to_string()));
        }

        let base_dir = overrides.dir.or(params.dir).unwrap_or_else(|| PathBuf::from("."));
        let output = overrides
            .output
            .or(params.output)
            .unwrap_or_else(|| base_dir.join(format!("features_by_{}.csv", granularity.code())));
        let manifest = overrides.manifest.or(params.manifest);

        Ok(Self {
            granularity,
            index_code,
            base_dir,
            output,
            manifest,
        })
    }

    /// Folder holding the CSV files for the chosen granularity.
    pub fn datapack_dir(&self) -> PathBuf {
        self.base_dir
            .join(DATAPACK_ROOT)
            .join(self.granularity.code())
            .join("AUST")
    }
}

//! Command-line parsing for the census feature builder.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline code. Values not given on the command line fall back to `ABS_*`
//! environment variables (also read from `.env`), then to the config file.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::buckets::IncomeScheme;
use crate::config::{Granularity, Overrides};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "abs-features",
    version,
    about = "Build per-area feature tables from the ABS 2016 Census DataPack"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconstruct income statistics, merge all indicator tables and write the feature CSV.
    Run(RunArgs),
    /// Print the income bucket schemes (labels, intervals, midpoints).
    Buckets(BucketsArgs),
    /// Print the stage ledger of a previously written run manifest.
    Summary(SummaryArgs),
}

#[derive(Debug, Parser, Clone, Default)]
pub struct RunArgs {
    /// TOML config file with quoted values; INI `config.ini` files are not read
    /// (defaults to ./config.toml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Geographic level (POA, SA1, SA2, SA3, SA4, SSC, LGA, STE).
    #[arg(short, long, value_enum, ignore_case = true, env = "ABS_GRANULARITY")]
    pub granularity: Option<Granularity>,

    /// Geo key column; defaults to the granularity's standard code column.
    #[arg(short, long, env = "ABS_INDEX_CODE")]
    pub index_code: Option<String>,

    /// Folder containing the unpacked DataPack.
    #[arg(short, long, env = "ABS_DATAPACK_DIR")]
    pub dir: Option<PathBuf>,

    /// Feature CSV destination (default: <dir>/features_by_<GRANULARITY>.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write a JSON run manifest here.
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
}

impl RunArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            granularity: self.granularity,
            index_code: self.index_code.clone(),
            dir: self.dir.clone(),
            output: self.output.clone(),
            manifest: self.manifest.clone(),
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct BucketsArgs {
    /// Only print this scheme.
    #[arg(value_enum)]
    pub scheme: Option<IncomeScheme>,
}

#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Manifest written by `run --manifest`.
    pub manifest: PathBuf,
}

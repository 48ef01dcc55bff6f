//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - resolves the run configuration
//! - runs the pipeline and prints reports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::buckets::IncomeScheme;
use crate::cli::{BucketsArgs, Command, RunArgs, SummaryArgs};
use crate::config::{FileConfig, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `abs-features` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal; clap picks the ABS_* variables up afterwards.
    let _ = dotenvy::dotenv();

    // `abs-features` and `abs-features -g POA` behave like `abs-features run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Buckets(args) => handle_buckets(args),
        Command::Summary(args) => handle_summary(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "abs_features=info",
        1 => "abs_features=debug",
        _ => "abs_features=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Logs go to stderr so stdout stays clean for reports.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let output = pipeline::run(&config)?;
    println!("{}", crate::report::format_run_summary(&output.manifest));
    Ok(())
}

fn handle_buckets(args: BucketsArgs) -> Result<(), AppError> {
    let schemes: Vec<IncomeScheme> = match args.scheme {
        Some(scheme) => vec![scheme],
        None => IncomeScheme::ALL.to_vec(),
    };
    for scheme in schemes {
        println!("{}", crate::report::format_bucket_scheme(scheme.scheme()));
    }
    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let manifest = crate::io::read_manifest(&args.manifest)?;
    println!("{}", crate::report::format_run_summary(&manifest));
    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let file = FileConfig::discover(args.config.as_deref())?;
    RunConfig::resolve(args.overrides(), file)
}

/// Rewrite argv so `abs-features` defaults to `abs-features run`.
///
/// Rules:
/// - `abs-features`                      -> `abs-features run`
/// - `abs-features -g POA ...`           -> `abs-features run -g POA ...`
/// - `abs-features -v buckets`           -> unchanged (global flag before a subcommand)
/// - `abs-features --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if is_subcommand(&arg1) {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags" unless a subcommand
    // follows later (e.g. `-v summary run.json`).
    if arg1.starts_with('-') && !argv[1..].iter().any(|a| is_subcommand(a)) {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

fn is_subcommand(arg: &str) -> bool {
    matches!(arg, "run" | "buckets" | "summary")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs() {
        assert_eq!(rewrite_args(argv(&["abs-features"])), argv(&["abs-features", "run"]));
    }

    #[test]
    fn leading_flags_are_run_flags() {
        assert_eq!(
            rewrite_args(argv(&["abs-features", "-g", "POA"])),
            argv(&["abs-features", "run", "-g", "POA"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [
            &["abs-features", "--help"][..],
            &["abs-features", "buckets"][..],
            &["abs-features", "-v", "summary", "m.json"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }
}

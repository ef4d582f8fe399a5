//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - dispatches to the fit pipeline or the limb-darkening lookup
//! - prints the report

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, LimbArgs};
use crate::domain::{FitConfig, WavelengthRange};
use crate::error::AppError;
use crate::limb::load_limb_table;

pub mod pipeline;

/// Entry point for the `vsini` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `vsini star.csv 1 turbospectrum` behaves like `vsini fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(&cli.log_level);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Limb(args) => handle_limb(args),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Logs go to stderr so stdout stays clean for the result line.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    println!(
        "{}",
        crate::report::format_vsini(&run.synthesis.outcome.params, &run.synthesis.outcome.errors)
    );
    Ok(())
}

fn handle_limb(args: LimbArgs) -> Result<(), AppError> {
    let grid = load_limb_table(&args.table.limb_table, &args.table.limb_column)?;
    let coeff = grid.coefficient_for(args.teff, args.logg, args.mh);
    if !grid.in_range(args.teff, args.logg, args.mh) {
        tracing::warn!("query outside the tabulated range; returning the fallback coefficient");
    }
    println!("{coeff}");
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        input: args.input.clone(),
        line_list: args.line_list,
        code: args.code,
        ispec_dir: args.ispec_dir.clone(),
        toolkit_url: args.toolkit_url.clone(),
        timeout_secs: args.timeout_secs,
        limb_table: args.table.limb_table.clone(),
        limb_column: args.table.limb_column.clone(),
        atmosphere: args.atmosphere,
        wavelength: WavelengthRange::new(args.wave_min, args.wave_max),
        max_iterations: args.max_iterations,
        output_dir: args.output_dir.clone(),
    }
}

/// Rewrite argv so a bare invocation defaults to `fit`.
///
/// Rules:
/// - `vsini`                        -> unchanged (clap prints usage)
/// - `vsini --help/--version/-h`    -> unchanged
/// - `vsini fit ...` / `limb ...`   -> unchanged
/// - `vsini star.csv 1 moog`        -> `vsini fit star.csv 1 moog`
/// - `vsini --log-level debug ...`  -> unchanged (global flag first)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "limb");
    if is_subcommand || arg1.starts_with('-') {
        return argv;
    }

    argv.insert(1, "fit".to_string());
    argv
}

use anyhow::{Context, Result};
use clap::Parser;
use doxycheck::{Check, CheckConfig, DoxyCheck, Rules};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(
    name = "doxycheck",
    about = "Check the Doxygen documentation of C and C++ sources",
    version
)]
struct Cli {
    /// Source file or directory to check
    input: PathBuf,

    /// Print the report as JSON instead of one diagnostic per line
    #[clap(long)]
    json: bool,

    /// Do not report undocumented enumerators and fields
    #[clap(long)]
    no_members: bool,

    /// Only log errors
    #[clap(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug output
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = CheckConfig::new(cli.input).with_rules(Rules {
        undocumented_members: !cli.no_members,
        ..Rules::default()
    });

    let report = DoxyCheck::new()
        .check(&config)
        .with_context(|| format!("failed to check {}", config.root.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in &report.diagnostics {
            println!("{}", diagnostic);
        }
        if !cli.quiet {
            eprintln!(
                "{} file(s) checked: {} warning(s), {} error(s)",
                report.files.len(),
                report.warnings(),
                report.errors()
            );
        }
    }

    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("DOXYCHECK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

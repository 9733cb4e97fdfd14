// slscheck - SLS master register vs. GeoPackage consistency checks

mod check;
mod config;
mod exit_codes;
mod worker;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_CHECK_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "slscheck")]
#[command(about = "Check SLS codes and names between a master register and a GeoPackage")]
#[command(version)]
struct Cli {
    /// Log engine detail to stderr (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a GeoPackage layer against the master register
    #[command(after_help = "\
Examples:
  slscheck check --geometry sls.gpkg --master master.xlsx
  slscheck check --geometry sls.gpkg --master master.xlsx --out report.csv
  slscheck check --geometry sls.gpkg --master master.csv --config kec010.toml --strict
  slscheck check --geometry sls.gpkg --master master.xlsx --layer sls_final --json")]
    Check {
        /// GeoPackage with the SLS polygons
        #[arg(long, short = 'g')]
        geometry: PathBuf,

        /// Master register (.xlsx, .xls or .csv)
        #[arg(long, short = 'm')]
        master: PathBuf,

        /// Column mapping / report settings (TOML)
        #[arg(long, short = 'c', env = "SLSCHECK_CONFIG")]
        config: Option<PathBuf>,

        /// GeoPackage layer (overrides config; default: first feature table)
        #[arg(long)]
        layer: Option<String>,

        /// Master register worksheet (overrides config; default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Write the report CSV
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Print the full result as JSON to stdout instead of the human summary
        #[arg(long)]
        json: bool,

        /// Write the full result as JSON to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress progress lines
        #[arg(long, short = 'q')]
        quiet: bool,

        /// Exit 6 when any row is not Matched
        #[arg(long)]
        strict: bool,
    },

    /// List the feature tables in a GeoPackage
    #[command(after_help = "\
Examples:
  slscheck layers sls.gpkg")]
    Layers {
        /// GeoPackage file
        file: PathBuf,
    },

    /// Inspect check configs
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Also installs the `log` bridge used by the library crates.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            geometry,
            master,
            config,
            layer,
            sheet,
            out,
            json,
            output,
            quiet,
            strict,
        } => check::cmd_check(check::CheckArgs {
            geometry,
            master,
            config,
            layer,
            sheet,
            out,
            json,
            output,
            quiet,
            strict,
        }),
        Commands::Layers { file } => cmd_layers(file),
        Commands::Config(cmd) => config::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_CHECK_IO, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// layers
// ============================================================================

fn cmd_layers(file: PathBuf) -> Result<(), CliError> {
    if !file.exists() {
        return Err(CliError::usage(format!("GeoPackage file not found: {}", file.display())));
    }
    let layers = slscheck_io::list_layers(&file).map_err(CliError::io)?;
    if layers.is_empty() {
        return Err(CliError::usage(format!("no feature tables in {}", file.display()))
            .with_hint("is this a GeoPackage exported with polygon layers?"));
    }
    for name in layers {
        println!("{}", name);
    }
    Ok(())
}

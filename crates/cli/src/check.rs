//! `slscheck check` — run the consistency check and report.

use std::fmt::Write as _;
use std::path::PathBuf;

use slscheck_recon::{ReconConfig, ReconResult};

use crate::exit_codes::{EXIT_CHECK_INVALID_CONFIG, EXIT_CHECK_MISMATCH};
use crate::worker::{self, Job};
use crate::CliError;

/// Non-matched rows listed in the human summary.
const SUMMARY_ROW_LIMIT: usize = 20;

pub struct CheckArgs {
    pub geometry: PathBuf,
    pub master: PathBuf,
    pub config: Option<PathBuf>,
    pub layer: Option<String>,
    pub sheet: Option<String>,
    pub out: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub quiet: bool,
    pub strict: bool,
}

pub fn cmd_check(args: CheckArgs) -> Result<(), CliError> {
    slscheck_io::check_inputs(&args.geometry, &args.master).map_err(|e| {
        CliError::usage(e).with_hint("slscheck check --geometry sls.gpkg --master master.xlsx")
    })?;

    let mut config = match &args.config {
        Some(path) => crate::config::load_config(path)?,
        None => ReconConfig::default(),
    };
    if args.layer.is_some() {
        config.geometry.layer = args.layer;
    }
    if args.sheet.is_some() {
        config.master.sheet = args.sheet;
    }
    config
        .validate()
        .map_err(|e| CliError::new(EXIT_CHECK_INVALID_CONFIG, e.to_string()))?;

    let rx = worker::spawn(Job {
        config,
        geometry: args.geometry,
        master: args.master,
    });
    let quiet = args.quiet;
    let result = worker::wait(rx, &mut |line| {
        if !quiet {
            eprintln!("{}", line);
        }
    })
    .map_err(|e| CliError::new(e.exit_code(), e.to_string()))?;

    if let Some(path) = &args.out {
        slscheck_io::write_report_csv(path, &result.report).map_err(CliError::io)?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(path) = &args.output {
        slscheck_io::write_result_json(path, &result).map_err(CliError::io)?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", render_summary(&result, args.out.is_some()));
    }

    let non_matched = result.summary.non_matched();
    if args.strict && non_matched > 0 {
        return Err(CliError::new(
            EXIT_CHECK_MISMATCH,
            format!("{non_matched} row(s) not matched"),
        ));
    }

    Ok(())
}

/// Human-readable summary: counts, then the first non-matched rows.
pub fn render_summary(result: &ReconResult, exported: bool) -> String {
    let s = &result.summary;
    let mut out = String::new();

    let _ = writeln!(out, "=== SUMMARY ===");
    let _ = writeln!(out, "Total rows: {}", s.total);
    let _ = writeln!(out, "Matched: {}", s.matched);
    let _ = writeln!(out, "Missing from master: {}", s.missing_from_master);
    let _ = writeln!(out, "Missing from geometry: {}", s.missing_from_geometry);
    let _ = writeln!(out, "Name mismatches: {}", s.name_mismatches);
    let _ = writeln!(out, "Code mismatches: {}", s.code_mismatches);
    let _ = writeln!(
        out,
        "KDSUBSLS digit issues: {} geometry, {} master",
        s.geometry_digit_issues, s.master_digit_issues
    );

    let mismatches: Vec<_> = result.rows.iter().filter(|r| !r.status.is_matched()).collect();
    if mismatches.is_empty() {
        let _ = writeln!(out, "\nAll records are consistent.");
        return out;
    }

    let _ = writeln!(out, "\nFound {} inconsistent row(s):", mismatches.len());
    for (i, row) in mismatches.iter().take(SUMMARY_ROW_LIMIT).enumerate() {
        let _ = writeln!(out, "{}. IDSUB_SLS {}: {}", i + 1, row.identifier, row.status);
    }
    if mismatches.len() > SUMMARY_ROW_LIMIT {
        let _ = writeln!(out, "…");
        if !exported {
            let _ = writeln!(out, "(use --out report.csv for the full list)");
        }
    }
    out
}

//! CLI Exit Code Registry
//!
//! Single source of truth for `slscheck` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 2    | Usage error, missing or unsupported input file       |
//! | 3    | Invalid config (TOML parse or validation failure)    |
//! | 4    | Required column missing, or an input has no rows     |
//! | 5    | I/O failure reading inputs or writing outputs        |
//! | 6    | Non-matched rows found (`check --strict` only)       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant here
//! 2. Update the table above
//! 3. Wire it into the relevant command's error handling

use slscheck_recon::ReconError;

// =============================================================================
// Universal
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing file, wrong file extension.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// check / config
// =============================================================================

/// Config file could not be parsed or failed validation.
pub const EXIT_CHECK_INVALID_CONFIG: u8 = 3;

/// A configured column is absent, or an input has no data rows.
pub const EXIT_CHECK_INPUT: u8 = 4;

/// Reading an input or writing an output failed.
pub const EXIT_CHECK_IO: u8 = 5;

/// `--strict` and at least one row is not Matched.
pub const EXIT_CHECK_MISMATCH: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CHECK_INVALID_CONFIG,
        ReconError::MissingColumn { .. } | ReconError::EmptyInput { .. } => EXIT_CHECK_INPUT,
        ReconError::Io(_) => EXIT_CHECK_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slscheck_recon::Source;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_USAGE,
            EXIT_CHECK_INVALID_CONFIG,
            EXIT_CHECK_INPUT,
            EXIT_CHECK_IO,
            EXIT_CHECK_MISMATCH,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn recon_errors_map_to_codes() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), 3);
        assert_eq!(
            recon_exit_code(&ReconError::MissingColumn { source: Source::Master, column: "kdsubsls".into() }),
            4
        );
        assert_eq!(recon_exit_code(&ReconError::EmptyInput { source: Source::Geometry }), 4);
        assert_eq!(recon_exit_code(&ReconError::Io("disk".into())), 5);
    }
}

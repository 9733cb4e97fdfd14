//! `slscheck config` — validate and print check configs.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use slscheck_recon::ReconConfig;

use crate::exit_codes::{EXIT_CHECK_INVALID_CONFIG, EXIT_CHECK_IO};
use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Parse and validate a config without running a check
    #[command(after_help = "\
Examples:
  slscheck config validate kec010.toml")]
    Validate {
        /// Path to the config TOML
        file: PathBuf,
    },

    /// Print the effective config (defaults filled in) as TOML
    #[command(after_help = "\
Examples:
  slscheck config show
  slscheck config show kec010.toml")]
    Show {
        /// Path to the config TOML (built-in defaults when omitted)
        file: Option<PathBuf>,
    },
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { file } => {
            let config = load_config(&file)?;
            eprintln!("{}: ok ({})", file.display(), config.name);
            Ok(())
        }
        ConfigCommands::Show { file } => {
            let config = match file {
                Some(path) => load_config(&path)?,
                None => ReconConfig::default(),
            };
            let text = config
                .to_toml()
                .map_err(|e| CliError::new(EXIT_CHECK_INVALID_CONFIG, e.to_string()))?;
            print!("{}", text);
            Ok(())
        }
    }
}

/// Read, parse and validate a config file.
pub fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_CHECK_IO, format!("cannot read config {}: {e}", path.display()))
    })?;
    ReconConfig::from_toml(&text).map_err(|e| {
        CliError::new(EXIT_CHECK_INVALID_CONFIG, format!("{}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_valid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.toml");
        fs::write(&path, "name = \"Kec 010\"\n[geometry]\nlayer = \"sls_final\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.name, "Kec 010");
        assert_eq!(config.geometry.layer.as_deref(), Some("sls_final"));
    }

    #[test]
    fn invalid_config_uses_config_exit_code() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.toml");
        fs::write(&path, "[report]\nprogress_interval = 0\n").unwrap();
        assert_eq!(load_config(&path).unwrap_err().code, EXIT_CHECK_INVALID_CONFIG);

        fs::write(&path, "[master]\nunknown = 1\n").unwrap();
        assert_eq!(load_config(&path).unwrap_err().code, EXIT_CHECK_INVALID_CONFIG);
    }

    #[test]
    fn unreadable_config_is_io() {
        let err = load_config(Path::new("/nonexistent/c.toml")).unwrap_err();
        assert_eq!(err.code, EXIT_CHECK_IO);
    }
}

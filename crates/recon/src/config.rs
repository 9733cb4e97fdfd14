use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub master: MasterConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

fn default_name() -> String {
    "SLS consistency check".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            master: MasterConfig::default(),
            geometry: GeometryConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MasterConfig {
    /// Worksheet to read. First sheet when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeometryConfig {
    /// GeoPackage feature table. First feature table when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(default)]
    pub columns: ColumnMapping,
}

/// Header names of the three attribute fields in one source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    #[serde(default = "default_idsubsls")]
    pub idsubsls: String,
    #[serde(default = "default_kdsubsls")]
    pub kdsubsls: String,
    #[serde(default = "default_nmsls")]
    pub nmsls: String,
}

fn default_idsubsls() -> String {
    "idsubsls".into()
}

fn default_kdsubsls() -> String {
    "kdsubsls".into()
}

fn default_nmsls() -> String {
    "nmsls".into()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            idsubsls: default_idsubsls(),
            kdsubsls: default_kdsubsls(),
            nmsls: default_nmsls(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Max digit-issue detail rows per source in the assembled report.
    #[serde(default = "default_anomaly_detail_limit")]
    pub anomaly_detail_limit: usize,
    /// Scanner emits a progress event every N features.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

fn default_anomaly_detail_limit() -> usize {
    10
}

fn default_progress_interval() -> usize {
    100
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            anomaly_detail_limit: default_anomaly_detail_limit(),
            progress_interval: default_progress_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        validate_columns("master", &self.master.columns)?;
        validate_columns("geometry", &self.geometry.columns)?;

        if self.report.progress_interval == 0 {
            return Err(ReconError::ConfigValidation(
                "report.progress_interval must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

fn validate_columns(section: &str, columns: &ColumnMapping) -> Result<(), ReconError> {
    let named = [
        ("idsubsls", &columns.idsubsls),
        ("kdsubsls", &columns.kdsubsls),
        ("nmsls", &columns.nmsls),
    ];

    for (field, value) in named {
        if value.trim().is_empty() {
            return Err(ReconError::ConfigValidation(format!(
                "{section}.columns.{field} must not be empty"
            )));
        }
    }

    for (i, (field_a, a)) in named.iter().enumerate() {
        for (field_b, b) in &named[i + 1..] {
            if a.trim() == b.trim() {
                return Err(ReconError::ConfigValidation(format!(
                    "{section}.columns: {field_a} and {field_b} both map to '{a}'"
                )));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

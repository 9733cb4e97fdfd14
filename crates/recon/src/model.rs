use std::collections::{BTreeMap, HashSet};

use serde::{Serialize, Serializer};

use crate::config::ColumnMapping;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which dataset a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Master,
    Geometry,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Geometry => write!(f, "geometry"),
        }
    }
}

/// A single cell as delivered by a source reader.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Value the reader could not represent as a scalar (error cell, blob, ...).
    Malformed(String),
}

impl FieldValue {
    /// Coerce to text. `None` for nulls and malformed values.
    ///
    /// Integral floats render without a fraction so a numeric `5` from a
    /// spreadsheet compares equal to the text `"5"` from a feature table.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::Malformed(_) => None,
            Self::Text(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// Materialized tabular source: header row plus data rows.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<FieldValue>>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Typed view of one master row or geometry feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlsRow {
    pub idsubsls: Option<String>,
    pub kdsubsls: Option<String>,
    pub nmsls: Option<String>,
}

impl SlsRow {
    pub fn new(idsubsls: &str, kdsubsls: &str, nmsls: &str) -> Self {
        Self {
            idsubsls: Some(idsubsls.into()),
            kdsubsls: Some(kdsubsls.into()),
            nmsls: Some(nmsls.into()),
        }
    }

    /// Convert a raw table into typed rows, failing fast on missing columns.
    pub fn from_table(
        source: Source,
        table: &SourceTable,
        columns: &ColumnMapping,
    ) -> Result<Vec<SlsRow>, ReconError> {
        let idx = |name: &str| -> Result<usize, ReconError> {
            table
                .headers
                .iter()
                .position(|h| h.trim() == name)
                .or_else(|| {
                    table
                        .headers
                        .iter()
                        .position(|h| h.trim().eq_ignore_ascii_case(name))
                })
                .ok_or_else(|| ReconError::MissingColumn {
                    source,
                    column: name.into(),
                })
        };

        let id_idx = idx(&columns.idsubsls)?;
        let code_idx = idx(&columns.kdsubsls)?;
        let name_idx = idx(&columns.nmsls)?;

        let mut malformed = 0usize;
        let mut cell = |row: &[FieldValue], i: usize, column: &str| -> Option<String> {
            let value = row.get(i)?;
            if let FieldValue::Malformed(detail) = value {
                malformed += 1;
                log::warn!("{source}: unreadable value in column '{column}' treated as empty ({detail})");
            }
            value.as_text()
        };

        let rows: Vec<SlsRow> = table
            .rows
            .iter()
            .map(|row| SlsRow {
                idsubsls: cell(row, id_idx, &columns.idsubsls),
                kdsubsls: cell(row, code_idx, &columns.kdsubsls),
                nmsls: cell(row, name_idx, &columns.nmsls),
            })
            .collect();

        if malformed > 0 {
            log::info!("{source}: {malformed} malformed field(s) recovered as empty");
        }

        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Normalized records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasterRecord {
    pub name: String,
    pub code: String,
    pub code_original: String,
}

/// Master register keyed by identifier. Ordered so leftover entries come out sorted.
pub type MasterRegistry = BTreeMap<String, MasterRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryRecord {
    pub identifier: String,
    pub name: String,
    pub code: String,
    pub code_original: String,
}

/// Output of a geometry scan.
#[derive(Debug, Clone, Default)]
pub struct GeometryScan {
    pub records: Vec<GeometryRecord>,
    pub seen: HashSet<String>,
    pub anomalies: Vec<DigitAnomaly>,
}

// ---------------------------------------------------------------------------
// Digit anomalies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyReason {
    TooLong,
    TooShort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitAnomaly {
    pub source: Source,
    pub identifier: String,
    pub raw_code: String,
    pub reason: AnomalyReason,
}

impl DigitAnomaly {
    /// Human-readable line used in the digit-issue detail rows.
    pub fn describe(&self) -> String {
        let label = match self.source {
            Source::Master => "Master",
            Source::Geometry => "Geometry",
        };
        let what = match self.reason {
            AnomalyReason::TooLong => "has more than 2 digits",
            AnomalyReason::TooShort => "has only 1 digit",
        };
        format!("{label} - ID: {}: kdsubsls '{}' {what}", self.identifier, self.raw_code)
    }
}

// ---------------------------------------------------------------------------
// Reconciliation rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Matched,
    /// At least one of the two flags is set.
    Mismatch { name: bool, code: bool },
    MissingFromMaster,
    MissingFromGeometry,
}

impl RowStatus {
    pub fn compare(name_equal: bool, code_equal: bool) -> Self {
        if name_equal && code_equal {
            Self::Matched
        } else {
            Self::Mismatch { name: !name_equal, code: !code_equal }
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched)
    }

    pub fn has_name_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { name: true, .. })
    }

    pub fn has_code_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { code: true, .. })
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matched => write!(f, "Matched"),
            Self::Mismatch { name, code } => {
                let mut issues = Vec::with_capacity(2);
                if *name {
                    issues.push("NameMismatch");
                }
                if *code {
                    issues.push("CodeMismatch");
                }
                write!(f, "{}", issues.join(", "))
            }
            Self::MissingFromMaster => write!(f, "MissingFromMaster"),
            Self::MissingFromGeometry => write!(f, "MissingFromGeometry"),
        }
    }
}

impl Serialize for RowStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRow {
    pub identifier: String,
    pub name_geometry: String,
    pub name_master: String,
    pub code_geometry: String,
    pub code_geometry_original: String,
    pub code_master: String,
    pub code_master_original: String,
    pub status: RowStatus,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportRowKind {
    #[default]
    Reconciliation,
    DigitSummary,
    DigitIssue,
}

/// One row of the exported report. Field names are the export column contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReportRow {
    #[serde(rename = "IDSUB_SLS")]
    pub idsub_sls: String,
    #[serde(rename = "NMSLS_GPKG")]
    pub nmsls_gpkg: String,
    #[serde(rename = "NMSLS_MASTER")]
    pub nmsls_master: String,
    #[serde(rename = "KDSUBSLS_GPKG")]
    pub kdsubsls_gpkg: String,
    #[serde(rename = "KDSUBSLS_GPKG_ORIGINAL")]
    pub kdsubsls_gpkg_original: String,
    #[serde(rename = "KDSUBSLS_MASTER")]
    pub kdsubsls_master: String,
    #[serde(rename = "KDSUBSLS_MASTER_ORIGINAL")]
    pub kdsubsls_master_original: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(skip)]
    pub kind: ReportRowKind,
}

/// Column order of the exported report.
pub const REPORT_COLUMNS: [&str; 8] = [
    "IDSUB_SLS",
    "NMSLS_GPKG",
    "NMSLS_MASTER",
    "KDSUBSLS_GPKG",
    "KDSUBSLS_GPKG_ORIGINAL",
    "KDSUBSLS_MASTER",
    "KDSUBSLS_MASTER_ORIGINAL",
    "Status",
];

impl ReportRow {
    pub fn is_reconciliation_row(&self) -> bool {
        self.kind == ReportRowKind::Reconciliation
    }

    /// Field values in [`REPORT_COLUMNS`] order.
    pub fn fields(&self) -> [&str; 8] {
        [
            &self.idsub_sls,
            &self.nmsls_gpkg,
            &self.nmsls_master,
            &self.kdsubsls_gpkg,
            &self.kdsubsls_gpkg_original,
            &self.kdsubsls_master,
            &self.kdsubsls_master_original,
            &self.status,
        ]
    }
}

impl From<&ReconciliationRow> for ReportRow {
    fn from(row: &ReconciliationRow) -> Self {
        ReportRow {
            idsub_sls: row.identifier.clone(),
            nmsls_gpkg: row.name_geometry.clone(),
            nmsls_master: row.name_master.clone(),
            kdsubsls_gpkg: row.code_geometry.clone(),
            kdsubsls_gpkg_original: row.code_geometry_original.clone(),
            kdsubsls_master: row.code_master.clone(),
            kdsubsls_master_original: row.code_master_original.clone(),
            status: row.status.to_string(),
            kind: ReportRowKind::Reconciliation,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total: usize,
    pub matched: usize,
    pub missing_from_master: usize,
    pub missing_from_geometry: usize,
    pub name_mismatches: usize,
    pub code_mismatches: usize,
    pub master_digit_issues: usize,
    pub geometry_digit_issues: usize,
}

impl ReconSummary {
    /// Rows that are anything other than `Matched`.
    pub fn non_matched(&self) -> usize {
        self.total - self.matched
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub master_rows: usize,
    pub geometry_features: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<ReconciliationRow>,
    pub master_anomalies: Vec<DigitAnomaly>,
    pub geometry_anomalies: Vec<DigitAnomaly>,
    pub report: Vec<ReportRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: Vec<Vec<FieldValue>>) -> SourceTable {
        SourceTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.into())
    }

    #[test]
    fn field_value_text_coercion() {
        assert_eq!(FieldValue::Null.as_text(), None);
        assert_eq!(FieldValue::Int(7).as_text().as_deref(), Some("7"));
        assert_eq!(FieldValue::Float(5.0).as_text().as_deref(), Some("5"));
        assert_eq!(FieldValue::Float(1.5).as_text().as_deref(), Some("1.5"));
        assert_eq!(FieldValue::Bool(true).as_text().as_deref(), Some("true"));
        assert_eq!(FieldValue::Malformed("#REF!".into()).as_text(), None);
        assert_eq!(text("05").as_text().as_deref(), Some("05"));
    }

    #[test]
    fn from_table_maps_columns_in_any_order() {
        let t = table(
            &["nmsls", "geom_id", "kdsubsls", "idsubsls"],
            vec![vec![text("RT 01"), FieldValue::Int(9), text("1"), text("A1")]],
        );
        let rows = SlsRow::from_table(Source::Master, &t, &ColumnMapping::default()).unwrap();
        assert_eq!(rows, vec![SlsRow::new("A1", "1", "RT 01")]);
    }

    #[test]
    fn from_table_header_match_is_case_insensitive_fallback() {
        let t = table(&["IDSUBSLS", "KdSubSls", "NMSLS"], vec![vec![text("A1"), text("01"), text("X")]]);
        let rows = SlsRow::from_table(Source::Geometry, &t, &ColumnMapping::default()).unwrap();
        assert_eq!(rows[0].idsubsls.as_deref(), Some("A1"));
    }

    #[test]
    fn from_table_missing_column() {
        let t = table(&["idsubsls", "nmsls"], vec![]);
        let err = SlsRow::from_table(Source::Geometry, &t, &ColumnMapping::default()).unwrap_err();
        assert_eq!(
            err,
            ReconError::MissingColumn { source: Source::Geometry, column: "kdsubsls".into() }
        );
    }

    #[test]
    fn from_table_short_rows_and_malformed_cells_become_none() {
        let t = table(
            &["idsubsls", "kdsubsls", "nmsls"],
            vec![vec![text("A1"), FieldValue::Malformed("blob".into())]],
        );
        let rows = SlsRow::from_table(Source::Master, &t, &ColumnMapping::default()).unwrap();
        assert_eq!(rows[0].kdsubsls, None);
        assert_eq!(rows[0].nmsls, None);
    }

    #[test]
    fn status_display() {
        assert_eq!(RowStatus::Matched.to_string(), "Matched");
        assert_eq!(RowStatus::compare(false, true).to_string(), "NameMismatch");
        assert_eq!(RowStatus::compare(true, false).to_string(), "CodeMismatch");
        assert_eq!(RowStatus::compare(false, false).to_string(), "NameMismatch, CodeMismatch");
        assert_eq!(RowStatus::MissingFromMaster.to_string(), "MissingFromMaster");
        assert_eq!(RowStatus::MissingFromGeometry.to_string(), "MissingFromGeometry");
    }

    #[test]
    fn report_row_serializes_with_export_column_names() {
        let row = ReportRow { idsub_sls: "A1".into(), status: "Matched".into(), ..Default::default() };
        let json = serde_json::to_value(&row).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 8);
        for col in REPORT_COLUMNS {
            assert!(obj.contains_key(col), "missing {col}");
        }
        assert_eq!(obj["IDSUB_SLS"], "A1");
    }

    #[test]
    fn anomaly_description() {
        let a = DigitAnomaly {
            source: Source::Geometry,
            identifier: "A1".into(),
            raw_code: "123".into(),
            reason: AnomalyReason::TooLong,
        };
        assert_eq!(a.describe(), "Geometry - ID: A1: kdsubsls '123' has more than 2 digits");
    }
}

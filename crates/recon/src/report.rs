use crate::model::{
    DigitAnomaly, ReconSummary, ReconciliationRow, ReportRow, ReportRowKind, RowStatus, Source,
};

pub const DIGIT_REPORT_MARKER: &str = "=== KDSUBSLS DIGIT ISSUES ===";
pub const STATUS_DIGIT_REPORT: &str = "DigitReport";
pub const STATUS_DIGIT_ISSUE_GEOMETRY: &str = "DigitIssueGeometry";
pub const STATUS_DIGIT_ISSUE_MASTER: &str = "DigitIssueMaster";

/// Flatten reconciliation rows and digit anomalies into the export sequence.
///
/// Layout: every reconciliation row, one marker row with per-source anomaly
/// totals, then at most `detail_limit` geometry anomalies followed by at most
/// `detail_limit` master anomalies. The cap only affects this listing.
pub fn assemble_report(
    rows: &[ReconciliationRow],
    master_anomalies: &[DigitAnomaly],
    geometry_anomalies: &[DigitAnomaly],
    detail_limit: usize,
) -> Vec<ReportRow> {
    let shown = master_anomalies.len().min(detail_limit) + geometry_anomalies.len().min(detail_limit);
    let mut report = Vec::with_capacity(rows.len() + 1 + shown);

    report.extend(rows.iter().map(ReportRow::from));

    report.push(ReportRow {
        idsub_sls: DIGIT_REPORT_MARKER.into(),
        kdsubsls_gpkg: format!("Total geometry issues: {}", geometry_anomalies.len()),
        kdsubsls_master: format!("Total master issues: {}", master_anomalies.len()),
        status: STATUS_DIGIT_REPORT.into(),
        kind: ReportRowKind::DigitSummary,
        ..Default::default()
    });

    for anomaly in geometry_anomalies.iter().take(detail_limit) {
        report.push(anomaly_row(anomaly));
    }
    for anomaly in master_anomalies.iter().take(detail_limit) {
        report.push(anomaly_row(anomaly));
    }

    report
}

fn anomaly_row(anomaly: &DigitAnomaly) -> ReportRow {
    let mut row = ReportRow {
        idsub_sls: anomaly.identifier.clone(),
        kind: ReportRowKind::DigitIssue,
        ..Default::default()
    };
    match anomaly.source {
        Source::Geometry => {
            row.kdsubsls_gpkg = anomaly.describe();
            row.status = STATUS_DIGIT_ISSUE_GEOMETRY.into();
        }
        Source::Master => {
            row.kdsubsls_master = anomaly.describe();
            row.status = STATUS_DIGIT_ISSUE_MASTER.into();
        }
    }
    row
}

/// Compute summary statistics over reconciliation rows.
pub fn compute_summary(
    rows: &[ReconciliationRow],
    master_anomalies: &[DigitAnomaly],
    geometry_anomalies: &[DigitAnomaly],
) -> ReconSummary {
    let mut summary = ReconSummary {
        total: rows.len(),
        master_digit_issues: master_anomalies.len(),
        geometry_digit_issues: geometry_anomalies.len(),
        ..Default::default()
    };

    for row in rows {
        match row.status {
            RowStatus::Matched => summary.matched += 1,
            RowStatus::MissingFromMaster => summary.missing_from_master += 1,
            RowStatus::MissingFromGeometry => summary.missing_from_geometry += 1,
            RowStatus::Mismatch { name, code } => {
                if name {
                    summary.name_mismatches += 1;
                }
                if code {
                    summary.code_mismatches += 1;
                }
            }
        }
    }

    summary
}

use std::collections::HashSet;

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::model::{
    GeometryRecord, MasterRegistry, ReconMeta, ReconResult, ReconciliationRow, RowStatus,
    SlsRow, Source, SourceTable,
};
use crate::progress::ProgressEvent;
use crate::registry::load_registry;
use crate::report::{assemble_report, compute_summary};
use crate::scanner::scan_geometry;

/// Run the full check: typed rows, master load, geometry scan, join, report.
///
/// Either returns a complete result or an error; nothing partial is published.
pub fn run(
    config: &ReconConfig,
    master: &SourceTable,
    geometry: &SourceTable,
    progress: &mut dyn FnMut(ProgressEvent),
) -> Result<ReconResult, ReconError> {
    progress(ProgressEvent::stage("Reading master register..."));
    let master_rows = SlsRow::from_table(Source::Master, master, &config.master.columns)?;
    let loaded = load_registry(&master_rows)?;
    progress(ProgressEvent::stage(format!(
        "Loaded {} rows from master register.",
        master_rows.len()
    )));
    if !loaded.anomalies.is_empty() {
        progress(ProgressEvent::stage(format!(
            "Warning: {} kdsubsls digit issue(s) in master register",
            loaded.anomalies.len()
        )));
    }

    progress(ProgressEvent::stage("Reading geometry features..."));
    let features = SlsRow::from_table(Source::Geometry, geometry, &config.geometry.columns)?;
    progress(ProgressEvent::stage(format!(
        "Loaded {} features from geometry dataset.",
        features.len()
    )));

    progress(ProgressEvent::stage("Comparing records..."));
    let scan = scan_geometry(&features, config.report.progress_interval, progress);

    progress(ProgressEvent::stage("Checking register entries missing from geometry..."));
    let rows = reconcile(&loaded.registry, &scan.records, &scan.seen);

    let report = assemble_report(
        &rows,
        &loaded.anomalies,
        &scan.anomalies,
        config.report.anomaly_detail_limit,
    );
    let summary = compute_summary(&rows, &loaded.anomalies, &scan.anomalies);

    log::info!(
        "{}: {} rows, {} matched, {} missing from master, {} missing from geometry",
        config.name,
        summary.total,
        summary.matched,
        summary.missing_from_master,
        summary.missing_from_geometry
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            master_rows: master_rows.len(),
            geometry_features: features.len(),
        },
        summary,
        rows,
        master_anomalies: loaded.anomalies,
        geometry_anomalies: scan.anomalies,
        report,
    })
}

/// Join geometry records against the register.
///
/// Geometry-driven rows come first in scan order, then one
/// `MissingFromGeometry` row per unseen register entry in ascending
/// identifier order.
pub fn reconcile(
    registry: &MasterRegistry,
    records: &[GeometryRecord],
    seen: &HashSet<String>,
) -> Vec<ReconciliationRow> {
    let mut rows = Vec::with_capacity(records.len());

    for rec in records {
        let row = match registry.get(&rec.identifier) {
            Some(master) => ReconciliationRow {
                identifier: rec.identifier.clone(),
                name_geometry: rec.name.clone(),
                name_master: master.name.clone(),
                code_geometry: rec.code.clone(),
                code_geometry_original: rec.code_original.clone(),
                code_master: master.code.clone(),
                code_master_original: master.code_original.clone(),
                status: RowStatus::compare(rec.name == master.name, rec.code == master.code),
            },
            None => ReconciliationRow {
                identifier: rec.identifier.clone(),
                name_geometry: rec.name.clone(),
                name_master: String::new(),
                code_geometry: rec.code.clone(),
                code_geometry_original: rec.code_original.clone(),
                code_master: String::new(),
                code_master_original: String::new(),
                status: RowStatus::MissingFromMaster,
            },
        };
        rows.push(row);
    }

    // BTreeMap iteration is already ascending by identifier.
    for (identifier, master) in registry {
        if seen.contains(identifier) {
            continue;
        }
        rows.push(ReconciliationRow {
            identifier: identifier.clone(),
            name_geometry: String::new(),
            name_master: master.name.clone(),
            code_geometry: String::new(),
            code_geometry_original: String::new(),
            code_master: master.code.clone(),
            code_master_original: master.code_original.clone(),
            status: RowStatus::MissingFromGeometry,
        });
    }

    rows
}

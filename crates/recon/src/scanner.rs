use crate::model::{DigitAnomaly, GeometryRecord, GeometryScan, SlsRow, Source};
use crate::normalize::normalize_code;
use crate::progress::ProgressEvent;

/// Normalize geometry features in input order.
///
/// Features without an identifier are skipped and never enter `seen`.
/// A `Scanning` event is emitted every `progress_interval` features.
pub fn scan_geometry(
    features: &[SlsRow],
    progress_interval: usize,
    progress: &mut dyn FnMut(ProgressEvent),
) -> GeometryScan {
    let total = features.len();
    let interval = progress_interval.max(1);
    let mut scan = GeometryScan {
        records: Vec::with_capacity(total),
        ..Default::default()
    };
    let mut skipped = 0usize;

    for (index, feature) in features.iter().enumerate() {
        if index % interval == 0 {
            progress(ProgressEvent::Scanning { done: index, total });
        }

        let identifier = match feature.idsubsls.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let name = feature.nmsls.as_deref().unwrap_or("").trim().to_string();
        let code = normalize_code(feature.kdsubsls.as_deref());

        if let Some(reason) = code.anomaly {
            scan.anomalies.push(DigitAnomaly {
                source: Source::Geometry,
                identifier: identifier.clone(),
                raw_code: code.original.clone(),
                reason,
            });
        }

        scan.seen.insert(identifier.clone());
        scan.records.push(GeometryRecord {
            identifier,
            name,
            code: code.normalized,
            code_original: code.original,
        });
    }

    if skipped > 0 {
        log::warn!("geometry: {skipped} feature(s) without idsubsls skipped");
    }
    log::debug!(
        "geometry: {} features -> {} records, {} digit issue(s)",
        total,
        scan.records.len(),
        scan.anomalies.len()
    );

    scan
}

use crate::error::ReconError;
use crate::model::{DigitAnomaly, MasterRecord, MasterRegistry, SlsRow, Source};
use crate::normalize::normalize_code;

/// Master register plus the digit anomalies found while loading it.
#[derive(Debug, Clone, Default)]
pub struct LoadedRegistry {
    pub registry: MasterRegistry,
    pub anomalies: Vec<DigitAnomaly>,
    /// Identifiers that appeared more than once; the last row won.
    pub duplicates: Vec<String>,
    /// Rows dropped for having no identifier.
    pub skipped: usize,
}

/// Build the identifier-keyed master register.
///
/// Duplicate identifiers overwrite earlier rows. Rows without an identifier
/// cannot be joined and are skipped.
pub fn load_registry(rows: &[SlsRow]) -> Result<LoadedRegistry, ReconError> {
    if rows.is_empty() {
        return Err(ReconError::EmptyInput { source: Source::Master });
    }

    let mut loaded = LoadedRegistry::default();

    for row in rows {
        let identifier = row.idsubsls.as_deref().unwrap_or("").trim().to_string();
        if identifier.is_empty() {
            loaded.skipped += 1;
            continue;
        }
        let name = row.nmsls.as_deref().unwrap_or("").trim().to_string();
        let code = normalize_code(row.kdsubsls.as_deref());

        if let Some(reason) = code.anomaly {
            loaded.anomalies.push(DigitAnomaly {
                source: Source::Master,
                identifier: identifier.clone(),
                raw_code: code.original.clone(),
                reason,
            });
        }

        let previous = loaded.registry.insert(
            identifier.clone(),
            MasterRecord {
                name,
                code: code.normalized,
                code_original: code.original,
            },
        );
        if previous.is_some() {
            loaded.duplicates.push(identifier);
        }
    }

    if loaded.skipped > 0 {
        log::warn!("master: {} row(s) without idsubsls skipped", loaded.skipped);
    }
    if !loaded.duplicates.is_empty() {
        log::warn!(
            "master: {} duplicate identifier row(s), last occurrence kept",
            loaded.duplicates.len()
        );
    }
    log::debug!(
        "master: {} rows -> {} identifiers, {} digit issue(s)",
        rows.len(),
        loaded.registry.len(),
        loaded.anomalies.len()
    );

    Ok(loaded)
}

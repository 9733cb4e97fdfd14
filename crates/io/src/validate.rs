// Input file checks run before any reading starts

use std::path::Path;

/// Both inputs must exist; the geometry file must be `.gpkg` and the master
/// register `.xlsx`, `.xls` or `.csv`.
pub fn check_inputs(geometry: &Path, master: &Path) -> Result<(), String> {
    if !geometry.exists() {
        return Err(format!("GeoPackage file not found: {}", geometry.display()));
    }
    if !master.exists() {
        return Err(format!("master register file not found: {}", master.display()));
    }
    if !has_extension(geometry, &["gpkg"]) {
        return Err(format!(
            "GeoPackage file must have a .gpkg extension: {}",
            geometry.display()
        ));
    }
    if !has_extension(master, &["xlsx", "xls", "csv"]) {
        return Err(format!(
            "master register must be .xlsx, .xls or .csv: {}",
            master.display()
        ));
    }
    Ok(())
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.iter().any(|a| e.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

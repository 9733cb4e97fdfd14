// Master register loading, dispatched on file extension

use std::path::Path;

use slscheck_recon::SourceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterFormat {
    Excel,
    Csv,
}

impl MasterFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Read the master register. `sheet` only applies to spreadsheet formats.
pub fn read_master(path: &Path, sheet: Option<&str>) -> Result<SourceTable, String> {
    match MasterFormat::from_path(path) {
        Some(MasterFormat::Excel) => crate::xlsx::read_table(path, sheet),
        Some(MasterFormat::Csv) => {
            if let Some(sheet) = sheet {
                log::warn!("sheet '{}' ignored for delimited file {}", sheet, path.display());
            }
            crate::csv::read_table(path)
        }
        None => Err(format!(
            "unsupported master register format: {} (expected .xlsx, .xls or .csv)",
            path.display()
        )),
    }
}

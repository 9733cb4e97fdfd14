// Excel master register import (xlsx, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use slscheck_recon::{FieldValue, SourceTable};

/// Read one worksheet as a table. The first non-empty row is the header.
///
/// `sheet = None` reads the first sheet.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<SourceTable, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                format!(
                    "sheet '{}' not found (available: {})",
                    wanted,
                    sheet_names.join(", ")
                )
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| cell_value(cell).as_text().unwrap_or_default().trim().to_string())
            .collect(),
        None => return Ok(SourceTable::default()),
    };

    let mut table = SourceTable::new(headers);
    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        table.rows.push(row.iter().map(cell_value).collect());
    }

    log::debug!(
        "{}: sheet '{}' -> {} data rows",
        path.display(),
        sheet_name,
        table.len()
    );

    Ok(table)
}

fn cell_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::Null,
        Data::String(s) if s.is_empty() => FieldValue::Null,
        Data::String(s) => FieldValue::Text(s.clone()),
        Data::Float(n) => FieldValue::Float(*n),
        Data::Int(n) => FieldValue::Int(*n),
        Data::Bool(b) => FieldValue::Bool(*b),
        Data::Error(e) => FieldValue::Malformed(format!("#{:?}", e)),
        // Date serials carry no meaning for codes or names; keep the number
        Data::DateTime(dt) => FieldValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => FieldValue::Text(s.clone()),
        Data::DurationIso(s) => FieldValue::Text(s.clone()),
    }
}

// Report export: CSV with the fixed column contract, JSON for the full result

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use slscheck_recon::model::REPORT_COLUMNS;
use slscheck_recon::{ReconResult, ReportRow};

/// Column positions of KDSUBSLS_GPKG and KDSUBSLS_MASTER.
const PADDED_COLUMNS: [usize; 2] = [3, 5];

pub fn write_report_csv(path: &Path, rows: &[ReportRow]) -> Result<(), String> {
    let writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    write_report(writer, rows)
}

pub fn report_to_csv_string(rows: &[ReportRow]) -> Result<String, String> {
    let mut buf = Vec::new();
    write_report(csv::Writer::from_writer(&mut buf), rows)?;
    String::from_utf8(buf).map_err(|e| e.to_string())
}

fn write_report<W: Write>(mut writer: csv::Writer<W>, rows: &[ReportRow]) -> Result<(), String> {
    writer.write_record(REPORT_COLUMNS).map_err(|e| e.to_string())?;

    for row in rows {
        let mut fields: Vec<String> = row.fields().iter().map(|f| f.to_string()).collect();
        for i in PADDED_COLUMNS {
            fields[i] = pad_code(&fields[i]).into_owned();
        }
        writer.write_record(&fields).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

/// Left-pad a lone digit to two characters; everything else is untouched.
pub fn pad_code(value: &str) -> Cow<'_, str> {
    if value.len() == 1 && value.bytes().all(|b| b.is_ascii_digit()) {
        Cow::Owned(format!("{:0>2}", value))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn write_result_json(path: &Path, result: &ReconResult) -> Result<(), String> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| format!("JSON serialization error: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("cannot write {}: {}", path.display(), e))
}

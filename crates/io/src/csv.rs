// CSV/TSV master register import

use std::io::Read;
use std::path::Path;

use slscheck_recon::{FieldValue, SourceTable};

/// Read a delimited file: first record is the header, empty cells become nulls.
pub fn read_table(path: &Path) -> Result<SourceTable, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    table_from_string(&content, delimiter)
}

pub fn table_from_string(content: &str, delimiter: u8) -> Result<SourceTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = SourceTable::new(headers);

    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        table.rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        FieldValue::Null
                    } else {
                        FieldValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(table)
}

/// Pick the delimiter (tab, semicolon, comma, pipe) that splits the header into
/// the most fields and keeps that field count across the first data lines.
/// Falls back to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(10).collect();

    let mut best = (b',', 0usize);
    for delim in [b'\t', b';', b',', b'|'] {
        let Some(width) = sample.first().map(|line| field_count(line, delim)) else {
            break;
        };
        if width < 2 {
            continue;
        }
        let steady = sample.iter().filter(|line| field_count(line, delim) == width).count();
        let score = steady * width;
        if score > best.1 {
            best = (delim, score);
        }
    }
    best.0
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(1, |r| r.len())
}

/// Read a file as UTF-8, falling back to Windows-1252.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel-exported CSVs are commonly Windows-1252
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sniffs_semicolon() {
        let content = "idsubsls;kdsubsls;nmsls\nA1;01;RT 01\nB2;02;RT 02\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn keeps_leading_zeros_and_maps_empty_to_null() {
        let table = table_from_string("idsubsls,kdsubsls,nmsls\nA1,05,X\nB2,,Y\n", b',').unwrap();
        assert_eq!(table.headers, vec!["idsubsls", "kdsubsls", "nmsls"]);
        assert_eq!(table.rows[0][1], FieldValue::Text("05".into()));
        assert_eq!(table.rows[1][1], FieldValue::Null);
    }

    #[test]
    fn skips_blank_lines_and_bom() {
        let table = table_from_string("\u{feff}idsubsls,kdsubsls,nmsls\nA1,1,X\n,,\n", b',').unwrap();
        assert_eq!(table.headers[0], "idsubsls");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn decodes_windows_1252() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master.csv");
        // "Cibogo Ñ" with Ñ as 0xD1
        let mut bytes = b"idsubsls,kdsubsls,nmsls\nA1,01,Cibogo ".to_vec();
        bytes.push(0xD1);
        bytes.push(b'\n');
        fs::write(&path, bytes).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.rows[0][2], FieldValue::Text("Cibogo \u{d1}".into()));
    }
}

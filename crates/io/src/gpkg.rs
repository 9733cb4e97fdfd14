// GeoPackage feature attribute import
//
// A GeoPackage is an SQLite database. Feature tables are registered in
// `gpkg_contents` and their geometry column in `gpkg_geometry_columns`.
// Only attribute columns are read; the geometry payload is skipped.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use slscheck_recon::{FieldValue, SourceTable};

fn open(path: &Path) -> Result<Connection, String> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| format!("cannot open GeoPackage {}: {}", path.display(), e))
}

/// Feature table names, sorted.
pub fn list_layers(path: &Path) -> Result<Vec<String>, String> {
    let conn = open(path)?;
    feature_tables(&conn)
}

fn feature_tables(conn: &Connection) -> Result<Vec<String>, String> {
    let mut stmt = conn
        .prepare("SELECT table_name FROM gpkg_contents WHERE data_type = 'features' ORDER BY table_name")
        .map_err(|e| format!("not a GeoPackage (gpkg_contents unreadable): {}", e))?;

    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    Ok(names)
}

fn geometry_column(conn: &Connection, table: &str) -> Result<Option<String>, String> {
    conn.query_row(
        "SELECT column_name FROM gpkg_geometry_columns WHERE table_name = ?1",
        params![table],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map_err(|e| e.to_string())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Read the attribute columns of one feature table.
///
/// `layer = None` picks the first feature table by name.
pub fn read_features(path: &Path, layer: Option<&str>) -> Result<SourceTable, String> {
    let conn = open(path)?;
    let layers = feature_tables(&conn)?;

    let table_name = match layer {
        Some(wanted) => {
            if !layers.iter().any(|l| l == wanted) {
                return Err(format!(
                    "layer '{}' is not a feature table (available: {})",
                    wanted,
                    layers.join(", ")
                ));
            }
            wanted.to_string()
        }
        None => layers
            .first()
            .cloned()
            .ok_or_else(|| "GeoPackage contains no feature tables".to_string())?,
    };

    let geom_col = geometry_column(&conn, &table_name)?;

    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {}", quote_ident(&table_name)))
        .map_err(|e| e.to_string())?;

    let all_columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let keep: Vec<usize> = all_columns
        .iter()
        .enumerate()
        .filter(|(_, name)| geom_col.as_deref().map_or(true, |g| !g.eq_ignore_ascii_case(name)))
        .map(|(i, _)| i)
        .collect();

    let mut table = SourceTable::new(keep.iter().map(|&i| all_columns[i].clone()).collect());

    let mut rows = stmt.query([]).map_err(|e| e.to_string())?;
    while let Some(row) = rows.next().map_err(|e| e.to_string())? {
        let mut values = Vec::with_capacity(keep.len());
        for &i in &keep {
            let value = match row.get_ref(i).map_err(|e| e.to_string())? {
                ValueRef::Null => FieldValue::Null,
                ValueRef::Integer(n) => FieldValue::Int(n),
                ValueRef::Real(f) => FieldValue::Float(f),
                ValueRef::Text(bytes) => FieldValue::Text(String::from_utf8_lossy(bytes).into_owned()),
                ValueRef::Blob(bytes) => FieldValue::Malformed(format!("{}-byte blob", bytes.len())),
            };
            values.push(value);
        }
        table.rows.push(values);
    }

    log::debug!(
        "{}: layer '{}' -> {} features",
        path.display(),
        table_name,
        table.len()
    );

    Ok(table)
}

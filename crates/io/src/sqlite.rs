// SQLite reference import

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use ownerdata_engine::Table;

/// Read every row of `table_name` from the database at `path`.
///
/// The database is opened read-only. Values render to text; NULL becomes an
/// empty cell.
pub fn load_table(path: &Path, table_name: &str) -> Result<Table, String> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| e.to_string())?;

    let query = format!("SELECT * FROM {}", quote_ident(table_name));
    let mut stmt = conn.prepare(&query).map_err(|e| e.to_string())?;

    let headers: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = headers.len();
    let mut table = Table::new(headers);

    let mut rows = stmt.query([]).map_err(|e| e.to_string())?;
    while let Some(row) = rows.next().map_err(|e| e.to_string())? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            let value = row.get_ref(i).map_err(|e| e.to_string())?;
            values.push(value_text(value));
        }
        table.push_row(values);
    }

    log::debug!("{}: {} row(s) from {}", path.display(), table.len(), table_name);
    Ok(table)
}

fn value_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(n) => n.to_string(),
        ValueRef::Real(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", f as i64)
            } else {
                format!("{}", f)
            }
        }
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

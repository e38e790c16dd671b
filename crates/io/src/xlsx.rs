// Excel import (calamine) and export (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook as XlsxWorkbook};

use ownerdata_engine::Table;

/// Excel's hard sheet limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

const SHEET_NAME: &str = "Sheet1";

/// Stamped into docProps/core.xml so the same table always exports to the
/// same bytes.
const CREATED: (u16, u8, u8) = (2000, 1, 1);

/// Import the first worksheet of an Excel file (xlsx, xls, xlsb, ods).
///
/// The first row of the used range is the header. Every cell is rendered as
/// text. Blank rows inside the used range are kept as rows of empty cells.
pub fn import(path: &Path) -> Result<Table, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };

    let mut table = Table::new(header_row.iter().map(cell_text).collect());
    for row in rows {
        table.push_row(row.iter().map(cell_text).collect());
    }
    Ok(table)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Format nicely: integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}", dt.as_f64()),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Export a table to a single-sheet workbook. All cells are written as text
/// so ids and phone numbers keep their exact digits.
pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    if table.len() + 1 > MAX_ROWS {
        return Err(format!("{} rows exceed the Excel limit of {MAX_ROWS}", table.len()));
    }
    if table.headers.len() > MAX_COLS {
        return Err(format!(
            "{} columns exceed the Excel limit of {MAX_COLS}",
            table.headers.len()
        ));
    }

    let (year, month, day) = CREATED;
    let created = ExcelDateTime::from_ymd(year, month, day)
        .map_err(|e| format!("Failed to set workbook properties: {}", e))?;
    let properties = DocProperties::new().set_creation_datetime(&created);

    let mut xlsx_workbook = XlsxWorkbook::new();
    xlsx_workbook.set_properties(&properties);
    let worksheet = xlsx_workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| format!("Failed to create sheet '{}': {}", SHEET_NAME, e))?;

    let header_format = Format::new().set_bold();
    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| format!("Failed to write header ({}): {}", col, e))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate().take(MAX_COLS) {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(row32, col as u16, value)
                .map_err(|e| format!("Failed to write cell ({}, {}): {}", row32, col, e))?;
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

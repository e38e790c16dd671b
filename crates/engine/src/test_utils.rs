//! Fixture builders shared by the unit and integration tests.
//!
//! Compiled for this crate's own tests, and for other crates with the
//! `test-utils` feature.

use std::collections::BTreeMap;

use crate::reference::{Reference, REQUIRED_COLUMNS};
use crate::run::{InputSource, OutputSink};
use crate::table::{Table, TableFormat};

/// Reference table with every required column; unnamed cells are empty.
pub fn reference_table(rows: &[&[(&str, &str)]]) -> Table {
    let mut table = Table::new(REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect());
    for row in rows {
        let mut values = vec![String::new(); REQUIRED_COLUMNS.len()];
        for (name, value) in row.iter() {
            let col = table.column(name).expect("known reference column");
            values[col] = value.to_string();
        }
        table.push_row(values);
    }
    table
}

/// Indexed [`reference_table`].
pub fn reference(rows: &[&[(&str, &str)]]) -> Reference {
    Reference::from_table(&reference_table(rows)).expect("valid reference table")
}

/// Input held in memory; `load` hands out a clone on every call.
pub struct MemorySource {
    pub name: String,
    pub format: TableFormat,
    pub table: Table,
}

impl MemorySource {
    pub fn csv(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            name: name.into(),
            format: TableFormat::Csv,
            table: Table::from_rows(headers, rows),
        }
    }
}

impl InputSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> TableFormat {
        self.format
    }

    fn load(&self) -> Result<Table, String> {
        Ok(self.table.clone())
    }
}

/// Sink keeping every emitted dataset by output name.
#[derive(Default)]
pub struct MemorySink {
    pub outputs: BTreeMap<String, (TableFormat, Table)>,
}

impl MemorySink {
    pub fn table(&self, name: &str) -> &Table {
        &self.outputs.get(name).unwrap_or_else(|| panic!("no output {name}")).1
    }
}

impl OutputSink for MemorySink {
    fn emit(&mut self, name: &str, format: TableFormat, table: &Table) -> Result<String, String> {
        self.outputs.insert(name.to_string(), (format, table.clone()));
        Ok(format!("mem://{name}"))
    }
}

//! Input normalization: key-column detection, row explosion and key cleanup.
//!
//! Normalization is a pure function of the table, so the orchestrator can run
//! it once to count rows and again to match without holding every file.

use std::fmt;

use log::warn;

use crate::normalize::{is_missing_token, normalize_header, normalize_phone, strip_serial_prefix};
use crate::table::Table;

/// Which key an input file is matched on. Exactly one per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Id,
    Phone,
    Serial,
}

impl KeyKind {
    /// Detection precedence when a file carries more than one key column.
    const PRECEDENCE: [KeyKind; 3] = [KeyKind::Id, KeyKind::Serial, KeyKind::Phone];

    /// Canonical column name, as documented for input files.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Phone => "phone_number",
            Self::Serial => "BTP SN",
        }
    }

    /// Separator for multi-valued key cells.
    pub fn delimiter(&self) -> char {
        match self {
            Self::Id | Self::Serial => '|',
            Self::Phone => ',',
        }
    }

    fn from_header(header: &str) -> Option<Self> {
        match normalize_header(header).as_str() {
            "id" => Some(Self::Id),
            "phonenumber" => Some(Self::Phone),
            "btpsn" => Some(Self::Serial),
            _ => None,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// The single active key of an exploded input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKey {
    Id(String),
    Phone(String),
    Serial(String),
}

impl InputKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Id(_) => KeyKind::Id,
            Self::Phone(_) => KeyKind::Phone,
            Self::Serial(_) => KeyKind::Serial,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Id(v) | Self::Phone(v) | Self::Serial(v) => v,
        }
    }
}

/// One row after explosion. `fields` is the original row (padded to the
/// header width) with the key cell replaced by the cleaned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub key: InputKey,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    pub headers: Vec<String>,
    pub key_kind: KeyKind,
    pub key_column: usize,
    pub records: Vec<InputRecord>,
    /// Exploded tokens dropped as empty / `nan`.
    pub dropped: usize,
}

impl NormalizedInput {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Find the active key column. Returns `None` when the file has none of the
/// recognized key columns.
pub fn detect_key_column(headers: &[String]) -> Option<(KeyKind, usize)> {
    let found: Vec<(KeyKind, usize)> = KeyKind::PRECEDENCE
        .iter()
        .filter_map(|kind| {
            headers
                .iter()
                .position(|h| KeyKind::from_header(h) == Some(*kind))
                .map(|col| (*kind, col))
        })
        .collect();

    if found.len() > 1 {
        warn!(
            "multiple key columns present ({}); matching on \"{}\"",
            found.iter().map(|(_, c)| headers[*c].as_str()).collect::<Vec<_>>().join(", "),
            headers[found[0].1],
        );
    }
    found.first().copied()
}

/// Explode and clean one input table. `None` when no key column is present.
pub fn normalize_input(table: &Table) -> Option<NormalizedInput> {
    let (key_kind, key_column) = detect_key_column(&table.headers)?;
    let delimiter = key_kind.delimiter();

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in 0..table.len() {
        let base = table.padded_row(row);
        let cell = base[key_column].clone();

        for token in cell.split(delimiter) {
            let key = match key_kind {
                KeyKind::Phone => InputKey::Phone(normalize_phone(Some(token))),
                KeyKind::Id => {
                    if is_missing_token(token) {
                        dropped += 1;
                        continue;
                    }
                    InputKey::Id(token.trim().to_string())
                }
                KeyKind::Serial => {
                    if is_missing_token(token) {
                        dropped += 1;
                        continue;
                    }
                    InputKey::Serial(strip_serial_prefix(token))
                }
            };

            let mut fields = base.clone();
            fields[key_column] = key.value().to_string();
            records.push(InputRecord { key, fields });
        }
    }

    Some(NormalizedInput {
        headers: table.headers.clone(),
        key_kind,
        key_column,
        records,
        dropped,
    })
}

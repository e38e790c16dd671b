//! Reference ("bottoms-up") records: schema validation, key normalization and
//! the immutable arena every match reads from.

use log::{debug, warn};

use crate::error::{EngineError, SchemaError};
use crate::index::ReferenceIndex;
use crate::normalize::{normalize_key, normalize_phone};
use crate::table::Table;

/// Attributes the reference table must expose, in the order they are
/// reported when missing.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "contact_group_id",
    "phone1",
    "phone2",
    "phone3",
    "phone4",
    "phone5",
    "Serial Number",
    "date_created",
    "Owner",
    "Input: Address",
    "Input: City",
    "Input: State",
    "County",
    "State",
    "Contact Type",
    "# of Interests",
    "is_latest_offer",
    "Category",
    "Total Value - Low ($)",
    "md_address",
    "md_city",
    "md_state",
];

// Positions within REQUIRED_COLUMNS.
const ID_POS: usize = 0;
const GROUP_POS: usize = 1;
const FIRST_PHONE_POS: usize = 2;
const SERIAL_POS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// Uppercased, trimmed. Never empty.
    pub id: String,
    /// Trimmed group id; `None` when absent or blank.
    pub group_id: Option<String>,
    /// Normalized digits per slot, possibly empty.
    pub phones: [String; 5],
    /// Serial number as stored (normalized only for lookups).
    pub serial_number: String,
    /// One value per `REQUIRED_COLUMNS` entry, with `id` and the phone slots
    /// already normalized.
    values: Vec<String>,
}

impl ReferenceRecord {
    /// Value of a required attribute by name; unknown names read as empty.
    pub fn get(&self, column: &str) -> &str {
        REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// The loaded reference dataset plus its lookup index. Built once per run,
/// read-only afterwards.
#[derive(Debug)]
pub struct Reference {
    records: Vec<ReferenceRecord>,
    index: ReferenceIndex,
}

impl Reference {
    /// Validate the required schema, normalize keys, and build the index.
    ///
    /// Rows with an empty id cannot be matched or enriched and are dropped.
    pub fn from_table(table: &Table) -> Result<Self, EngineError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| table.column(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingReferenceColumns { missing }.into());
        }

        let positions: Vec<usize> = REQUIRED_COLUMNS
            .iter()
            .filter_map(|c| table.column(c))
            .collect();

        let mut records = Vec::with_capacity(table.len());
        let mut dropped = 0usize;

        for row in 0..table.len() {
            let mut values: Vec<String> = positions
                .iter()
                .map(|&col| table.cell(row, col).to_string())
                .collect();

            let id = normalize_key(&values[ID_POS]);
            if id.is_empty() {
                dropped += 1;
                continue;
            }
            values[ID_POS] = id.clone();

            let mut phones: [String; 5] = Default::default();
            for (slot, phone) in phones.iter_mut().enumerate() {
                let value_idx = FIRST_PHONE_POS + slot;
                *phone = normalize_phone(Some(&values[value_idx]));
                values[value_idx] = phone.clone();
            }

            let group = values[GROUP_POS].trim();
            let group_id = (!group.is_empty()).then(|| group.to_string());
            let serial_number = values[SERIAL_POS].clone();

            records.push(ReferenceRecord {
                id,
                group_id,
                phones,
                serial_number,
                values,
            });
        }

        if dropped > 0 {
            warn!("dropped {dropped} reference row(s) without an id");
        }

        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<ReferenceRecord>) -> Self {
        let index = ReferenceIndex::build(&records);
        debug!(
            "reference index: {} records, {} ids, {} phones, {} serials, {} groups",
            records.len(),
            index.id_count(),
            index.phone_count(),
            index.serial_count(),
            index.group_count(),
        );
        Self { records, index }
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record (storage order) carrying `id`. Duplicate ids resolve to
    /// the first one loaded.
    pub fn first_with_id(&self, id: &str) -> Option<&ReferenceRecord> {
        self.index
            .by_id(id)
            .first()
            .and_then(|&pos| self.records.get(pos))
    }

    /// Group of the first record with `id` that has a non-empty group.
    pub fn group_of(&self, id: &str) -> Option<&str> {
        self.index
            .by_id(id)
            .iter()
            .filter_map(|&pos| self.records.get(pos))
            .find_map(|r| r.group_id.as_deref())
    }
}

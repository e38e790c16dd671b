//! Row enrichment: input fields plus a fixed attribute set copied from the
//! matched reference record.

use crate::input::InputRecord;
use crate::normalize::format_date;
use crate::reference::ReferenceRecord;
use crate::table::Table;

/// Reference attributes copied onto every output row, in output order.
pub const ENRICHMENT_COLUMNS: &[&str] = &[
    "id",
    "date_created",
    "Owner",
    "Input: Address",
    "Input: City",
    "Input: State",
    "County",
    "State",
    "Contact Type",
    "# of Interests",
    "contact_group_id",
    "is_latest_offer",
    "Category",
    "Total Value - Low ($)",
    "md_address",
    "md_city",
    "md_state",
];

pub const DATE_COLUMN: &str = "date_created";

/// Column layout of one output dataset.
///
/// Input columns keep their order; enrichment columns not already present
/// are appended. An input column that shares a name with an enrichment
/// column is overwritten in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    headers: Vec<String>,
    input_width: usize,
    /// Output position of each `ENRICHMENT_COLUMNS` entry.
    targets: Vec<usize>,
}

impl OutputLayout {
    pub fn new(input_headers: &[String]) -> Self {
        let mut headers = input_headers.to_vec();
        let targets = ENRICHMENT_COLUMNS
            .iter()
            .map(|name| match headers.iter().position(|h| h == name) {
                Some(pos) => pos,
                None => {
                    headers.push(name.to_string());
                    headers.len() - 1
                }
            })
            .collect();
        Self {
            headers,
            input_width: input_headers.len(),
            targets,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Build one output row. `None` blanks every enrichment attribute.
    pub fn enrich(&self, record: &InputRecord, matched: Option<&ReferenceRecord>) -> Vec<String> {
        let mut row = record.fields.clone();
        row.resize(self.input_width, String::new());
        row.resize(self.headers.len(), String::new());
        for (name, &pos) in ENRICHMENT_COLUMNS.iter().zip(&self.targets) {
            row[pos] = matched.map(|m| m.get(name).to_string()).unwrap_or_default();
        }
        row
    }

    /// Empty output table with this layout's header.
    pub fn table(&self) -> Table {
        Table::new(self.headers.clone())
    }
}

/// Rewrite the `date_created` column (if any) as `YYYY-MM-DD`, blanking
/// values that do not parse.
pub fn finalize_dates(table: &mut Table) {
    let Some(col) = table.column(DATE_COLUMN) else {
        return;
    };
    for row in &mut table.rows {
        if let Some(cell) = row.get_mut(col) {
            *cell = format_date(cell);
        }
    }
}

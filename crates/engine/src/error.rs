use std::fmt;
use std::path::PathBuf;

/// Schema problems in either the reference table or an input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Reference table lacks required attributes (listed in required order).
    MissingReferenceColumns { missing: Vec<String> },
    /// Input file has none of the recognized key columns.
    NoKeyColumn { file: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingReferenceColumns { missing } => {
                write!(f, "reference table is missing required columns: {}", quoted(missing))
            }
            Self::NoKeyColumn { file } => write!(
                f,
                "{file}: missing required columns [\"id\", \"phone_number\", \"BTP SN\"]"
            ),
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    /// No reference source in the reference directory.
    NotFound { dir: PathBuf },
    /// More than one reference source in the reference directory.
    AmbiguousSource { dir: PathBuf, files: Vec<String> },
    Schema(SchemaError),
    /// No input files or no rows after normalization. Not a failure: the
    /// orchestrator turns this into a "nothing to process" outcome.
    EmptyInput(String),
    /// Loader or writer failure (file read, sqlite, xlsx encode, ...).
    Io(String),
    /// Matching invariant broken; indicates a bug, never bad input.
    Contract(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { dir } => write!(f, "no .db file found in {}", dir.display()),
            Self::AmbiguousSource { dir, files } => write!(
                f,
                "multiple .db files found in {}, expected only one: {}",
                dir.display(),
                files.join(", ")
            ),
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::EmptyInput(msg) => write!(f, "nothing to process: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Contract(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<SchemaError> for EngineError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

fn quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

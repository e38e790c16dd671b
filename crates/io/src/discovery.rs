// Folder discovery for the reference database and input files

use std::path::{Path, PathBuf};

use ownerdata_engine::{EngineError, TableFormat};

const DB_EXTENSION: &str = "db";

/// Regular files in `dir`, sorted by file name. A missing directory reads as
/// empty.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir)
        .map_err(|e| EngineError::Io(format!("{}: {e}", dir.display())))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::Io(format!("{}: {e}", dir.display())))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Every `.db` file in `dir` (case-insensitive extension), sorted.
pub fn reference_candidates(dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    Ok(list_files(dir)?
        .into_iter()
        .filter(|p| has_extension(p, DB_EXTENSION))
        .collect())
}

/// The single reference database in `dir`.
pub fn find_reference_db(dir: &Path) -> Result<PathBuf, EngineError> {
    let mut candidates = reference_candidates(dir)?;
    match candidates.len() {
        0 => Err(EngineError::NotFound { dir: dir.to_path_buf() }),
        1 => Ok(candidates.remove(0)),
        _ => Err(EngineError::AmbiguousSource {
            dir: dir.to_path_buf(),
            files: candidates.iter().map(|p| file_name(p)).collect(),
        }),
    }
}

/// CSV and XLSX files in `dir` with their formats, sorted by name.
pub fn list_input_files(dir: &Path) -> Result<Vec<(PathBuf, TableFormat)>, EngineError> {
    Ok(list_files(dir)?
        .into_iter()
        .filter_map(|p| {
            let format = p
                .extension()
                .and_then(|e| e.to_str())
                .and_then(TableFormat::from_extension)?;
            Some((p, format))
        })
        .collect())
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// File-backed input sources and output sink

use std::path::{Path, PathBuf};

use ownerdata_engine::{EngineError, InputSource, OutputSink, Table, TableFormat};

use crate::discovery::{file_name, list_input_files};

/// An input file, read fresh on every `load`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
    format: TableFormat,
}

impl FileSource {
    pub fn new(path: PathBuf, format: TableFormat) -> Self {
        let name = file_name(&path);
        Self { path, name, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InputSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> TableFormat {
        self.format
    }

    fn load(&self) -> Result<Table, String> {
        match self.format {
            TableFormat::Csv => crate::csv::import(&self.path),
            TableFormat::Xlsx => crate::xlsx::import(&self.path),
        }
    }
}

/// Every CSV/XLSX file in `dir`, sorted by name.
pub fn input_sources(dir: &Path) -> Result<Vec<FileSource>, EngineError> {
    Ok(list_input_files(dir)?
        .into_iter()
        .map(|(path, format)| FileSource::new(path, format))
        .collect())
}

/// Writes each output dataset into a directory, overwriting existing files.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), written: Vec::new() }
    }

    /// Paths written so far, in emission order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl OutputSink for DirSink {
    fn emit(&mut self, name: &str, format: TableFormat, table: &Table) -> Result<String, String> {
        std::fs::create_dir_all(&self.dir).map_err(|e| e.to_string())?;
        let path = self.dir.join(name);
        match format {
            TableFormat::Csv => crate::csv::export(table, &path)?,
            TableFormat::Xlsx => crate::xlsx::export(table, &path)?,
        }
        log::debug!("wrote {} row(s) to {}", table.len(), path.display());
        let location = path.display().to_string();
        self.written.push(path);
        Ok(location)
    }
}

//! Run orchestration: scan every input to size progress, then match, enrich
//! and emit each file in order.
//!
//! ```text
//! Init -> ReferenceLoaded -> PerFileScan (each file)
//!      -> { PerFileMatch -> PerFileEmit } (each file) -> Done
//!                 any state -> Aborted (fatal error)
//! ```
//!
//! Every transition is checked; an illegal one is a contract error.
//!
//! The engine never touches the filesystem. Inputs come from [`InputSource`]s
//! and outputs go to an [`OutputSink`], so files are loaded twice (once to
//! count, once to match) without keeping every table in memory.

use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::enrich::{finalize_dates, OutputLayout};
use crate::error::{EngineError, SchemaError};
use crate::events::{RunEvent, RunObserver};
use crate::input::{normalize_input, KeyKind};
use crate::matcher::match_key;
use crate::reference::Reference;
use crate::table::{Table, TableFormat};

/// A named input dataset that can be (re)loaded on demand.
pub trait InputSource {
    /// File name shown in progress and log events.
    fn name(&self) -> &str;
    fn format(&self) -> TableFormat;
    fn load(&self) -> Result<Table, String>;
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn format(&self) -> TableFormat {
        (**self).format()
    }

    fn load(&self) -> Result<Table, String> {
        (**self).load()
    }
}

/// Receiver of per-file output datasets.
pub trait OutputSink {
    /// Store `table` under `name`; returns where it went (e.g. a path).
    fn emit(&mut self, name: &str, format: TableFormat, table: &Table) -> Result<String, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    ReferenceLoaded,
    PerFileScan,
    PerFileMatch,
    PerFileEmit,
    Done,
    Aborted,
}

impl RunState {
    /// Whether `next` may follow `self`. A file skipped for lacking a key
    /// column goes from `PerFileMatch` straight to the next file.
    pub fn can_enter(self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (Done | Aborted, _) => false,
            (_, Aborted) => true,
            (Init, ReferenceLoaded) => true,
            (ReferenceLoaded, PerFileScan | Done) => true,
            (PerFileScan, PerFileScan | PerFileMatch | Done) => true,
            (PerFileMatch, PerFileMatch | PerFileEmit | Done) => true,
            (PerFileEmit, PerFileMatch | Done) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    /// No input files, or zero rows across all of them.
    NothingToProcess,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub name: String,
    pub format: TableFormat,
    pub key_column: String,
    pub input_records: usize,
    pub matched_records: usize,
    pub unmatched_records: usize,
    pub output_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub outcome: RunOutcome,
    pub engine_version: String,
    pub run_at: String,
    pub reference_records: usize,
    pub total_rows: usize,
    pub files: Vec<FileReport>,
    pub skipped: Vec<String>,
}

impl RunResult {
    fn new(outcome: RunOutcome, reference: &Reference) -> Self {
        Self {
            outcome,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            reference_records: reference.len(),
            total_rows: 0,
            files: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn output_rows(&self) -> usize {
        self.files.iter().map(|f| f.output_rows).sum()
    }

    pub fn matched_records(&self) -> usize {
        self.files.iter().map(|f| f.matched_records).sum()
    }

    pub fn unmatched_records(&self) -> usize {
        self.files.iter().map(|f| f.unmatched_records).sum()
    }
}

/// `output_<stem>.<ext>` for an input file name.
pub fn output_name(input_name: &str, format: TableFormat) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input_name.to_string());
    format!("output_{stem}.{}", format.extension())
}

/// Validate and index the reference table (`Init -> ReferenceLoaded`).
pub fn load_reference(table: &Table, observer: &mut dyn RunObserver) -> Result<Reference, EngineError> {
    match Reference::from_table(table) {
        Ok(reference) => {
            observer.on_event(RunEvent::info(format!(
                "Loaded {} reference record(s)",
                reference.len()
            )));
            Ok(reference)
        }
        Err(e) => {
            observer.on_event(RunEvent::error(format!("Database error: {e}")));
            Err(e)
        }
    }
}

/// Match every input against `reference` and emit one dataset per file.
pub fn run<S: InputSource>(
    reference: &Reference,
    inputs: &[S],
    sink: &mut dyn OutputSink,
    observer: &mut dyn RunObserver,
) -> Result<RunResult, EngineError> {
    let mut orchestrator = Orchestrator::new(reference, sink, observer);
    let result = orchestrator.drive(inputs);
    if result.is_err() {
        orchestrator.abort();
    }
    result
}

struct Orchestrator<'a> {
    state: RunState,
    /// Every state entered so far, in order.
    trail: Vec<RunState>,
    reference: &'a Reference,
    sink: &'a mut dyn OutputSink,
    observer: &'a mut dyn RunObserver,
}

impl<'a> Orchestrator<'a> {
    fn new(
        reference: &'a Reference,
        sink: &'a mut dyn OutputSink,
        observer: &'a mut dyn RunObserver,
    ) -> Self {
        Self {
            state: RunState::Init,
            trail: Vec::new(),
            reference,
            sink,
            observer,
        }
    }

    fn enter(&mut self, next: RunState) -> Result<(), EngineError> {
        if !self.state.can_enter(next) {
            return Err(EngineError::Contract(format!(
                "run state {next:?} cannot follow {:?} (trail {:?})",
                self.state, self.trail
            )));
        }
        debug!("run state {:?} -> {:?}", self.state, next);
        self.trail.push(next);
        self.state = next;
        Ok(())
    }

    fn abort(&mut self) {
        if self.enter(RunState::Aborted).is_err() {
            debug!("run state {:?} is terminal; not aborting", self.state);
        }
    }

    fn drive<S: InputSource>(&mut self, inputs: &[S]) -> Result<RunResult, EngineError> {
        self.enter(RunState::ReferenceLoaded)?;
        let result = self.run(inputs)?;
        self.enter(RunState::Done)?;
        Ok(result)
    }

    fn emit(&mut self, event: RunEvent) {
        self.observer.on_event(event);
    }

    fn run<S: InputSource>(&mut self, inputs: &[S]) -> Result<RunResult, EngineError> {
        let mut result = RunResult::new(RunOutcome::NothingToProcess, self.reference);

        if inputs.is_empty() {
            self.emit(RunEvent::info(
                EngineError::EmptyInput("no input files found, please add files to process".into())
                    .to_string(),
            ));
            return Ok(result);
        }

        let total = self.scan(inputs)?;
        result.total_rows = total;
        self.emit(RunEvent::info(format!(
            "{} input file(s), {total} row(s) to process",
            inputs.len()
        )));

        if total == 0 {
            self.emit(RunEvent::info("No rows to process."));
            return Ok(result);
        }

        result.outcome = RunOutcome::Completed;
        let mut processed = 0usize;

        for source in inputs {
            self.enter(RunState::PerFileMatch)?;
            let table = load(source)?;
            let Some(normalized) = normalize_input(&table) else {
                let err = SchemaError::NoKeyColumn { file: source.name().to_string() };
                if inputs.len() == 1 {
                    self.emit(RunEvent::error(format!("Error: {err}")));
                    return Err(err.into());
                }
                self.emit(RunEvent::warn(format!("Skipping {err}")));
                result.skipped.push(source.name().to_string());
                continue;
            };

            let layout = OutputLayout::new(&normalized.headers);
            let mut output = layout.table();
            let mut report = FileReport {
                name: source.name().to_string(),
                format: source.format(),
                key_column: normalized.headers[normalized.key_column].clone(),
                input_records: normalized.len(),
                matched_records: 0,
                unmatched_records: 0,
                output_rows: 0,
                output: None,
            };
            debug!(
                "{}: matching {} record(s) on {} (column \"{}\")",
                source.name(),
                normalized.len(),
                normalized.key_kind,
                report.key_column,
            );

            for record in &normalized.records {
                let matches = match_key(&record.key, self.reference);
                if matches.is_empty() {
                    output.push_row(layout.enrich(record, None));
                    report.unmatched_records += 1;
                } else {
                    for id in &matches.ids {
                        let matched = self.reference.first_with_id(id).ok_or_else(|| {
                            EngineError::Contract(format!("matched id {id} has no reference record"))
                        })?;
                        output.push_row(layout.enrich(record, Some(matched)));
                    }
                    report.matched_records += 1;
                }

                processed += 1;
                self.emit(RunEvent::Progress {
                    fraction: (processed as f64 / total as f64).min(1.0),
                    file: source.name().to_string(),
                });
            }

            self.enter(RunState::PerFileEmit)?;
            finalize_dates(&mut output);
            report.output_rows = output.len();

            if !output.is_empty() {
                let name = output_name(source.name(), source.format());
                let location = self
                    .sink
                    .emit(&name, source.format(), &output)
                    .map_err(|e| EngineError::Io(format!("{name}: {e}")))?;
                self.emit(RunEvent::info(format!(
                    "{}: {} row(s) -> {location}",
                    source.name(),
                    output.len()
                )));
                report.output = Some(location);
            }

            result.files.push(report);
        }

        if !result.skipped.is_empty() {
            self.emit(RunEvent::warn(skipped_summary(&result.skipped)));
        }

        Ok(result)
    }

    /// Row count per file for progress sizing. Files without a key column
    /// count their raw rows; they are rejected later, in the match pass.
    fn scan<S: InputSource>(&mut self, inputs: &[S]) -> Result<usize, EngineError> {
        let mut total = 0usize;
        for source in inputs {
            self.enter(RunState::PerFileScan)?;
            let table = load(source)?;
            let rows = match normalize_input(&table) {
                Some(normalized) => {
                    if normalized.dropped > 0 {
                        debug!("{}: dropped {} empty key value(s)", source.name(), normalized.dropped);
                    }
                    normalized.len()
                }
                None => table.len(),
            };
            debug!("{}: {rows} row(s)", source.name());
            total += rows;
        }
        Ok(total)
    }
}

fn load<S: InputSource>(source: &S) -> Result<Table, EngineError> {
    source
        .load()
        .map_err(|e| EngineError::Io(format!("{}: {e}", source.name())))
}

/// Single end-of-run notice listing every skipped file.
pub fn skipped_summary(skipped: &[String]) -> String {
    let columns = [KeyKind::Id, KeyKind::Serial, KeyKind::Phone]
        .iter()
        .map(|k| format!("`{}`", k.column_name()))
        .collect::<Vec<_>>();
    format!(
        "The following files were skipped due to missing required columns ({}, {}, or {}):\n{}",
        columns[0],
        columns[1],
        columns[2],
        skipped.join("\n")
    )
}

// `ownerdata run`: discover, match, enrich, write

use std::path::PathBuf;

use log::info;
use ownerdata_config::Settings;
use ownerdata_engine::{load_reference, run, EngineError, RunOutcome, RunResult};
use ownerdata_io::{find_reference_db, input_sources, sqlite, DirSink};

use crate::progress::{CliObserver, ProgressMode};
use crate::CliError;

pub fn cmd_run(
    settings: &Settings,
    json: bool,
    summary: Option<PathBuf>,
    progress: ProgressMode,
) -> Result<(), CliError> {
    settings.ensure_folders().map_err(CliError::io)?;

    let db_path = find_reference_db(&settings.reference_dir).map_err(CliError::engine)?;
    info!("Reference database: {}", db_path.display());

    let mut observer = CliObserver::new(progress);

    let table = sqlite::load_table(&db_path, &settings.reference_table).map_err(|e| {
        CliError::engine(EngineError::Io(format!(
            "{} (table {}): {}",
            db_path.display(),
            settings.reference_table,
            e
        )))
    })?;
    let reference = load_reference(&table, &mut observer).map_err(|e| CliError::reported(&e))?;

    let sources = input_sources(&settings.input_dir).map_err(CliError::engine)?;
    let mut sink = DirSink::new(&settings.output_dir);

    let result = run(&reference, &sources, &mut sink, &mut observer).map_err(|e| match e {
        // already logged by the run
        EngineError::Schema(_) => CliError::reported(&e),
        other => CliError::engine(other),
    })?;

    print_summary(&result, settings);

    if json || summary.is_some() {
        let text = serde_json::to_string_pretty(&result).map_err(|e| CliError::io(e.to_string()))?;
        if let Some(path) = summary {
            std::fs::write(&path, format!("{}\n", text))
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
            info!("Run summary written to {}", path.display());
        }
        if json {
            println!("{}", text);
        }
    }

    Ok(())
}

fn print_summary(result: &RunResult, settings: &Settings) {
    if result.outcome == RunOutcome::NothingToProcess {
        return;
    }
    let written = result.files.iter().filter(|f| f.output.is_some()).count();
    info!(
        "Done: {} file(s) processed, {} matched, {} unmatched, {} row(s) in {} file(s) under {}",
        result.files.len(),
        result.matched_records(),
        result.unmatched_records(),
        result.output_rows(),
        written,
        settings.output_dir.display()
    );
}

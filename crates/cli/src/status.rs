// `ownerdata status`: what is in the working folders and can a run start

use std::path::Path;

use serde::Serialize;
use ownerdata_config::Settings;
use ownerdata_io::{list_input_files, reference_candidates};

use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    MissingBoth,
    MissingInputs,
    MissingReference,
    AmbiguousReference,
}

impl Readiness {
    pub fn check(reference_files: usize, input_files: usize) -> Self {
        match (reference_files, input_files) {
            (0, 0) => Self::MissingBoth,
            (0, _) => Self::MissingReference,
            (_, 0) => Self::MissingInputs,
            (1, _) => Self::Ready,
            _ => Self::AmbiguousReference,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Ready => "Ready! Run `ownerdata run` to generate results.",
            Self::MissingBoth => "Add files to BOTH the input and database folders.",
            Self::MissingInputs => "Add the files to be processed in the input folder.",
            Self::MissingReference => "Add the database file in the database folder.",
            Self::AmbiguousReference => "Keep exactly one database file in the database folder.",
        }
    }
}

#[derive(Serialize)]
struct StatusReport {
    reference_dir: String,
    reference_files: Vec<String>,
    input_dir: String,
    input_files: Vec<String>,
    readiness: Readiness,
    message: &'static str,
}

pub fn cmd_status(settings: &Settings, json: bool) -> Result<(), CliError> {
    let reference_files = names(
        reference_candidates(&settings.reference_dir)
            .map_err(CliError::engine)?
            .iter()
            .map(|p| p.as_path()),
    );
    let input_files = names(
        list_input_files(&settings.input_dir)
            .map_err(CliError::engine)?
            .iter()
            .map(|(p, _)| p.as_path()),
    );

    let readiness = Readiness::check(reference_files.len(), input_files.len());
    let report = StatusReport {
        reference_dir: settings.reference_dir.display().to_string(),
        reference_files,
        input_dir: settings.input_dir.display().to_string(),
        input_files,
        readiness,
        message: readiness.message(),
    };

    if json {
        let text = serde_json::to_string_pretty(&report).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    println!("Bottoms-up Database File ({}):", report.reference_dir);
    print_list(&report.reference_files);
    println!();
    println!("Files to Process ({}):", report.input_dir);
    print_list(&report.input_files);
    println!();
    println!("{}", report.message);
    Ok(())
}

fn names<'a>(paths: impl Iterator<Item = &'a Path>) -> Vec<String> {
    paths
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}

fn print_list(files: &[String]) {
    if files.is_empty() {
        println!("  No files found");
    }
    for f in files {
        println!("  {}", f);
    }
}

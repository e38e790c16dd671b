//! Run progress and status reporting.
//!
//! Progress goes to **stderr** so stdout stays parseable when `--json` is
//! used. Engine status messages are forwarded to the `log` facade.

use std::io::Write;

use clap::ValueEnum;
use ownerdata_engine::{LogLevel, RunEvent, RunObserver};

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

/// Observer used by `ownerdata run`.
pub struct CliObserver {
    mode: ProgressMode,
    last_percent: Option<u32>,
}

impl CliObserver {
    pub fn new(mode: ProgressMode) -> Self {
        Self { mode, last_percent: None }
    }

    fn progress(&mut self, fraction: f64, file: &str) {
        match self.mode {
            ProgressMode::Off => {}
            ProgressMode::Human => {
                let percent = (fraction.clamp(0.0, 1.0) * 100.0).floor() as u32;
                if self.last_percent == Some(percent) {
                    return;
                }
                self.last_percent = Some(percent);
                let _ = writeln!(std::io::stderr().lock(), "{}", human_line(percent, file));
            }
            ProgressMode::Json => {
                let obj = serde_json::json!({
                    "event": "progress",
                    "fraction": fraction,
                    "file": file,
                });
                if let Ok(line) = serde_json::to_string(&obj) {
                    let _ = writeln!(std::io::stderr().lock(), "{}", line);
                }
            }
        }
    }
}

impl RunObserver for CliObserver {
    fn on_event(&mut self, event: RunEvent) {
        match event {
            RunEvent::Progress { fraction, file } => self.progress(fraction, &file),
            RunEvent::Log { level, message } => match level {
                LogLevel::Info => log::info!("{}", message),
                LogLevel::Warn => log::warn!("{}", message),
                LogLevel::Error => log::error!("{}", message),
            },
        }
    }
}

fn human_line(percent: u32, file: &str) -> String {
    format!("[{:>3}%] {}", percent, file)
}

//! Events emitted by a run: row-level progress and human-readable status.
//!
//! Observers are called synchronously between rows, so they must return
//! promptly.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Emitted after every processed input record.
    Progress {
        /// processed records / grand total across all files, 0.0..=1.0
        fraction: f64,
        file: String,
    },
    Log { level: LogLevel, message: String },
}

impl RunEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Log { level: LogLevel::Info, message: message.into() }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::Log { level: LogLevel::Warn, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Log { level: LogLevel::Error, message: message.into() }
    }
}

pub trait RunObserver {
    fn on_event(&mut self, event: RunEvent);
}

impl<F: FnMut(RunEvent)> RunObserver for F {
    fn on_event(&mut self, event: RunEvent) {
        self(event)
    }
}

/// Simple event collector for testing.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<RunEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    /// Progress events as (fraction, file) pairs, in emission order.
    pub fn progress(&self) -> Vec<(f64, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Progress { fraction, file } => Some((*fraction, file.as_str())),
                RunEvent::Log { .. } => None,
            })
            .collect()
    }

    /// Log messages at `level`, in emission order.
    pub fn messages(&self, level: LogLevel) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Log { level: l, message } if *l == level => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RunObserver for EventCollector {
    fn on_event(&mut self, event: RunEvent) {
        self.events.push(event);
    }
}

//! `ownerdata-engine`: owner lead matching and enrichment.
//!
//! Pure engine crate: receives pre-loaded tables, returns enriched tables
//! through an [`OutputSink`] plus progress/log events. No filesystem access.

pub mod enrich;
pub mod error;
pub mod events;
pub mod index;
pub mod input;
pub mod matcher;
pub mod normalize;
pub mod reference;
pub mod run;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{EngineError, SchemaError};
pub use events::{EventCollector, LogLevel, RunEvent, RunObserver};
pub use input::{InputKey, InputRecord, KeyKind};
pub use reference::{Reference, ReferenceRecord};
pub use run::{load_reference, run, InputSource, OutputSink, RunOutcome, RunResult};
pub use table::{Table, TableFormat};

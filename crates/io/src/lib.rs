// File adapters for the matching engine

pub mod csv;
pub mod discovery;
pub mod files;
pub mod sqlite;
pub mod xlsx;

pub use discovery::{find_reference_db, list_input_files, reference_candidates};
pub use files::{input_sources, DirSink, FileSource};

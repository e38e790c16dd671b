//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain     | Description                                        |
//! |------|------------|----------------------------------------------------|
//! | 0    | Universal  | Success, including "nothing to process"            |
//! | 2    | Universal  | CLI usage error (bad args, unreadable config file) |
//! | 3    | reference  | No `.db` file in the reference folder              |
//! | 4    | reference  | More than one `.db` file in the reference folder   |
//! | 5    | schema     | Missing reference columns or input key column      |
//! | 6    | io         | Read/write failure (csv, xlsx, sqlite, folders)    |
//! | 7    | contract   | Internal matching invariant broken                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `engine_exit_code` or the relevant command

use ownerdata_engine::EngineError;

// =============================================================================
// Universal (0, 2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, unreadable `--config` file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Reference discovery (3-4)
// =============================================================================

/// The reference folder holds no `.db` file.
pub const EXIT_REFERENCE_NOT_FOUND: u8 = 3;

/// The reference folder holds several `.db` files.
pub const EXIT_REFERENCE_AMBIGUOUS: u8 = 4;

// =============================================================================
// Run (5-7)
// =============================================================================

/// Reference table lacks required columns, or the only input file has no
/// key column.
pub const EXIT_SCHEMA: u8 = 5;

/// File or database read/write failure.
pub const EXIT_IO: u8 = 6;

/// Matching invariant violated. Always a bug.
pub const EXIT_CONTRACT: u8 = 7;

/// Map an engine error to its exit code.
pub fn engine_exit_code(err: &EngineError) -> u8 {
    match err {
        EngineError::NotFound { .. } => EXIT_REFERENCE_NOT_FOUND,
        EngineError::AmbiguousSource { .. } => EXIT_REFERENCE_AMBIGUOUS,
        EngineError::Schema(_) => EXIT_SCHEMA,
        EngineError::EmptyInput(_) => EXIT_SUCCESS,
        EngineError::Io(_) => EXIT_IO,
        EngineError::Contract(_) => EXIT_CONTRACT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ownerdata_engine::SchemaError;
    use std::path::PathBuf;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_USAGE,
            EXIT_REFERENCE_NOT_FOUND,
            EXIT_REFERENCE_AMBIGUOUS,
            EXIT_SCHEMA,
            EXIT_IO,
            EXIT_CONTRACT,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_engine_error_mapping() {
        let dir = PathBuf::from("bu_database");
        assert_eq!(engine_exit_code(&EngineError::NotFound { dir: dir.clone() }), 3);
        assert_eq!(
            engine_exit_code(&EngineError::AmbiguousSource { dir, files: vec![] }),
            4
        );
        let schema = EngineError::Schema(SchemaError::NoKeyColumn { file: "a.csv".into() });
        assert_eq!(engine_exit_code(&schema), 5);
        assert_eq!(engine_exit_code(&EngineError::Io("x".into())), 6);
        assert_eq!(engine_exit_code(&EngineError::Contract("x".into())), 7);
        assert_eq!(engine_exit_code(&EngineError::EmptyInput("x".into())), 0);
    }
}

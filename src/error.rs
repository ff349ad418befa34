//! Error types for Tabstore
//!
//! This module defines all error types surfaced by the store, the engines
//! and the shell layer.

use thiserror::Error;

/// The main error type for Tabstore
#[derive(Error, Debug)]
pub enum Error {
    // ========== Store Errors ==========
    #[error("Store error: table '{0}' not found")]
    MissingTable(String),

    #[error("Store error: table '{0}' already exists")]
    DuplicateTable(String),

    // ========== Schema Errors ==========
    #[error("Schema error: record fields [{found}] do not match header [{expected}] of table '{table}'")]
    SchemaMismatch {
        table: String,
        expected: String,
        found: String,
    },

    #[error("Schema error: field '{0}' appears more than once in header")]
    DuplicateField(String),

    #[error("Schema error: field '{field}' not found in table '{table}'")]
    UnknownField { field: String, table: String },

    // ========== Record Errors ==========
    #[error("Record error: no record in '{table}' with {field} = '{value}'")]
    NotFound {
        table: String,
        field: String,
        value: String,
    },

    #[error("Record error: '{table}' already holds a record with {field} = '{value}'")]
    DuplicateIdentifier {
        table: String,
        field: String,
        value: String,
    },

    // ========== Load Errors ==========
    #[error("Load error: {0}")]
    LoadError(String),

    // ========== Shell Errors ==========
    #[error("Command error: {0}")]
    InvalidCommand(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for Tabstore operations
pub type Result<T> = std::result::Result<T, Error>;

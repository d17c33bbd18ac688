use polars::prelude::PolarsError;
use std::{io, path::PathBuf};
use thiserror::Error;
use tokio::task::JoinError;

/**
Result type to simplify function signatures.

This is a custom result type that uses our custom `GridError` for the error type.

Functions can return `GridResult<T>` and then use `?` to automatically propagate errors.
*/
pub type GridResult<T> = Result<T, GridError>;

/**
Custom error type for the grid engine and its command-line host.

The engine itself is a pure in-memory transformation, so most variants describe
caller contract violations (unknown column, missing chip configuration) rather
than runtime failures. The loader variants cover the data file side.

We use the `thiserror` crate to derive the `Error` trait and automatically
implement `Display` using the `#[error(...)]` attribute.
*/
#[derive(Error, Debug)]
pub enum GridError {
    // --- Engine contract violations ---
    /// A transition or query referenced a field that no column declares.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// Two column definitions share the same field name.
    #[error("Duplicate column field name: '{0}'")]
    DuplicateColumn(String),

    /// A filter transition targeted a column without `filterDetails`.
    #[error("Column '{0}' is not filterable")]
    NotFilterable(String),

    /// A filter chip was removed but no chip configuration was supplied.
    #[error("Filter chip removal requested without filter chip details")]
    MissingChipDetails,

    /// A filter chip key did not match any selected item.
    #[error("No selected item matches filter chip key '{0}'")]
    ChipNotFound(String),

    /// A date or time format pattern that chrono cannot render.
    #[error("Invalid date/time format pattern: '{0}'")]
    InvalidFormat(String),

    #[error("Invalid value for command-line argument '{arg_name}': {reason}")]
    InvalidArgument {
        arg_name: String, // Context about *which* argument failed
        reason: String,   // The specific error reason
    },

    // --- Loader errors ---
    // Wrapper for standard IO errors.
    // The #[from] attribute automatically converts io::Error to GridError::Io.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Wrapper for Polars errors raised while reading or converting data files.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    // Wrapper for serde_json errors (column definition and config files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Errors encountered while parsing CSV data (e.g., inconsistent columns, invalid data).
    #[error("CSV parsing error: {0}")]
    CsvParsing(String),

    // Errors related to the file type (e.g., unsupported file extension, incorrect file format).
    #[error("File type error: {0}")]
    FileType(String),

    // Wrapper for Tokio JoinErrors, occurring when blocking reads fail.
    #[error("Tokio JoinError: {0}")]
    TokioJoin(#[from] JoinError),

    // Indicates that a specified file could not be found, storing the attempted path.
    #[error("File not found: {0:#?}")]
    FileNotFound(PathBuf),

    // Indicates an invalid CSV delimiter was provided (empty or too long).
    #[error("Invalid CSV delimiter: '{0}'")]
    InvalidDelimiter(String),

    // A catch-all for other, less specific errors not covered by specific variants.
    #[error("Other error: {0}")]
    Other(String),
}

// Implementation of the From trait to convert a String into a GridError.
impl From<String> for GridError {
    fn from(err: String) -> GridError {
        // Prefer using specific error variants when possible, fallback to Other.
        GridError::Other(err)
    }
}

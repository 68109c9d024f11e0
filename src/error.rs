//! Error types for the fallible edges of the engine
//!
//! Evaluation itself is total. Only schema construction, input writes to
//! unknown fields, table loading, configuration and history I/O can fail.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a schema or writing into an input state
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("duplicate field id `{0}`")]
    DuplicateField(String),

    #[error("unknown field id `{0}`")]
    UnknownField(String),

    #[error("select field `{field}` has no options")]
    EmptySelect { field: String },

    #[error("condition on `{field}` references an unknown field `{target}`")]
    DanglingCondition { field: String, target: String },

    #[error("cannot parse condition `{0}`")]
    InvalidCondition(String),
}

/// Errors raised while loading a tier table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot read table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("tier thresholds must be ascending ({previous} then {next})")]
    Unsorted { previous: f64, next: f64 },

    #[error("the unbounded tier must be the last one")]
    CatchAllNotLast,

    #[error("tier rate must be finite, got {0}")]
    InvalidRate(f64),

    #[error("tier threshold must be finite, got {0}")]
    InvalidThreshold(f64),
}

/// Errors raised while loading the engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while reading or writing saved calculations
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("cannot access history {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt history {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Umbrella error for callers that touch several edges at once
#[derive(Debug, Error)]
pub enum FincalcError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("unknown calculator `{0}`")]
    UnknownCalculator(String),
}

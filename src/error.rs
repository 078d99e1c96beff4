use std::path::PathBuf;
use thiserror::Error;

use crate::header::{HeaderFormatError, VolumeFormat};
use crate::validation::ValidationReport;

/// The main error type for cets-model operations.
#[derive(Debug, Error)]
pub enum CetsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A vector or matrix had the wrong number of elements.
    #[error("{what} must have length {expected}, got {actual}")]
    Shape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0}")]
    Discriminator(#[from] DiscriminatorError),

    /// A strict record carried a key it does not declare.
    #[error("unexpected field '{field}' on {record}")]
    StrictField { record: String, field: String },

    #[error("invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("coordinate system '{0}' must have at least one axis")]
    EmptyAxes(String),

    #[error("coordinate system '{system}' declares axis '{axis}' more than once")]
    DuplicateAxis { system: String, axis: String },

    #[error("transformation sequences nest deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("{what} has {actual} element(s) but dimensionality {expected} was requested")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0} requires an explicit dimensionality")]
    MissingDimension(&'static str),

    #[error("rotation matrix must be 2x2 or 3x3, got {rows} row(s)")]
    UnsupportedRank { rows: usize },

    #[error("invalid flip axis '{0}' (expected 'x', 'y' or none)")]
    InvalidSelector(String),

    #[error("{path} is not a valid {format} file: {source}")]
    FileFormat {
        path: PathBuf,
        format: VolumeFormat,
        #[source]
        source: HeaderFormatError,
    },

    #[error("Failed to parse JSON document from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON document to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML document from {path}: {source}")]
    YamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write YAML document to {path}: {source}")]
    YamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid log filter '{directives}': {source}")]
    LogFilter {
        directives: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
}

/// Failures selecting a transformation variant from its `type` field.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DiscriminatorError {
    #[error("no matching variant: transformation has no 'type' field")]
    Missing,

    #[error("no matching variant for transformation type '{0}'")]
    Unknown(String),

    #[error("expected transformation type '{expected}', found '{found}'")]
    Mismatch {
        expected: &'static str,
        found: String,
    },
}

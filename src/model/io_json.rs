//! JSON reading and writing for dataset documents.
//!
//! Dataset documents are the serialized form of [`Dataset`]: nested
//! objects whose transformations carry their `type` discriminator and
//! whose records reject unknown keys.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_json::Value;

use super::records::Dataset;
use super::transform::Transformation;
use crate::error::CetsError;

/// Reads a dataset from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_dataset_json(path: &Path) -> Result<Dataset, CetsError> {
    let file = File::open(path).map_err(CetsError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| CetsError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a dataset to a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_dataset_json(path: &Path, dataset: &Dataset) -> Result<(), CetsError> {
    let file = File::create(path).map_err(CetsError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, dataset).map_err(|source| CetsError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a dataset from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<Dataset, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a dataset from raw JSON bytes.
///
/// Useful for fuzzing and for input that has not been checked as UTF-8.
pub fn from_json_slice(bytes: &[u8]) -> Result<Dataset, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a dataset to a pretty-printed JSON string.
pub fn to_json_string(dataset: &Dataset) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(dataset)
}

/// Decodes a single transformation, reporting the typed decode error
/// rather than a serde message.
pub fn transformation_from_json_str(json: &str) -> Result<Transformation, CetsError> {
    let value: Value = serde_json::from_str(json).map_err(|e| CetsError::InvalidField {
        field: "transformation".into(),
        message: e.to_string(),
    })?;
    Transformation::from_value(&value)
}

/// Encodes a single transformation as pretty-printed JSON.
pub fn transformation_to_json_string(
    transformation: &Transformation,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(transformation)
}

//! YAML reading and writing for dataset documents.
//!
//! The YAML form has the same structure as the JSON form, so values JSON
//! cannot hold (`.nan`, `.inf`) are rejected before decoding.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_yaml::Value;

use super::records::Dataset;
use crate::error::CetsError;

/// Reads a dataset from a YAML file.
pub fn read_dataset_yaml(path: &Path) -> Result<Dataset, CetsError> {
    let file = File::open(path).map_err(CetsError::Io)?;
    let reader = BufReader::new(file);
    let parse_error = |source| CetsError::YamlParse {
        path: path.to_path_buf(),
        source,
    };

    let value: Value = serde_yaml::from_reader(reader).map_err(parse_error)?;
    reject_non_finite(&value, "")?;
    serde_yaml::from_value(value).map_err(parse_error)
}

/// Writes a dataset to a YAML file.
pub fn write_dataset_yaml(path: &Path, dataset: &Dataset) -> Result<(), CetsError> {
    let file = File::create(path).map_err(CetsError::Io)?;
    let writer = BufWriter::new(file);

    serde_yaml::to_writer(writer, dataset).map_err(|source| CetsError::YamlWrite {
        path: path.to_path_buf(),
        source,
    })
}

pub fn from_yaml_str(yaml: &str) -> Result<Dataset, CetsError> {
    let value: Value = serde_yaml::from_str(yaml)?;
    reject_non_finite(&value, "")?;
    Ok(serde_yaml::from_value(value)?)
}

pub fn to_yaml_string(dataset: &Dataset) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(dataset)
}

/// Fails on the first NaN or infinity, naming where it sits.
fn reject_non_finite(value: &Value, at: &str) -> Result<(), CetsError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Err(CetsError::InvalidField {
                field: at.to_string(),
                message: format!("non-finite number {f} cannot be stored"),
            }),
            _ => Ok(()),
        },
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| reject_non_finite(item, &format!("{at}[{i}]"))),
        Value::Mapping(entries) => entries.iter().try_for_each(|(key, item)| {
            let key = key.as_str().map_or_else(|| format!("{key:?}"), str::to_string);
            let at = if at.is_empty() { key } else { format!("{at}.{key}") };
            reject_non_finite(item, &at)
        }),
        Value::Tagged(tagged) => reject_non_finite(&tagged.value, at),
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
    }
}

//! The coordinate-transformation union.
//!
//! Every transformation shares a name and the names of its input and
//! output coordinate systems. The `type` field of the wire form selects
//! the variant and the matching payload key:
//!
//! ```json
//! {"type": "affine", "name": "rot", "input": "a", "output": "b",
//!  "affine": [[1, 0, 0], [0, 1, 0], [0, 0, 1]]}
//! ```
//!
//! Decoding goes through [`serde_json::Value`] so that the discriminator
//! can be inspected before any payload is touched, unknown keys can be
//! reported by name, and `sequence` nesting can be bounded.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::geometry::{Matrix, Matrix2x2, Matrix3x3};
use crate::error::{CetsError, DiscriminatorError};

/// Deepest `sequence` nesting accepted when decoding.
pub const MAX_SEQUENCE_DEPTH: usize = 32;

const COMMON_KEYS: [&str; 4] = ["type", "name", "input", "output"];

/// The discriminator literals of the transformation union.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformationType {
    Identity,
    MapAxis,
    Translation,
    Scale,
    Affine,
    Rotation2D,
    Flip2D,
    Sequence,
}

impl TransformationType {
    pub const ALL: [TransformationType; 8] = [
        TransformationType::Identity,
        TransformationType::MapAxis,
        TransformationType::Translation,
        TransformationType::Scale,
        TransformationType::Affine,
        TransformationType::Rotation2D,
        TransformationType::Flip2D,
        TransformationType::Sequence,
    ];

    /// The literal carried in the `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationType::Identity => "identity",
            TransformationType::MapAxis => "mapAxis",
            TransformationType::Translation => "translation",
            TransformationType::Scale => "scale",
            TransformationType::Affine => "affine",
            TransformationType::Rotation2D => "rotation2d",
            TransformationType::Flip2D => "flip2d",
            TransformationType::Sequence => "sequence",
        }
    }

    /// Looks up the variant for a discriminator literal.
    pub fn from_literal(literal: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == literal)
    }

    /// The key holding this variant's payload, if it has one.
    ///
    /// Every payload is stored under a key equal to the discriminator.
    pub fn payload_key(&self) -> Option<&'static str> {
        match self {
            TransformationType::Identity => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for TransformationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationType {
    type Err = DiscriminatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_literal(s).ok_or_else(|| DiscriminatorError::Unknown(s.to_string()))
    }
}

/// One entry of a `mapAxis` permutation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisNameMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis1_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis2_name: Option<String>,
}

impl AxisNameMapping {
    pub fn new(axis1_name: impl Into<String>, axis2_name: impl Into<String>) -> Self {
        Self {
            axis1_name: Some(axis1_name.into()),
            axis2_name: Some(axis2_name.into()),
        }
    }
}

/// The variant-specific payload of a transformation.
///
/// Payloads are optional: a document may leave the payload key out or
/// set it to `null`, and that absence survives a round trip.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformationKind {
    Identity,
    /// Axis permutation.
    MapAxis(Option<Vec<AxisNameMapping>>),
    /// One offset per axis.
    Translation(Option<Vec<f64>>),
    /// One factor per axis.
    Scale(Option<Vec<f64>>),
    Affine(Option<Matrix3x3>),
    Rotation2D(Option<Matrix2x2>),
    Flip2D(Option<Matrix2x2>),
    /// Steps applied in order.
    Sequence(Option<Vec<Transformation>>),
}

impl TransformationKind {
    pub fn transformation_type(&self) -> TransformationType {
        match self {
            TransformationKind::Identity => TransformationType::Identity,
            TransformationKind::MapAxis(_) => TransformationType::MapAxis,
            TransformationKind::Translation(_) => TransformationType::Translation,
            TransformationKind::Scale(_) => TransformationType::Scale,
            TransformationKind::Affine(_) => TransformationType::Affine,
            TransformationKind::Rotation2D(_) => TransformationType::Rotation2D,
            TransformationKind::Flip2D(_) => TransformationType::Flip2D,
            TransformationKind::Sequence(_) => TransformationType::Sequence,
        }
    }

    /// True when a payload-bearing variant carries no payload.
    pub fn payload_missing(&self) -> bool {
        match self {
            TransformationKind::Identity => false,
            TransformationKind::MapAxis(mapping) => mapping.is_none(),
            TransformationKind::Translation(v) | TransformationKind::Scale(v) => v.is_none(),
            TransformationKind::Affine(m) => m.is_none(),
            TransformationKind::Rotation2D(m) | TransformationKind::Flip2D(m) => m.is_none(),
            TransformationKind::Sequence(steps) => steps.is_none(),
        }
    }
}

/// A coordinate transformation between two named frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Transformation {
    pub name: Option<String>,
    /// Name of the source coordinate system.
    pub input: Option<String>,
    /// Name of the destination coordinate system.
    pub output: Option<String>,
    pub kind: TransformationKind,
}

impl Transformation {
    /// Creates an unnamed, unattached transformation.
    pub fn new(kind: TransformationKind) -> Self {
        Self {
            name: None,
            input: None,
            output: None,
            kind,
        }
    }

    pub fn identity() -> Self {
        Self::new(TransformationKind::Identity)
    }

    pub fn map_axis(mapping: Vec<AxisNameMapping>) -> Self {
        Self::new(TransformationKind::MapAxis(Some(mapping)))
    }

    pub fn translation(vector: Vec<f64>) -> Self {
        Self::new(TransformationKind::Translation(Some(vector)))
    }

    pub fn scale(factors: Vec<f64>) -> Self {
        Self::new(TransformationKind::Scale(Some(factors)))
    }

    pub fn affine(matrix: Matrix3x3) -> Self {
        Self::new(TransformationKind::Affine(Some(matrix)))
    }

    pub fn rotation2d(matrix: Matrix2x2) -> Self {
        Self::new(TransformationKind::Rotation2D(Some(matrix)))
    }

    pub fn flip2d(matrix: Matrix2x2) -> Self {
        Self::new(TransformationKind::Flip2D(Some(matrix)))
    }

    /// A sequence spanning its steps: input of the first step to output
    /// of the last.
    pub fn sequence(steps: Vec<Transformation>) -> Self {
        let input = steps.first().and_then(|step| step.input.clone());
        let output = steps.last().and_then(|step| step.output.clone());
        Self {
            name: None,
            input,
            output,
            kind: TransformationKind::Sequence(Some(steps)),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    #[inline]
    pub fn transformation_type(&self) -> TransformationType {
        self.kind.transformation_type()
    }

    /// The nested steps if this is a `sequence`. A sequence without a
    /// payload has no steps.
    pub fn steps(&self) -> Option<&[Transformation]> {
        match &self.kind {
            TransformationKind::Sequence(steps) => Some(steps.as_deref().unwrap_or_default()),
            _ => None,
        }
    }

    /// Nesting depth: 0 for a leaf, 1 + the deepest step for a sequence.
    pub fn depth(&self) -> usize {
        match self.steps() {
            Some(steps) => 1 + steps.iter().map(Transformation::depth).max().unwrap_or(0),
            None => 0,
        }
    }

    /// Decodes a transformation, choosing the variant from `type`.
    pub fn from_value(value: &Value) -> Result<Self, CetsError> {
        decode(value, 0)
    }

    /// Decodes a transformation that must be of type `expected`.
    pub fn from_value_expecting(
        value: &Value,
        expected: TransformationType,
    ) -> Result<Self, CetsError> {
        if let Some(object) = value.as_object() {
            let found = discriminator(object)?;
            if found != expected.as_str() {
                return Err(DiscriminatorError::Mismatch {
                    expected: expected.as_str(),
                    found: found.to_string(),
                }
                .into());
            }
        }
        decode(value, 0)
    }

    /// Encodes to a JSON value.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".into(), Value::from(self.transformation_type().as_str()));
        for (key, field) in [
            ("name", &self.name),
            ("input", &self.input),
            ("output", &self.output),
        ] {
            if let Some(field) = field {
                object.insert(key.into(), Value::from(field.as_str()));
            }
        }

        let payload = match &self.kind {
            TransformationKind::Identity => None,
            TransformationKind::MapAxis(mapping) => mapping
                .as_ref()
                .map(|mapping| Value::Array(mapping.iter().map(mapping_to_value).collect())),
            TransformationKind::Translation(v) | TransformationKind::Scale(v) => {
                v.as_ref().map(|v| Value::from(v.clone()))
            }
            TransformationKind::Affine(m) => m.as_ref().map(|m| Value::from(m.to_rows())),
            TransformationKind::Rotation2D(m) | TransformationKind::Flip2D(m) => {
                m.as_ref().map(|m| Value::from(m.to_rows()))
            }
            TransformationKind::Sequence(steps) => steps
                .as_ref()
                .map(|steps| Value::Array(steps.iter().map(Transformation::to_value).collect())),
        };
        if let (Some(key), Some(payload)) = (self.transformation_type().payload_key(), payload) {
            object.insert(key.into(), payload);
        }

        Value::Object(object)
    }
}

fn mapping_to_value(mapping: &AxisNameMapping) -> Value {
    let mut object = Map::new();
    if let Some(name) = &mapping.axis1_name {
        object.insert("axis1_name".into(), Value::from(name.as_str()));
    }
    if let Some(name) = &mapping.axis2_name {
        object.insert("axis2_name".into(), Value::from(name.as_str()));
    }
    Value::Object(object)
}

fn discriminator(object: &Map<String, Value>) -> Result<&str, CetsError> {
    match object.get("type") {
        None | Some(Value::Null) => Err(DiscriminatorError::Missing.into()),
        Some(Value::String(literal)) => Ok(literal),
        Some(other) => Err(CetsError::InvalidField {
            field: "type".into(),
            message: format!("expected a string, found {}", value_kind(other)),
        }),
    }
}

fn decode(value: &Value, depth: usize) -> Result<Transformation, CetsError> {
    if depth > MAX_SEQUENCE_DEPTH {
        return Err(CetsError::NestingTooDeep {
            limit: MAX_SEQUENCE_DEPTH,
        });
    }

    let object = value.as_object().ok_or_else(|| CetsError::InvalidField {
        field: "transformation".into(),
        message: format!("expected an object, found {}", value_kind(value)),
    })?;

    let literal = discriminator(object)?;
    let ty = TransformationType::from_literal(literal)
        .ok_or_else(|| DiscriminatorError::Unknown(literal.to_string()))?;
    let payload_key = ty.payload_key();

    if let Some(extra) = object
        .keys()
        .find(|key| !COMMON_KEYS.contains(&key.as_str()) && Some(key.as_str()) != payload_key)
    {
        return Err(CetsError::StrictField {
            record: format!("{} transformation", ty),
            field: extra.clone(),
        });
    }

    let payload = payload_value(object, ty);
    let kind = match ty {
        TransformationType::Identity => TransformationKind::Identity,
        TransformationType::MapAxis => {
            let mapping = |p: &Value| {
                Vec::<AxisNameMapping>::deserialize(p).map_err(|e| invalid(ty.as_str(), e))
            };
            TransformationKind::MapAxis(payload.map(mapping).transpose()?)
        }
        TransformationType::Translation => {
            TransformationKind::Translation(payload.map(|p| float_vec(p, ty)).transpose()?)
        }
        TransformationType::Scale => {
            TransformationKind::Scale(payload.map(|p| float_vec(p, ty)).transpose()?)
        }
        TransformationType::Affine => {
            TransformationKind::Affine(payload.map(|p| matrix(p, ty)).transpose()?)
        }
        TransformationType::Rotation2D => {
            TransformationKind::Rotation2D(payload.map(|p| matrix(p, ty)).transpose()?)
        }
        TransformationType::Flip2D => {
            TransformationKind::Flip2D(payload.map(|p| matrix(p, ty)).transpose()?)
        }
        TransformationType::Sequence => {
            TransformationKind::Sequence(payload.map(|p| steps(p, depth)).transpose()?)
        }
    };

    Ok(Transformation {
        name: optional_string(object, "name")?,
        input: optional_string(object, "input")?,
        output: optional_string(object, "output")?,
        kind,
    })
}

/// The payload under the variant's key; absent and `null` are both `None`.
fn payload_value(object: &Map<String, Value>, ty: TransformationType) -> Option<&Value> {
    ty.payload_key()
        .and_then(|key| object.get(key))
        .filter(|value| !value.is_null())
}

fn steps(value: &Value, depth: usize) -> Result<Vec<Transformation>, CetsError> {
    value
        .as_array()
        .ok_or_else(|| CetsError::InvalidField {
            field: TransformationType::Sequence.as_str().into(),
            message: format!("expected an array of transformations, found {}", value_kind(value)),
        })?
        .iter()
        .map(|step| decode(step, depth + 1))
        .collect()
}

fn float_vec(value: &Value, ty: TransformationType) -> Result<Vec<f64>, CetsError> {
    Vec::<f64>::deserialize(value).map_err(|e| invalid(ty.as_str(), e))
}

fn matrix<const N: usize>(value: &Value, ty: TransformationType) -> Result<Matrix<N>, CetsError> {
    let rows = Vec::<Vec<f64>>::deserialize(value).map_err(|e| invalid(ty.as_str(), e))?;
    Matrix::from_rows(&rows)
}

fn optional_string(object: &Map<String, Value>, key: &str) -> Result<Option<String>, CetsError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CetsError::InvalidField {
            field: key.into(),
            message: format!("expected a string, found {}", value_kind(other)),
        }),
    }
}

fn invalid(field: &str, err: serde_json::Error) -> CetsError {
    CetsError::InvalidField {
        field: field.into(),
        message: err.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Serialize for Transformation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transformation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Transformation::from_value(&value).map_err(D::Error::custom)
    }
}

/// The tomographic alignment of a single projection: always a
/// `sequence`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionAlignment(Transformation);

impl ProjectionAlignment {
    pub fn new(steps: Vec<Transformation>) -> Self {
        Self(Transformation::sequence(steps))
    }

    pub fn steps(&self) -> &[Transformation] {
        self.0.steps().unwrap_or_default()
    }

    pub fn as_transformation(&self) -> &Transformation {
        &self.0
    }

    pub fn into_inner(self) -> Transformation {
        self.0
    }
}

impl TryFrom<Transformation> for ProjectionAlignment {
    type Error = CetsError;

    fn try_from(transformation: Transformation) -> Result<Self, Self::Error> {
        match transformation.transformation_type() {
            TransformationType::Sequence => Ok(Self(transformation)),
            other => Err(DiscriminatorError::Mismatch {
                expected: TransformationType::Sequence.as_str(),
                found: other.as_str().to_string(),
            }
            .into()),
        }
    }
}

impl Serialize for ProjectionAlignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProjectionAlignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Transformation::from_value_expecting(&value, TransformationType::Sequence)
            .map(Self)
            .map_err(D::Error::custom)
    }
}

//! Annotation records.
//!
//! Annotations are a union discriminated by `type`, in the same way as
//! transformations. An object without `type` is the plain file-backed
//! annotation. Point payloads are lists of fixed-length vectors or
//! matrices and must not be empty when present.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::coords::CoordinateSystem;
use super::geometry::{Matrix2x2, Matrix3x3, Vector2D, Vector3D};
use super::records::{impl_coordinate_metadata, CoordinateMetadata};
use super::transform::Transformation;

/// An annotation attached to a region or an average.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Annotation {
    /// A file-backed annotation with no further structure.
    #[serde(rename = "annotation")]
    Generic(AnnotationFile),
    /// Categorical labels on a 2D image.
    SegmentationMask2D(AnnotationImage2D),
    /// Categorical labels on a 3D volume.
    SegmentationMask3D(AnnotationImage3D),
    /// Real-valued labels on a 2D image.
    ProbabilityMap2D(AnnotationImage2D),
    /// Real-valued labels on a 3D volume.
    ProbabilityMap3D(AnnotationImage3D),
    PointSet2D(PointSet2D),
    PointSet3D(PointSet3D),
    PointVectorSet2D(PointVectorSet2D),
    PointVectorSet3D(PointVectorSet3D),
    PointMatrixSet2D(PointMatrixSet2D),
    PointMatrixSet3D(PointMatrixSet3D),
    TriMesh(TriMesh),
}

impl Annotation {
    /// The `type` literal of this annotation.
    pub fn type_name(&self) -> &'static str {
        match self {
            Annotation::Generic(_) => "annotation",
            Annotation::SegmentationMask2D(_) => "segmentationMask2D",
            Annotation::SegmentationMask3D(_) => "segmentationMask3D",
            Annotation::ProbabilityMap2D(_) => "probabilityMap2D",
            Annotation::ProbabilityMap3D(_) => "probabilityMap3D",
            Annotation::PointSet2D(_) => "pointSet2D",
            Annotation::PointSet3D(_) => "pointSet3D",
            Annotation::PointVectorSet2D(_) => "pointVectorSet2D",
            Annotation::PointVectorSet3D(_) => "pointVectorSet3D",
            Annotation::PointMatrixSet2D(_) => "pointMatrixSet2D",
            Annotation::PointMatrixSet3D(_) => "pointMatrixSet3D",
            Annotation::TriMesh(_) => "triMesh",
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Annotation::Generic(a) => a.path.as_deref(),
            Annotation::SegmentationMask2D(a) | Annotation::ProbabilityMap2D(a) => {
                a.path.as_deref()
            }
            Annotation::SegmentationMask3D(a) | Annotation::ProbabilityMap3D(a) => {
                a.path.as_deref()
            }
            Annotation::PointSet2D(a) => a.path.as_deref(),
            Annotation::PointSet3D(a) => a.path.as_deref(),
            Annotation::PointVectorSet2D(a) => a.path.as_deref(),
            Annotation::PointVectorSet3D(a) => a.path.as_deref(),
            Annotation::PointMatrixSet2D(a) => a.path.as_deref(),
            Annotation::PointMatrixSet3D(a) => a.path.as_deref(),
            Annotation::TriMesh(a) => a.path.as_deref(),
        }
    }

    /// Frames and transformations attached to the annotation, if its
    /// variant carries any.
    pub fn coordinate_metadata(&self) -> Option<&dyn CoordinateMetadata> {
        match self {
            Annotation::Generic(_) => None,
            Annotation::SegmentationMask2D(a) | Annotation::ProbabilityMap2D(a) => Some(a),
            Annotation::SegmentationMask3D(a) | Annotation::ProbabilityMap3D(a) => Some(a),
            Annotation::PointSet2D(a) => Some(a),
            Annotation::PointSet3D(a) => Some(a),
            Annotation::PointVectorSet2D(a) => Some(a),
            Annotation::PointVectorSet3D(a) => Some(a),
            Annotation::PointMatrixSet2D(a) => Some(a),
            Annotation::PointMatrixSet3D(a) => Some(a),
            Annotation::TriMesh(a) => Some(a),
        }
    }

    /// Point payload lengths that should agree, as `(origins, others)`.
    ///
    /// Only the paired point sets report counts.
    pub fn paired_counts(&self) -> Option<(usize, usize)> {
        fn len<T>(list: &Option<Vec<T>>) -> usize {
            list.as_ref().map_or(0, Vec::len)
        }

        match self {
            Annotation::PointVectorSet2D(a) => Some((len(&a.origin2d), len(&a.vector2d))),
            Annotation::PointVectorSet3D(a) => Some((len(&a.origin3d), len(&a.vector3d))),
            Annotation::PointMatrixSet2D(a) => Some((len(&a.origin2d), len(&a.matrix2d))),
            Annotation::PointMatrixSet3D(a) => Some((len(&a.origin3d), len(&a.matrix3d))),
            _ => None,
        }
    }
}

/// Tagged decoding of [`Annotation`]. Never constructed itself.
#[allow(dead_code)]
#[derive(Deserialize)]
#[serde(remote = "Annotation", tag = "type", rename_all = "camelCase")]
enum TaggedAnnotation {
    #[serde(rename = "annotation")]
    Generic(AnnotationFile),
    SegmentationMask2D(AnnotationImage2D),
    SegmentationMask3D(AnnotationImage3D),
    ProbabilityMap2D(AnnotationImage2D),
    ProbabilityMap3D(AnnotationImage3D),
    PointSet2D(PointSet2D),
    PointSet3D(PointSet3D),
    PointVectorSet2D(PointVectorSet2D),
    PointVectorSet3D(PointVectorSet3D),
    PointMatrixSet2D(PointMatrixSet2D),
    PointMatrixSet3D(PointMatrixSet3D),
    TriMesh(TriMesh),
}

impl<'de> Deserialize<'de> for Annotation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = Value::deserialize(deserializer)?;
        if let Some(object) = value.as_object_mut() {
            if !object.contains_key("type") {
                object.insert("type".into(), Value::from("annotation"));
            }
        }
        TaggedAnnotation::deserialize(value).map_err(D::Error::custom)
    }
}

fn non_empty<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<T>>::deserialize(deserializer)?;
    if matches!(&items, Some(list) if list.is_empty()) {
        return Err(D::Error::custom("point lists must contain at least one entry"));
    }
    Ok(items)
}

/// A file-backed annotation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A labelled 2D image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationImage2D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// A labelled 3D volume.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationImage3D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// 2D point locations (Nx2).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointSet2D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(
        rename = "origin2D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin2d: Option<Vec<Vector2D>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// 3D point locations (Nx3).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointSet3D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(
        rename = "origin3D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin3d: Option<Vec<Vector3D>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// 2D points with a direction vector each.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointVectorSet2D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(
        rename = "origin2D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin2d: Option<Vec<Vector2D>>,

    #[serde(
        rename = "vector2D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub vector2d: Option<Vec<Vector2D>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// 3D points with a direction vector each.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointVectorSet3D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(
        rename = "origin3D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin3d: Option<Vec<Vector3D>>,

    #[serde(
        rename = "vector3D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub vector3d: Option<Vec<Vector3D>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// 2D points with a rotation matrix each (Nx2x2).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointMatrixSet2D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(
        rename = "origin2D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin2d: Option<Vec<Vector2D>>,

    #[serde(
        rename = "matrix2D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub matrix2d: Option<Vec<Matrix2x2>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// 3D points with a rotation matrix each (Nx3x3).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointMatrixSet3D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(
        rename = "origin3D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin3d: Option<Vec<Vector3D>>,

    #[serde(
        rename = "matrix3D",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub matrix3d: Option<Vec<Matrix3x3>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// A mesh annotation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriMesh {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

impl_coordinate_metadata!(
    AnnotationImage2D,
    AnnotationImage3D,
    PointSet2D,
    PointSet3D,
    PointVectorSet2D,
    PointVectorSet3D,
    PointMatrixSet2D,
    PointMatrixSet3D,
    TriMesh,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_set_roundtrip_with_discriminator() {
        let json = r#"{"type": "pointSet3D", "path": "picks.star", "origin3D": [[1, 2, 3], [4, 5, 6]]}"#;
        let annotation: Annotation = serde_json::from_str(json).unwrap();
        match &annotation {
            Annotation::PointSet3D(points) => {
                let origins = points.origin3d.as_ref().unwrap();
                assert_eq!(origins.len(), 2);
                assert_eq!(origins[1].to_array(), [4.0, 5.0, 6.0]);
            }
            other => panic!("unexpected variant {}", other.type_name()),
        }

        let encoded = serde_json::to_value(&annotation).unwrap();
        assert_eq!(encoded["type"], "pointSet3D");
        let restored: Annotation = serde_json::from_value(encoded).unwrap();
        assert_eq!(restored, annotation);
    }

    #[test]
    fn test_point_vectors_must_match_dimension() {
        let json = r#"{"type": "pointVectorSet2D", "origin2D": [[1, 2, 3]]}"#;
        assert!(serde_json::from_str::<Annotation>(json).is_err());
    }

    #[test]
    fn test_point_lists_must_not_be_empty() {
        let json = r#"{"type": "pointSet2D", "origin2D": []}"#;
        let err = serde_json::from_str::<Annotation>(json).unwrap_err();
        assert!(err.to_string().contains("at least one entry"));
    }

    #[test]
    fn test_unknown_annotation_type() {
        let json = r#"{"type": "polygon", "path": "a.json"}"#;
        assert!(serde_json::from_str::<Annotation>(json).is_err());
    }

    #[test]
    fn test_annotation_rejects_foreign_fields() {
        let json = r#"{"type": "triMesh", "path": "m.obj", "origin3D": [[1, 2, 3]]}"#;
        assert!(serde_json::from_str::<Annotation>(json).is_err());
    }

    #[test]
    fn test_generic_annotation_literal() {
        let annotation = Annotation::Generic(AnnotationFile {
            path: Some("labels.csv".into()),
        });
        let json = serde_json::to_string(&annotation).unwrap();
        assert_eq!(json, r#"{"type":"annotation","path":"labels.csv"}"#);
        assert!(annotation.coordinate_metadata().is_none());
    }

    #[test]
    fn test_untyped_object_is_a_generic_annotation() {
        let annotation: Annotation = serde_json::from_str(r#"{"path": "picks.star"}"#).unwrap();
        assert_eq!(
            annotation,
            Annotation::Generic(AnnotationFile {
                path: Some("picks.star".into()),
            })
        );

        let empty: Annotation = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Annotation::Generic(AnnotationFile::default()));
    }

    #[test]
    fn test_untyped_object_rejects_foreign_fields() {
        let json = r#"{"path": "picks.star", "origin3D": [[1, 2, 3]]}"#;
        let err = serde_json::from_str::<Annotation>(json).unwrap_err();
        assert!(err.to_string().contains("origin3D"), "{err}");
    }

    #[test]
    fn test_paired_counts() {
        let annotation = Annotation::PointMatrixSet3D(PointMatrixSet3D {
            origin3d: Some(vec![Vector3D::new([0.0, 0.0, 0.0])]),
            matrix3d: Some(vec![Matrix3x3::identity(), Matrix3x3::identity()]),
            ..Default::default()
        });
        assert_eq!(annotation.paired_counts(), Some((1, 2)));
    }
}

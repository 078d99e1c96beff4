//! Typed records of the cryo-ET metadata schema.
//!
//! The model has three layers:
//!
//! 1. **Geometric primitives**: fixed-length vectors and square matrices
//!    whose shape is checked whenever they are built from dynamic data.
//!
//! 2. **Frames and transformations**: named [`CoordinateSystem`]s and the
//!    [`Transformation`] union that maps between them. A `sequence`
//!    transformation nests the union recursively.
//!
//! 3. **Record containers**: images, stacks, tilt-series, tomograms,
//!    annotations and the [`Dataset`] root. Each may carry its own frames
//!    and transformations.
//!
//! Every record is strict: decoding fails on keys a record does not
//! declare, so typos surface instead of being dropped.
//!
//! # Example
//!
//! ```
//! use cets_model::model::{Axis, CoordinateSystem, Image3D, Transformation};
//!
//! let frame = CoordinateSystem::new("volume", vec![Axis::new("x"), Axis::new("y"), Axis::new("z")])
//!     .unwrap();
//! let image = Image3D {
//!     width: Some(512),
//!     height: Some(512),
//!     depth: Some(200),
//!     coordinate_systems: Some(vec![frame]),
//!     coordinate_transformations: Some(vec![
//!         Transformation::scale(vec![4.0, 4.0, 4.0])
//!             .with_input("base_logical_coordinates")
//!             .with_output("volume"),
//!     ]),
//! };
//! assert_eq!(image.coordinate_transformations.unwrap()[0].input.as_deref(), Some("base_logical_coordinates"));
//! ```

mod annotation;
mod coords;
mod geometry;
pub mod io_json;
pub mod io_yaml;
mod records;
mod transform;

// Re-export core types for convenient access
pub use annotation::{
    Annotation, AnnotationFile, AnnotationImage2D, AnnotationImage3D, PointMatrixSet2D,
    PointMatrixSet3D, PointSet2D, PointSet3D, PointVectorSet2D, PointVectorSet3D, TriMesh,
};
pub use coords::{Axis, AxisType, AxisUnit, CoordinateSystem};
pub use geometry::{Matrix, Matrix2x2, Matrix3x3, Vector, Vector2D, Vector3D};
pub use records::{
    Alignment, Average, CoordinateMetadata, CtfMetadata, Dataset, DefectFile, GainFile, Image2D,
    Image3D, ImageStack2D, ImageStack3D, MovieFrame, MovieStack, MovieStackCollection,
    MovieStackSeries, ParticleMap, ProjectionImage, Region, SubProjectionImage, TiltImage,
    TiltSeries, Tomogram,
};
pub use transform::{
    AxisNameMapping, ProjectionAlignment, Transformation, TransformationKind, TransformationType,
    MAX_SEQUENCE_DEPTH,
};

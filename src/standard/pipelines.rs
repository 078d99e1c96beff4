//! Multi-step alignment pipelines.
//!
//! Every pipeline starts at [`BASE_LOGICAL_COORDS`](super::BASE_LOGICAL_COORDS),
//! carries the standard transformation name for its stage and ends in the
//! standard frame for that stage. Intermediate frame names are fixed.

use serde::Serialize;
use tracing::debug;

use crate::error::CetsError;
use crate::model::{CoordinateSystem, Transformation};

use super::frames::{base_logical_coords, logical_coords, Dimensionality};
use super::generators::{
    generate_flip_transformation, generate_rotation_transformation,
    generate_scale_transformation, generate_translation_transformation,
};
use super::names::*;

/// A built pipeline and the frames it introduces, in step order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StandardPipeline {
    pub transformation: Transformation,
    pub coordinate_systems: Vec<CoordinateSystem>,
}

impl StandardPipeline {
    pub fn into_parts(self) -> (Transformation, Vec<CoordinateSystem>) {
        (self.transformation, self.coordinate_systems)
    }

    /// Names of the introduced frames.
    pub fn frame_names(&self) -> Vec<&str> {
        self.coordinate_systems.iter().map(|cs| cs.name()).collect()
    }
}

/// Rotation step that must match the pipeline's dimensionality.
fn rotation_step(
    name: &str,
    input: &str,
    output: &str,
    matrix: Option<&[Vec<f64>]>,
    dim: Dimensionality,
) -> Result<Transformation, CetsError> {
    if let Some(rows) = matrix {
        if Dimensionality::from_len(rows.len()).is_some() && rows.len() != dim.len() {
            return Err(CetsError::DimensionMismatch {
                what: "rotation matrix",
                expected: dim.len(),
                actual: rows.len(),
            });
        }
    }
    generate_rotation_transformation(name, input, output, matrix)
}

fn finish(
    name: &str,
    steps: Vec<Transformation>,
    frames: Vec<CoordinateSystem>,
) -> StandardPipeline {
    debug!(
        pipeline = name,
        steps = steps.len(),
        frames = frames.len(),
        "built alignment pipeline"
    );
    StandardPipeline {
        transformation: Transformation::sequence(steps).named(name),
        coordinate_systems: frames,
    }
}

/// Flip then translate a calibration (gain/defect) image onto a movie frame.
pub fn aligned_calibration_image_to_micrograph(
    flip_axis: Option<&str>,
    translation: Option<&[f64]>,
) -> Result<StandardPipeline, CetsError> {
    let dim = Dimensionality::Two;
    let base = base_logical_coords(dim);
    let flipped = logical_coords("calibration_image_flipped", dim);
    let aligned = logical_coords(ALIGN_CALIBRATION_IMAGE_COORDS, dim);

    let flip = generate_flip_transformation(
        "calibration_image_flip",
        base.name(),
        flipped.name(),
        flip_axis,
    )?;
    let shift = generate_translation_transformation(
        "calibration_image_translation",
        flipped.name(),
        aligned.name(),
        dim.len(),
        translation,
    )?;

    Ok(finish(
        ALIGN_CALIBRATION_IMAGE_TRANSFORMATION,
        vec![flip, shift],
        vec![flipped, aligned],
    ))
}

/// Translate a movie frame onto its motion-corrected projection.
///
/// This stage is a single translation, not a sequence.
pub fn aligned_movie_frame_to_projection(
    translation: Option<&[f64]>,
) -> Result<StandardPipeline, CetsError> {
    let dim = Dimensionality::Two;
    let base = base_logical_coords(dim);
    let aligned = logical_coords(ALIGN_MOVIE_FRAME_COORDS, dim);

    let transformation = generate_translation_transformation(
        ALIGN_MOVIE_FRAME_TRANSFORMATION,
        base.name(),
        aligned.name(),
        dim.len(),
        translation,
    )?;
    debug!(
        pipeline = ALIGN_MOVIE_FRAME_TRANSFORMATION,
        "built alignment pipeline"
    );

    Ok(StandardPipeline {
        transformation,
        coordinate_systems: vec![aligned],
    })
}

/// Translate then rotate a projection image into the tilt-series frame.
pub fn aligned_projection_image_to_tilt_series(
    translation: Option<&[f64]>,
    rotation: Option<&[Vec<f64>]>,
) -> Result<StandardPipeline, CetsError> {
    let dim = Dimensionality::Two;
    let base = base_logical_coords(dim);
    let translated = logical_coords("projection_image_translated", dim);
    let aligned = logical_coords(ALIGN_PROJECTION_IMAGE_COORDS, dim);

    let shift = generate_translation_transformation(
        "projection_image_translation",
        base.name(),
        translated.name(),
        dim.len(),
        translation,
    )?;
    let rotate = rotation_step(
        "projection_image_rotation",
        translated.name(),
        aligned.name(),
        rotation,
        dim,
    )?;

    Ok(finish(
        ALIGN_PROJECTION_IMAGE_TRANSFORMATION,
        vec![shift, rotate],
        vec![translated, aligned],
    ))
}

/// Rotate then translate a subtomogram into its tomogram.
pub fn aligned_subtomo_to_tomogram(
    rotation: Option<&[Vec<f64>]>,
    translation: Option<&[f64]>,
) -> Result<StandardPipeline, CetsError> {
    let dim = Dimensionality::Three;
    let base = base_logical_coords(dim);
    let rotated = logical_coords("subtomogram_rotated", dim);
    let aligned = logical_coords(ALIGN_SUBTOMOGRAM_COORDS, dim);

    let rotate = rotation_step(
        "subtomogram_rotation",
        base.name(),
        rotated.name(),
        rotation,
        dim,
    )?;
    let shift = generate_translation_transformation(
        "subtomogram_translation",
        rotated.name(),
        aligned.name(),
        dim.len(),
        translation,
    )?;

    Ok(finish(
        ALIGN_SUBTOMOGRAM_TRANSFORMATION,
        vec![rotate, shift],
        vec![rotated, aligned],
    ))
}

/// Shared scale, rotate, translate pipeline for maps and annotations.
fn scaled_rotated_translated(
    prefix: &str,
    name: &str,
    final_frame: &str,
    scale: Option<f64>,
    rotation: Option<&[Vec<f64>]>,
    translation: Option<&[f64]>,
) -> Result<StandardPipeline, CetsError> {
    let dim = Dimensionality::Three;
    let base = base_logical_coords(dim);
    let scaled = logical_coords(&format!("{prefix}_scaled"), dim);
    let rotated = logical_coords(&format!("{prefix}_rotated"), dim);
    let aligned = logical_coords(final_frame, dim);

    let scale = generate_scale_transformation(
        &format!("{prefix}_scale"),
        base.name(),
        scaled.name(),
        scale,
        Some(dim.len()),
    )?;
    let rotate = rotation_step(
        &format!("{prefix}_rotation"),
        scaled.name(),
        rotated.name(),
        rotation,
        dim,
    )?;
    let shift = generate_translation_transformation(
        &format!("{prefix}_translation"),
        rotated.name(),
        aligned.name(),
        dim.len(),
        translation,
    )?;

    Ok(finish(
        name,
        vec![scale, rotate, shift],
        vec![scaled, rotated, aligned],
    ))
}

/// Scale, rotate and translate a map (e.g. an average) into a tomogram.
pub fn aligned_map_to_tomogram(
    scale: Option<f64>,
    rotation: Option<&[Vec<f64>]>,
    translation: Option<&[f64]>,
) -> Result<StandardPipeline, CetsError> {
    scaled_rotated_translated(
        "map",
        ALIGN_MAP_TRANSFORMATION,
        ALIGN_MAP_COORDS,
        scale,
        rotation,
        translation,
    )
}

/// Scale, rotate and translate an annotation into a tomogram.
pub fn aligned_annotation_to_tomogram(
    scale: Option<f64>,
    rotation: Option<&[Vec<f64>]>,
    translation: Option<&[f64]>,
) -> Result<StandardPipeline, CetsError> {
    scaled_rotated_translated(
        "annotation",
        ALIGN_ANNOTATION_TRANSFORMATION,
        ALIGN_ANNOTATION_COORDS,
        scale,
        rotation,
        translation,
    )
}

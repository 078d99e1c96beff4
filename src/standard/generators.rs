//! Single-step transformation generators.
//!
//! Each generator fills in a neutral default for an absent parameter and
//! rejects parameters of the wrong shape. Nothing is returned on failure.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::CetsError;
use crate::model::{CoordinateSystem, Matrix2x2, Matrix3x3, Transformation};

use super::frames::{base_logical_coords, physical_coords, Dimensionality};
use super::names::{
    IMAGE_PHYSICAL_COORDS, IMAGE_PIXEL_SIZE_TRANSFORMATION,
    IMAGE_SUPER_RESOLUTION_PHYSICAL_COORDS, IMAGE_SUPER_RESOLUTION_PIXEL_SIZE_TRANSFORMATION,
};

/// Scale factor used when a scale generator is called without one.
///
/// This is zero, not one: an absent scale collapses every axis. Callers
/// wanting a no-op must pass `Some(1.0)`.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.0;

/// Which axis a 2D flip mirrors across.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlipAxis {
    /// Mirror across the x axis (negates y).
    X,
    /// Mirror across the y axis (negates x).
    Y,
}

impl FlipAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlipAxis::X => "x",
            FlipAxis::Y => "y",
        }
    }

    /// Diagonal flip matrix for an optional axis; `None` is no flip.
    pub fn matrix(axis: Option<FlipAxis>) -> Matrix2x2 {
        match axis {
            None => Matrix2x2::identity(),
            Some(FlipAxis::X) => Matrix2x2::diagonal([1.0, -1.0]),
            Some(FlipAxis::Y) => Matrix2x2::diagonal([-1.0, 1.0]),
        }
    }
}

impl fmt::Display for FlipAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlipAxis {
    type Err = CetsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(FlipAxis::X),
            "y" => Ok(FlipAxis::Y),
            other => Err(CetsError::InvalidSelector(other.to_string())),
        }
    }
}

fn attach(tf: Transformation, name: &str, input: &str, output: &str) -> Transformation {
    tf.named(name).with_input(input).with_output(output)
}

/// Builds a `flip2d` transformation.
///
/// `axis` accepts `"x"`, `"y"` or `None`; anything else fails with
/// [`CetsError::InvalidSelector`].
pub fn generate_flip_transformation(
    name: &str,
    input: &str,
    output: &str,
    axis: Option<&str>,
) -> Result<Transformation, CetsError> {
    let axis = axis.map(str::parse::<FlipAxis>).transpose()?;
    debug!(transformation = name, axis = ?axis, "generated flip transformation");
    Ok(attach(
        Transformation::flip2d(FlipAxis::matrix(axis)),
        name,
        input,
        output,
    ))
}

/// Builds a `translation` transformation of `dim` components.
///
/// An absent vector becomes all zeros.
pub fn generate_translation_transformation(
    name: &str,
    input: &str,
    output: &str,
    dim: usize,
    vector: Option<&[f64]>,
) -> Result<Transformation, CetsError> {
    let vector = match vector {
        None => vec![0.0; dim],
        Some(v) if v.len() != dim => {
            return Err(CetsError::DimensionMismatch {
                what: "translation vector",
                expected: dim,
                actual: v.len(),
            });
        }
        Some(v) => v.to_vec(),
    };
    debug!(transformation = name, dim, "generated translation transformation");
    Ok(attach(Transformation::translation(vector), name, input, output))
}

/// Builds a rotation, dispatching on the matrix rank.
///
/// `None` gives `identity`, a 2x2 matrix gives `rotation2d` and a 3x3
/// matrix gives `affine`.
pub fn generate_rotation_transformation(
    name: &str,
    input: &str,
    output: &str,
    matrix: Option<&[Vec<f64>]>,
) -> Result<Transformation, CetsError> {
    let tf = match matrix {
        None => Transformation::identity(),
        Some(rows) => match rows.len() {
            2 => Transformation::rotation2d(Matrix2x2::from_rows(rows)?),
            3 => Transformation::affine(Matrix3x3::from_rows(rows)?),
            n => return Err(CetsError::UnsupportedRank { rows: n }),
        },
    };
    debug!(
        transformation = name,
        kind = %tf.transformation_type(),
        "generated rotation transformation"
    );
    Ok(attach(tf, name, input, output))
}

/// Builds an isotropic `scale` transformation.
///
/// `dim` is required. An absent `scale` uses [`DEFAULT_SCALE_FACTOR`].
pub fn generate_scale_transformation(
    name: &str,
    input: &str,
    output: &str,
    scale: Option<f64>,
    dim: Option<usize>,
) -> Result<Transformation, CetsError> {
    let dim = dim.ok_or(CetsError::MissingDimension("scale transformation"))?;
    let factor = scale.unwrap_or(DEFAULT_SCALE_FACTOR);
    debug!(transformation = name, dim, factor, "generated scale transformation");
    Ok(attach(
        Transformation::scale(vec![factor; dim]),
        name,
        input,
        output,
    ))
}

fn pixel_size(apix: f64, name: &str, frame: &str) -> (Transformation, CoordinateSystem) {
    let base = base_logical_coords(Dimensionality::Two);
    let tf = attach(Transformation::scale(vec![apix, apix]), name, base.name(), frame);
    (tf, physical_coords(frame, Dimensionality::Two))
}

/// Scale from image pixels to Ångstrom, plus the physical frame it ends in.
pub fn image_pixel_size(apix: f64) -> (Transformation, CoordinateSystem) {
    pixel_size(apix, IMAGE_PIXEL_SIZE_TRANSFORMATION, IMAGE_PHYSICAL_COORDS)
}

/// As [`image_pixel_size`], for super-resolution pixels.
pub fn image_super_resolution_pixel_size(apix: f64) -> (Transformation, CoordinateSystem) {
    pixel_size(
        apix,
        IMAGE_SUPER_RESOLUTION_PIXEL_SIZE_TRANSFORMATION,
        IMAGE_SUPER_RESOLUTION_PHYSICAL_COORDS,
    )
}

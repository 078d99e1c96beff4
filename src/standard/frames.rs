//! Coordinate-system factories.
//!
//! Each call returns a fresh value; no frame is shared between pipelines.

use crate::model::{Axis, AxisType, AxisUnit, CoordinateSystem};

use super::names::BASE_LOGICAL_COORDS;

const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// Number of spatial axes of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    Two,
    Three,
}

impl Dimensionality {
    #[inline]
    pub fn len(self) -> usize {
        match self {
            Dimensionality::Two => 2,
            Dimensionality::Three => 3,
        }
    }

    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            2 => Some(Dimensionality::Two),
            3 => Some(Dimensionality::Three),
            _ => None,
        }
    }
}

fn frame(name: &str, dim: Dimensionality, unit: AxisUnit, axis_type: AxisType) -> CoordinateSystem {
    let axes = AXIS_NAMES[..dim.len()]
        .iter()
        .map(|axis| Axis::new(*axis).with_unit(unit).with_type(axis_type))
        .collect();
    CoordinateSystem::from_valid_axes(name, axes)
}

/// A physical frame measured in Ångstrom.
pub fn physical_coords(name: &str, dim: Dimensionality) -> CoordinateSystem {
    frame(name, dim, AxisUnit::Angstrom, AxisType::Space)
}

/// A logical frame measured in pixels (2D) or voxels (3D).
pub fn logical_coords(name: &str, dim: Dimensionality) -> CoordinateSystem {
    frame(name, dim, AxisUnit::PixelVoxel, AxisType::Array)
}

/// The logical frame named [`BASE_LOGICAL_COORDS`].
pub fn base_logical_coords(dim: Dimensionality) -> CoordinateSystem {
    logical_coords(BASE_LOGICAL_COORDS, dim)
}

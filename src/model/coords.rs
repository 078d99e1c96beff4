//! Axes and named coordinate systems.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CetsError;

/// The unit an axis is measured in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisUnit {
    /// Array index units (pixels for 2-D data, voxels for 3-D data).
    #[serde(rename = "pixel/voxel")]
    PixelVoxel,
    /// Physical distance in Ångstrom.
    #[serde(rename = "Ångstrom")]
    Angstrom,
}

impl AxisUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisUnit::PixelVoxel => "pixel/voxel",
            AxisUnit::Angstrom => "Ångstrom",
        }
    }
}

impl fmt::Display for AxisUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type of an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    /// A spatial axis.
    Space,
    /// An array axis.
    Array,
}

/// An axis in a coordinate system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Axis {
    /// Axis name, unique within its coordinate system.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_unit: Option<AxisUnit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<AxisType>,
}

impl Axis {
    /// Creates an axis with no unit or type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            axis_unit: None,
            axis_type: None,
        }
    }

    pub fn with_unit(mut self, unit: AxisUnit) -> Self {
        self.axis_unit = Some(unit);
        self
    }

    pub fn with_type(mut self, axis_type: AxisType) -> Self {
        self.axis_type = Some(axis_type);
        self
    }
}

/// A named coordinate frame.
///
/// Two coordinate systems with the same name are taken to denote the
/// same frame when referenced from a transformation's `input`/`output`.
/// The axis list is never empty and axis names never repeat; both are
/// checked on construction and on decode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CoordinateSystemData")]
pub struct CoordinateSystem {
    name: String,
    axes: Vec<Axis>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CoordinateSystemData {
    name: String,
    axes: Vec<Axis>,
}

impl TryFrom<CoordinateSystemData> for CoordinateSystem {
    type Error = CetsError;

    fn try_from(data: CoordinateSystemData) -> Result<Self, Self::Error> {
        CoordinateSystem::new(data.name, data.axes)
    }
}

impl CoordinateSystem {
    /// Creates a coordinate system, checking that `axes` is non-empty and
    /// that no axis name repeats.
    pub fn new(name: impl Into<String>, axes: Vec<Axis>) -> Result<Self, CetsError> {
        let name = name.into();
        if axes.is_empty() {
            return Err(CetsError::EmptyAxes(name));
        }

        let mut seen = HashSet::new();
        for axis in &axes {
            if !seen.insert(axis.name.as_str()) {
                return Err(CetsError::DuplicateAxis {
                    system: name,
                    axis: axis.name.clone(),
                });
            }
        }

        Ok(Self { name, axes })
    }

    /// Builds a frame from axes the caller already knows to be non-empty
    /// and uniquely named.
    pub(crate) fn from_valid_axes(name: impl Into<String>, axes: Vec<Axis>) -> Self {
        debug_assert!(!axes.is_empty());
        Self {
            name: name.into(),
            axes,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    /// Returns a copy of this frame under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            axes: self.axes.clone(),
        }
    }
}

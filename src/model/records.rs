//! Record containers of the cryo-ET metadata schema.
//!
//! These are plain strict records: every field is optional unless noted,
//! unknown keys are rejected on decode, and absent fields are omitted on
//! encode. Images, volumes and annotations carry their own lists of
//! coordinate systems and transformations; nothing is shared between
//! records by reference.

use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use super::coords::CoordinateSystem;
use super::transform::{ProjectionAlignment, Transformation};
use crate::header::VolumeHeader;

/// Access to the frames and transformations attached to a record.
pub trait CoordinateMetadata {
    fn coordinate_systems(&self) -> &[CoordinateSystem];
    fn coordinate_transformations(&self) -> &[Transformation];
}

macro_rules! impl_coordinate_metadata {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl CoordinateMetadata for $ty {
                fn coordinate_systems(&self) -> &[CoordinateSystem] {
                    self.coordinate_systems.as_deref().unwrap_or_default()
                }

                fn coordinate_transformations(&self) -> &[Transformation] {
                    self.coordinate_transformations.as_deref().unwrap_or_default()
                }
            }
        )+
    };
}

pub(crate) use impl_coordinate_metadata;

/// A 2D image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Image2D {
    /// Width (x-axis) in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    /// Height (y-axis) in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// A 3D image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Image3D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    /// Depth (z-axis) in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// A stack of 2D images.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageStack2D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image2D>>,
}

/// A stack of 3D images.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageStack3D {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image3D>>,
}

/// A gain reference file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GainFile {
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

/// A detector defect file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefectFile {
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

fn default_handedness() -> Option<i32> {
    Some(-1)
}

/// CTF parameters estimated for an image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CtfMetadata {
    /// Defocus U in Ångstrom, underfocus positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defocus_u: Option<f64>,

    /// Defocus V in Ångstrom, underfocus positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defocus_v: Option<f64>,

    /// Angle of astigmatism.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defocus_angle: Option<f64>,

    /// Phase shift introduced by a phase plate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_shift: Option<f64>,

    /// Handedness of the tilt geometry: whether focus increases or
    /// decreases with Z.
    #[serde(
        default = "default_handedness",
        skip_serializing_if = "Option::is_none"
    )]
    pub defocus_handedness: Option<i32>,
}

impl Default for CtfMetadata {
    fn default() -> Self {
        Self {
            defocus_u: None,
            defocus_v: None,
            defocus_angle: None,
            phase_shift: None,
            defocus_handedness: default_handedness(),
        }
    }
}

/// An individual movie frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovieFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Section index inside a stack file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    /// Tilt angle reported by the microscope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_tilt_angle: Option<f64>,

    /// Pre-exposure up to this image in e-/Å².
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulated_dose: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctf_metadata: Option<CtfMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// A stack of movie frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovieStack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<MovieFrame>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Movie stacks belonging to a single tilt series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovieStackSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks: Option<Vec<MovieStack>>,
}

/// Movie stacks sharing the same gain and defect files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovieStackCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_stacks: Option<Vec<MovieStackSeries>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_file: Option<GainFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect_file: Option<DefectFile>,
}

/// A projection image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// 0-based section index inside a stack file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_tilt_angle: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulated_dose: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctf_metadata: Option<CtfMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// A projection image that belongs to a tilt-series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TiltImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_tilt_angle: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulated_dose: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctf_metadata: Option<CtfMetadata>,

    /// Identifier of the tilt-series, normally the stack file's base name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_id: Option<String>,

    /// 0-based acquisition order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acq_order: Option<i64>,

    /// Sampling rate in Ångstrom / pixel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctf_corrected: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub even_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odd_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

impl TiltImage {
    /// Fills size and pixel size from a file header.
    pub fn from_header(path: impl Into<String>, header: &VolumeHeader) -> Self {
        Self {
            path: Some(path.into()),
            width: Some(header.width),
            height: Some(header.height),
            pixel_size: header.voxel_size,
            ..Default::default()
        }
    }
}

/// A cropped projection image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubProjectionImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_tilt_angle: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulated_dose: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctf_metadata: Option<CtfMetadata>,

    /// Index of the particle inside its tomogram.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particle_index: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

/// A stack of projection images.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TiltSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ProjectionImage>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// The tomographic alignment of a tilt series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_alignments: Option<Vec<ProjectionAlignment>>,
}

/// A reconstructed tomogram.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tomogram {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u64>,

    /// Sampling rate in Ångstrom / voxel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voxel_size: Option<f64>,

    /// Whether the source tilt-series was CTF corrected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctf_corrected: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub even_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odd_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_systems: Option<Vec<CoordinateSystem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<Transformation>>,
}

impl Tomogram {
    /// Fills the volume size and voxel size from a file header.
    pub fn from_header(path: impl Into<String>, header: &VolumeHeader) -> Self {
        Self {
            path: Some(path.into()),
            width: Some(header.width),
            height: Some(header.height),
            depth: Some(header.depth),
            voxel_size: header.voxel_size,
            ..Default::default()
        }
    }
}

/// A particle density map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticleMap {
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

/// Raw data (movie stacks) and derived data (tilt series, tomograms,
/// annotations) from a single region of a specimen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_stack_collections: Option<Vec<MovieStackCollection>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_series: Option<Vec<TiltSeries>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignments: Option<Vec<Alignment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tomograms: Option<Vec<Tomogram>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

/// A particle averaging experiment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Average {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particle_maps: Option<Vec<ParticleMap>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

/// The document root.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<Region>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub averages: Option<Vec<Average>>,
}

impl_coordinate_metadata!(
    Image2D,
    Image3D,
    GainFile,
    DefectFile,
    MovieFrame,
    ProjectionImage,
    TiltImage,
    SubProjectionImage,
    Tomogram,
    ParticleMap,
);

//! Standard coordinate systems and alignment transformations.
//!
//! Builders here produce the transformations that relate each stage of a
//! cryo-ET workflow (calibration image, movie frame, projection,
//! subtomogram, map, annotation) to the next, using a fixed vocabulary of
//! transformation and frame names so that independent tools agree on them.

mod frames;
mod generators;
mod names;
mod pipelines;

pub use frames::{base_logical_coords, logical_coords, physical_coords, Dimensionality};
pub use generators::{
    generate_flip_transformation, generate_rotation_transformation,
    generate_scale_transformation, generate_translation_transformation, image_pixel_size,
    image_super_resolution_pixel_size, FlipAxis, DEFAULT_SCALE_FACTOR,
};
pub use names::*;
pub use pipelines::{
    aligned_annotation_to_tomogram, aligned_calibration_image_to_micrograph,
    aligned_map_to_tomogram, aligned_movie_frame_to_projection,
    aligned_projection_image_to_tilt_series, aligned_subtomo_to_tomogram, StandardPipeline,
};

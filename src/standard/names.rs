//! Standard coordinate system and transformation names.
//!
//! A transformation (or sequence) accomplishing one of these alignment
//! steps must carry the matching transformation name, and the frame it
//! ends in must carry the matching coordinate-system name. The steps
//! inside may vary.

/// Logical (pixel/voxel) frame every pipeline starts from.
pub const BASE_LOGICAL_COORDS: &str = "base_logical_coordinates";

/// Align calibration image to movie frame.
pub const ALIGN_CALIBRATION_IMAGE_TRANSFORMATION: &str = "align_calibration_image_to_movie_frame";
pub const ALIGN_CALIBRATION_IMAGE_COORDS: &str = "aligned_calibration_image";

/// Align movie frame to projection.
pub const ALIGN_MOVIE_FRAME_TRANSFORMATION: &str = "align_movie_frame_to_projection";
pub const ALIGN_MOVIE_FRAME_COORDS: &str = "aligned_movie_frame";

/// Align projection image to tomogram.
pub const ALIGN_PROJECTION_IMAGE_TRANSFORMATION: &str = "align_projection_image_to_tomogram";
pub const ALIGN_PROJECTION_IMAGE_COORDS: &str = "aligned_projection_image";

/// Align subtomogram to tomogram.
pub const ALIGN_SUBTOMOGRAM_TRANSFORMATION: &str = "align_subtomogram_to_tomogram";
pub const ALIGN_SUBTOMOGRAM_COORDS: &str = "aligned_subtomogram";

/// Align map to tomogram.
pub const ALIGN_MAP_TRANSFORMATION: &str = "align_map_to_tomogram";
pub const ALIGN_MAP_COORDS: &str = "aligned_map";

/// Align annotation to tomogram.
pub const ALIGN_ANNOTATION_TRANSFORMATION: &str = "align_annotation_to_tomogram";
pub const ALIGN_ANNOTATION_COORDS: &str = "aligned_annotation";

/// Image pixel size (logical to physical).
pub const IMAGE_PIXEL_SIZE_TRANSFORMATION: &str = "image_pixel_size";
pub const IMAGE_PHYSICAL_COORDS: &str = "image_physical_coordinates";

/// Super-resolution image pixel size (logical to physical).
pub const IMAGE_SUPER_RESOLUTION_PIXEL_SIZE_TRANSFORMATION: &str =
    "image_super_resolution_pixel_size";
pub const IMAGE_SUPER_RESOLUTION_PHYSICAL_COORDS: &str =
    "image_super_resolution_physical_coordinates";

//! Volume and image file header readers.
//!
//! Readers only look at headers: dimensions, data mode and voxel size are
//! recovered without decoding pixel data. Three formats are understood:
//!
//! - **MRC** (`.mrc`, `.mrcs`, `.rec`, `.st`, `.ali`, `.map`)
//! - **TIFF** (`.tif`, `.tiff`), multi-page stacks included
//! - **EM** (`.em`), the legacy 512-byte TOM toolbox format
//!
//! [`read_volume_header`] picks the reader from the file extension. The
//! `check_file_is_*`, [`get_image_dims`] and [`read_image_info`] helpers
//! sniff content instead and accept either MRC or TIFF.

pub mod em;
pub mod mrc;
pub mod tiff;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::error::CetsError;

pub use em::{parse_em_header, EmHeader};
pub use mrc::{parse_mrc_header, MrcHeader};
pub use tiff::{parse_tiff_header, TiffHeader};

/// File format of a volume or image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeFormat {
    Mrc,
    Tiff,
    Em,
}

impl VolumeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeFormat::Mrc => "MRC",
            VolumeFormat::Tiff => "TIFF",
            VolumeFormat::Em => "EM",
        }
    }

    /// Extensions (lowercase, no dot) read as this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            VolumeFormat::Mrc => &["mrc", "mrcs", "rec", "st", "ali", "map"],
            VolumeFormat::Tiff => &["tif", "tiff"],
            VolumeFormat::Em => &["em"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [VolumeFormat::Mrc, VolumeFormat::Tiff, VolumeFormat::Em]
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for VolumeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a file's content does not match its format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeaderFormatError {
    #[error("header is {actual} bytes, expected at least {expected}")]
    Truncated { expected: usize, actual: usize },

    #[error("missing '{0}' signature")]
    BadSignature(&'static str),

    #[error("{field} has invalid value {value}")]
    InvalidField { field: &'static str, value: i64 },

    #[error("unsupported data type code {0}")]
    UnsupportedDataType(u8),

    #[error("{0}")]
    Malformed(String),
}

/// Dimensions and voxel size of a volume.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VolumeHeader {
    pub width: u64,
    pub height: u64,
    pub depth: u64,
    /// Ångstrom per voxel, when the file records it.
    pub voxel_size: Option<f64>,
    pub format: VolumeFormat,
}

/// Header summary of an image that does not require reading pixel data.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageInfo {
    pub size_x: u64,
    pub size_y: u64,
    pub size_z: u64,
    pub mode: String,
    pub mode_desc: String,
    pub apix_x: Option<f64>,
    pub apix_y: Option<f64>,
    /// `None` for single-section files.
    pub apix_z: Option<f64>,
}

/// Format implied by a path's extension.
pub fn detect_format(path: &Path) -> Result<VolumeFormat, CetsError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    VolumeFormat::from_extension(ext).ok_or_else(|| {
        CetsError::UnsupportedFormat(if ext.is_empty() {
            path.display().to_string()
        } else {
            format!(".{ext}")
        })
    })
}

fn ensure_file(path: &Path) -> Result<(), CetsError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CetsError::FileNotFound(path.to_path_buf()))
    }
}

fn read_prefix(path: &Path, len: usize) -> Result<Vec<u8>, CetsError> {
    let mut buf = Vec::with_capacity(len);
    File::open(path)?.take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

fn format_error(
    path: &Path,
    format: VolumeFormat,
) -> impl FnOnce(HeaderFormatError) -> CetsError + '_ {
    move |source| CetsError::FileFormat {
        path: path.to_path_buf(),
        format,
        source,
    }
}

fn read_mrc(path: &Path) -> Result<MrcHeader, CetsError> {
    let bytes = read_prefix(path, mrc::MRC_HEADER_LEN)?;
    parse_mrc_header(&bytes).map_err(format_error(path, VolumeFormat::Mrc))
}

fn read_tiff(path: &Path) -> Result<TiffHeader, CetsError> {
    // IFDs may sit anywhere in the file, so the whole file is needed.
    let bytes = std::fs::read(path)?;
    parse_tiff_header(&bytes).map_err(format_error(path, VolumeFormat::Tiff))
}

fn read_em(path: &Path) -> Result<EmHeader, CetsError> {
    let bytes = read_prefix(path, em::EM_HEADER_LEN)?;
    parse_em_header(&bytes).map_err(format_error(path, VolumeFormat::Em))
}

/// Reads width, height, depth and voxel size, choosing the reader from
/// the extension.
///
/// # Errors
///
/// - [`CetsError::FileNotFound`] if `path` is not a file
/// - [`CetsError::UnsupportedFormat`] for an unknown extension
/// - [`CetsError::FileFormat`] if the content does not match the format
pub fn read_volume_header(path: &Path) -> Result<VolumeHeader, CetsError> {
    ensure_file(path)?;
    let format = detect_format(path)?;
    tracing::debug!(path = %path.display(), %format, "reading volume header");
    match format {
        VolumeFormat::Mrc => read_mrc(path).map(|h| h.to_volume_header()),
        VolumeFormat::Tiff => read_tiff(path).map(|h| h.to_volume_header()),
        VolumeFormat::Em => read_em(path).map(|h| h.to_volume_header()),
    }
}

/// True if the file has a valid MRC main header.
pub fn check_file_is_mrc(path: &Path) -> bool {
    read_mrc(path).is_ok()
}

/// True if the file is a readable TIFF.
pub fn check_file_is_tiff(path: &Path) -> bool {
    read_prefix(path, 64).is_ok_and(|bytes| tiff::is_tiff(&bytes)) && read_tiff(path).is_ok()
}

/// Header summary of an MRC or TIFF file, recognised by content.
pub fn read_image_info(path: &Path) -> Result<ImageInfo, CetsError> {
    ensure_file(path)?;
    if let Ok(header) = read_mrc(path) {
        return Ok(header.to_image_info());
    }
    if let Ok(header) = read_tiff(path) {
        return Ok(header.to_image_info());
    }
    Err(CetsError::UnsupportedFormat(format!(
        "{} is not a valid MRC or TIFF file",
        path.display()
    )))
}

/// `(x, y, z)` size in pixels of an MRC or TIFF file, recognised by content.
pub fn get_image_dims(path: &Path) -> Result<(u64, u64, u64), CetsError> {
    let info = read_image_info(path)?;
    Ok((info.size_x, info.size_y, info.size_z))
}

/// Fuzz-only entrypoint running every header parser over one buffer.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_headers(bytes: &[u8]) {
    let _ = parse_mrc_header(bytes).map(|h| h.to_image_info());
    let _ = parse_tiff_header(bytes).map(|h| h.to_image_info());
    let _ = parse_em_header(bytes).map(|h| h.to_volume_header());
}

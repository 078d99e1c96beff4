//! MRC/MRCS volume headers.
//!
//! Only the fixed 1024-byte main header is read. Extended headers and
//! voxel data are never touched.

use std::io::{self, Cursor};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use super::{HeaderFormatError, ImageInfo, VolumeFormat, VolumeHeader};

/// Size of the fixed main header.
pub const MRC_HEADER_LEN: usize = 1024;

const MAP_ID_OFFSET: usize = 208;
const MACHINE_STAMP_OFFSET: usize = 212;

/// Fields of an MRC main header used for dimensions and pixel size.
#[derive(Clone, Debug, PartialEq)]
pub struct MrcHeader {
    pub nx: i32,
    pub ny: i32,
    pub nz: i32,
    pub mode: i32,
    pub mx: i32,
    pub my: i32,
    pub mz: i32,
    /// Cell dimensions in Ångstrom.
    pub cella: [f32; 3],
    pub little_endian: bool,
}

impl MrcHeader {
    /// Ångstrom per voxel along x, or 0 when the sampling is unset.
    pub fn voxel_size_x(&self) -> f64 {
        cell_step(self.cella[0], self.mx)
    }

    pub fn voxel_size_y(&self) -> f64 {
        cell_step(self.cella[1], self.my)
    }

    pub fn to_volume_header(&self) -> VolumeHeader {
        VolumeHeader {
            width: self.nx as u64,
            height: self.ny as u64,
            depth: self.nz as u64,
            voxel_size: Some(self.voxel_size_x()),
            format: VolumeFormat::Mrc,
        }
    }

    pub fn to_image_info(&self) -> ImageInfo {
        let apix = self.voxel_size_x();
        ImageInfo {
            size_x: self.nx as u64,
            size_y: self.ny as u64,
            size_z: self.nz as u64,
            mode: self.mode.to_string(),
            mode_desc: mode_description(self.mode),
            apix_x: Some(apix),
            apix_y: Some(self.voxel_size_y()),
            // Voxels are assumed cubic.
            apix_z: (self.nz != 1).then_some(apix),
        }
    }
}

fn cell_step(cell: f32, samples: i32) -> f64 {
    if samples == 0 {
        0.0
    } else {
        f64::from(cell) / f64::from(samples)
    }
}

/// Human-readable description of an MRC data mode.
pub fn mode_description(mode: i32) -> String {
    let known = match mode {
        0 => "8-bit signed integer (range -128 to 127)",
        1 => "16-bit signed integer",
        2 => "32-bit signed real",
        3 => "transform : complex 16-bit integers",
        4 => "transform : complex 32-bit reals",
        6 => "16-bit unsigned integer",
        12 => "16-bit float (IEEE754)",
        other => return format!("Unknown mode (data type): {other}"),
    };
    known.to_string()
}

/// Reads the fixed-position words once the byte order is known.
fn read_words<B: ByteOrder>(bytes: &[u8], little_endian: bool) -> io::Result<MrcHeader> {
    let mut cursor = Cursor::new(bytes);
    let nx = cursor.read_i32::<B>()?;
    let ny = cursor.read_i32::<B>()?;
    let nz = cursor.read_i32::<B>()?;
    let mode = cursor.read_i32::<B>()?;

    cursor.set_position(28);
    let mx = cursor.read_i32::<B>()?;
    let my = cursor.read_i32::<B>()?;
    let mz = cursor.read_i32::<B>()?;
    let cella = [
        cursor.read_f32::<B>()?,
        cursor.read_f32::<B>()?,
        cursor.read_f32::<B>()?,
    ];

    Ok(MrcHeader {
        nx,
        ny,
        nz,
        mode,
        mx,
        my,
        mz,
        cella,
        little_endian,
    })
}

/// Byte order from the machine stamp.
///
/// `0x44 0x44` / `0x44 0x41` mark little-endian, `0x11 0x11` big-endian.
/// A zeroed stamp is read as little-endian.
fn stamp_is_little_endian(stamp: &[u8]) -> Result<bool, HeaderFormatError> {
    match stamp[0] {
        0x44 | 0x00 => Ok(true),
        0x11 => Ok(false),
        other => Err(HeaderFormatError::InvalidField {
            field: "machine stamp",
            value: i64::from(other),
        }),
    }
}

/// Parses an MRC main header from the start of a file.
pub fn parse_mrc_header(bytes: &[u8]) -> Result<MrcHeader, HeaderFormatError> {
    if bytes.len() < MRC_HEADER_LEN {
        return Err(HeaderFormatError::Truncated {
            expected: MRC_HEADER_LEN,
            actual: bytes.len(),
        });
    }
    if &bytes[MAP_ID_OFFSET..MAP_ID_OFFSET + 4] != b"MAP " {
        return Err(HeaderFormatError::BadSignature("MAP "));
    }

    let little_endian =
        stamp_is_little_endian(&bytes[MACHINE_STAMP_OFFSET..MACHINE_STAMP_OFFSET + 4])?;
    let header = if little_endian {
        read_words::<LittleEndian>(bytes, little_endian)
    } else {
        read_words::<BigEndian>(bytes, little_endian)
    }
    .map_err(|_| HeaderFormatError::Truncated {
        expected: MRC_HEADER_LEN,
        actual: bytes.len(),
    })?;

    for (field, value) in [
        ("nx", header.nx),
        ("ny", header.ny),
        ("nz", header.nz),
        ("mx", header.mx),
        ("my", header.my),
        ("mz", header.mz),
    ] {
        if value < 0 {
            return Err(HeaderFormatError::InvalidField {
                field,
                value: i64::from(value),
            });
        }
    }

    tracing::trace!(
        nx = header.nx,
        ny = header.ny,
        nz = header.nz,
        mode = header.mode,
        little_endian,
        "parsed MRC header"
    );
    Ok(header)
}

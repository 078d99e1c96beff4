//! EM (TOM toolbox) volume headers.
//!
//! The header is a fixed 512 bytes: four single-byte fields, three int32
//! dimensions, an 80-byte comment, forty int32 user parameters and a
//! trailing user-data block.

use std::io::{self, Cursor};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use super::{HeaderFormatError, VolumeFormat, VolumeHeader};

/// Size of the fixed header.
pub const EM_HEADER_LEN: usize = 512;

const USER_PARAMS_OFFSET: usize = 96;
/// Zero-based index of the object pixel size parameter (nm x 1000).
const PIXEL_SIZE_PARAM: usize = 6;

/// Voxel data type stored in byte 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmDataType {
    Byte,
    Short,
    Long,
    Float,
    Complex,
    Double,
}

impl EmDataType {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => EmDataType::Byte,
            2 => EmDataType::Short,
            4 => EmDataType::Long,
            5 => EmDataType::Float,
            8 => EmDataType::Complex,
            9 => EmDataType::Double,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmHeader {
    pub nx: i32,
    pub ny: i32,
    pub nz: i32,
    pub data_type: EmDataType,
    pub little_endian: bool,
    /// Object pixel size in Ångstrom, when recorded.
    pub pixel_size: Option<f64>,
}

impl EmHeader {
    pub fn to_volume_header(&self) -> VolumeHeader {
        VolumeHeader {
            width: self.nx as u64,
            height: self.ny as u64,
            depth: self.nz as u64,
            voxel_size: self.pixel_size,
            format: VolumeFormat::Em,
        }
    }
}

/// Parses an EM header from the start of a file.
///
/// Machine codes 1 (VAX) and 6 (PC) are little-endian; 0 (OS-9),
/// 3 (SGI) and 5 (Mac) are big-endian.
pub fn parse_em_header(bytes: &[u8]) -> Result<EmHeader, HeaderFormatError> {
    if bytes.len() < EM_HEADER_LEN {
        return Err(HeaderFormatError::Truncated {
            expected: EM_HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let little_endian = match bytes[0] {
        1 | 6 => true,
        0 | 3 | 5 => false,
        other => {
            return Err(HeaderFormatError::InvalidField {
                field: "machine",
                value: i64::from(other),
            })
        }
    };
    let data_type = EmDataType::from_code(bytes[3])
        .ok_or(HeaderFormatError::UnsupportedDataType(bytes[3]))?;

    let (dims, raw_pixel_size) = if little_endian {
        read_words::<LittleEndian>(bytes)
    } else {
        read_words::<BigEndian>(bytes)
    }
    .map_err(|_| HeaderFormatError::Truncated {
        expected: EM_HEADER_LEN,
        actual: bytes.len(),
    })?;

    let [nx, ny, nz] = dims;
    for (field, value) in [("nx", nx), ("ny", ny), ("nz", nz)] {
        if value <= 0 {
            return Err(HeaderFormatError::InvalidField {
                field,
                value: i64::from(value),
            });
        }
    }
    let pixel_size = (raw_pixel_size > 0).then(|| f64::from(raw_pixel_size) / 100.0);

    tracing::trace!(nx, ny, nz, ?data_type, little_endian, "parsed EM header");
    Ok(EmHeader {
        nx,
        ny,
        nz,
        data_type,
        little_endian,
        pixel_size,
    })
}

/// Dimensions and the raw pixel size parameter.
fn read_words<B: ByteOrder>(bytes: &[u8]) -> io::Result<([i32; 3], i32)> {
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(4);
    let dims = [
        cursor.read_i32::<B>()?,
        cursor.read_i32::<B>()?,
        cursor.read_i32::<B>()?,
    ];
    cursor.set_position((USER_PARAMS_OFFSET + PIXEL_SIZE_PARAM * 4) as u64);
    Ok((dims, cursor.read_i32::<B>()?))
}

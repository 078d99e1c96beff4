//! Multi-page TIFF headers.
//!
//! The first page size comes from `imagesize`. Page count, sample layout
//! and resolution come from walking the IFD chain; pixel data is never
//! decoded. BigTIFF is not supported.

use std::collections::HashSet;
use std::io::Cursor;
use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use super::{HeaderFormatError, ImageInfo, VolumeFormat, VolumeHeader};

/// Upper bound on pages walked before the chain is declared malformed.
pub const MAX_TIFF_PAGES: usize = 1 << 16;

const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_PHOTOMETRIC: u16 = 262;
const TAG_SAMPLES_PER_PIXEL: u16 = 277;
const TAG_X_RESOLUTION: u16 = 282;
const TAG_RESOLUTION_UNIT: u16 = 296;
const TAG_SAMPLE_FORMAT: u16 = 339;

const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

const ANGSTROM_PER_INCH: f64 = 2.54e8;
const ANGSTROM_PER_CM: f64 = 1.0e8;

#[derive(Clone, Debug, PartialEq)]
pub struct TiffHeader {
    pub width: u64,
    pub height: u64,
    /// Number of pages (IFDs) in the file.
    pub pages: u64,
    /// Pixel mode label, e.g. `L`, `I;16B`, `F`.
    pub mode: String,
    pub little_endian: bool,
    /// Ångstrom per pixel from XResolution, when a physical unit is set.
    pub pixel_size: Option<f64>,
}

impl TiffHeader {
    pub fn to_volume_header(&self) -> VolumeHeader {
        VolumeHeader {
            width: self.width,
            height: self.height,
            depth: self.pages,
            voxel_size: self.pixel_size,
            format: VolumeFormat::Tiff,
        }
    }

    pub fn to_image_info(&self) -> ImageInfo {
        ImageInfo {
            size_x: self.width,
            size_y: self.height,
            size_z: self.pages,
            mode: self.mode.clone(),
            mode_desc: mode_description(&self.mode).to_string(),
            apix_x: self.pixel_size,
            apix_y: self.pixel_size,
            apix_z: if self.pages == 1 {
                None
            } else {
                self.pixel_size
            },
        }
    }
}

/// Description of a pixel mode label.
pub fn mode_description(mode: &str) -> &'static str {
    match mode {
        "1" => "1-bit pixels, black and white, stored with one pixel per byte",
        "L" => "8-bit unsigned pixels, grayscale",
        "P" => "8-bit unsigned pixels, grayscale, mapped to any other mode using a color palette",
        "RGB" => "3x8-bit pixels, true color",
        "RGBA" => "4x8-bit pixels, true color with transparency mask",
        "I" => "32-bit signed integer pixels",
        "F" => "32-bit floating point pixels",
        "I;16" => "16-bit unsigned integer pixels",
        "I;16L" => "16-bit little endian unsigned integer pixels",
        "I;16B" => "16-bit big endian unsigned integer pixels",
        "I;16S" => "16-bit signed integer pixels",
        _ => "Cannot determine TIFF mode",
    }
}

/// Returns true when the bytes start with a classic TIFF signature.
pub fn is_tiff(bytes: &[u8]) -> bool {
    matches!(imagesize::image_type(bytes), Ok(imagesize::ImageType::Tiff))
        && bytes.len() >= 4
        && (bytes[..4] == *b"II*\0" || bytes[..4] == *b"MM\0*")
}

/// Random-access reads in the byte order named by the file signature.
struct Reader<'a, B> {
    bytes: &'a [u8],
    order: PhantomData<B>,
}

impl<'a, B: ByteOrder> Reader<'a, B> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader {
            bytes,
            order: PhantomData,
        }
    }

    fn at(&self, offset: usize, len: usize) -> Result<Cursor<&'a [u8]>, HeaderFormatError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.bytes.len() => {
                let mut cursor = Cursor::new(self.bytes);
                cursor.set_position(offset as u64);
                Ok(cursor)
            }
            _ => Err(HeaderFormatError::Truncated {
                expected: offset.saturating_add(len),
                actual: self.bytes.len(),
            }),
        }
    }

    fn u16(&self, offset: usize) -> Result<u16, HeaderFormatError> {
        self.at(offset, 2)?
            .read_u16::<B>()
            .map_err(|err| HeaderFormatError::Malformed(err.to_string()))
    }

    fn u32(&self, offset: usize) -> Result<u32, HeaderFormatError> {
        self.at(offset, 4)?
            .read_u32::<B>()
            .map_err(|err| HeaderFormatError::Malformed(err.to_string()))
    }
}

#[derive(Clone, Copy)]
struct Entry {
    field_type: u16,
    count: u32,
    /// Offset of the 4-byte value/offset field.
    value_at: usize,
}

impl Entry {
    /// First SHORT or LONG value.
    fn first_uint<B: ByteOrder>(&self, r: &Reader<'_, B>) -> Result<u32, HeaderFormatError> {
        match self.field_type {
            TYPE_SHORT if self.count <= 2 => r.u16(self.value_at).map(u32::from),
            TYPE_SHORT => {
                let offset = r.u32(self.value_at)? as usize;
                r.u16(offset).map(u32::from)
            }
            TYPE_LONG if self.count <= 1 => r.u32(self.value_at),
            TYPE_LONG => {
                let offset = r.u32(self.value_at)? as usize;
                r.u32(offset)
            }
            other => Err(HeaderFormatError::InvalidField {
                field: "TIFF field type",
                value: i64::from(other),
            }),
        }
    }

    fn rational<B: ByteOrder>(&self, r: &Reader<'_, B>) -> Result<Option<f64>, HeaderFormatError> {
        if self.field_type != TYPE_RATIONAL {
            return Ok(None);
        }
        let offset = r.u32(self.value_at)? as usize;
        let num = r.u32(offset)?;
        let den = r.u32(offset + 4)?;
        Ok((den != 0).then(|| f64::from(num) / f64::from(den)))
    }
}

fn read_entries<B: ByteOrder>(
    r: &Reader<'_, B>,
    ifd: usize,
) -> Result<(Vec<(u16, Entry)>, u32), HeaderFormatError> {
    let count = usize::from(r.u16(ifd)?);
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let at = ifd + 2 + i * 12;
        let tag = r.u16(at)?;
        entries.push((
            tag,
            Entry {
                field_type: r.u16(at + 2)?,
                count: r.u32(at + 4)?,
                value_at: at + 8,
            },
        ));
    }
    let next = r.u32(ifd + 2 + count * 12)?;
    Ok((entries, next))
}

fn pixel_mode(
    bits: u32,
    samples: u32,
    photometric: u32,
    sample_format: u32,
    little_endian: bool,
) -> String {
    let mode = match (samples, bits, sample_format) {
        (1, 1, _) => "1",
        (1, 8, _) if photometric == 3 => "P",
        (1, 8, _) => "L",
        (1, 16, 2) => "I;16S",
        (1, 16, _) if little_endian => "I;16",
        (1, 16, _) => "I;16B",
        (1, 32, 3) => "F",
        (1, 32, _) => "I",
        (3, 8, _) => "RGB",
        (4, 8, _) => "RGBA",
        _ => "unknown",
    };
    mode.to_string()
}

/// Walks the IFD chain: page count, first page pixel mode and pixel size.
fn read_ifds<B: ByteOrder>(
    r: &Reader<'_, B>,
    little_endian: bool,
) -> Result<(u64, String, Option<f64>), HeaderFormatError> {
    let first = r.u32(4)? as usize;
    let (entries, mut next) = read_entries(r, first)?;

    let find = |tag: u16| entries.iter().find(|(t, _)| *t == tag).map(|(_, e)| *e);
    let uint_or = |tag: u16, default: u32| -> Result<u32, HeaderFormatError> {
        find(tag).map_or(Ok(default), |e| e.first_uint(r))
    };

    let bits = uint_or(TAG_BITS_PER_SAMPLE, 1)?;
    let samples = uint_or(TAG_SAMPLES_PER_PIXEL, 1)?;
    let photometric = uint_or(TAG_PHOTOMETRIC, 1)?;
    let sample_format = uint_or(TAG_SAMPLE_FORMAT, 1)?;
    let unit = uint_or(TAG_RESOLUTION_UNIT, 2)?;
    let x_resolution = match find(TAG_X_RESOLUTION) {
        Some(entry) => entry.rational(r)?,
        None => None,
    };
    let pixel_size = x_resolution
        .filter(|res| *res > 0.0)
        .and_then(|res| match unit {
            2 => Some(ANGSTROM_PER_INCH / res),
            3 => Some(ANGSTROM_PER_CM / res),
            _ => None,
        });

    let mut seen = HashSet::from([first as u32]);
    let mut pages: u64 = 1;
    while next != 0 {
        if !seen.insert(next) || seen.len() > MAX_TIFF_PAGES {
            return Err(HeaderFormatError::Malformed(format!(
                "IFD chain loops or exceeds {MAX_TIFF_PAGES} pages"
            )));
        }
        let count = usize::from(r.u16(next as usize)?);
        next = r.u32(next as usize + 2 + count * 12)?;
        pages += 1;
    }

    let mode = pixel_mode(bits, samples, photometric, sample_format, little_endian);
    Ok((pages, mode, pixel_size))
}

/// Parses the TIFF header, first page tags and page count.
pub fn parse_tiff_header(bytes: &[u8]) -> Result<TiffHeader, HeaderFormatError> {
    if !is_tiff(bytes) {
        return Err(HeaderFormatError::BadSignature("II*\\0 or MM\\0*"));
    }
    let size = imagesize::blob_size(bytes)
        .map_err(|err| HeaderFormatError::Malformed(err.to_string()))?;

    let little_endian = bytes[0] == b'I';
    let (pages, mode, pixel_size) = if little_endian {
        read_ifds(&Reader::<LittleEndian>::new(bytes), little_endian)?
    } else {
        read_ifds(&Reader::<BigEndian>::new(bytes), little_endian)?
    };

    let header = TiffHeader {
        width: size.width as u64,
        height: size.height as u64,
        pages,
        mode,
        little_endian,
        pixel_size,
    };
    tracing::trace!(
        width = header.width,
        height = header.height,
        pages,
        mode = %header.mode,
        "parsed TIFF header"
    );
    Ok(header)
}

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Little-endian MRC header (no voxel data) with cubic sampling `apix`.
pub fn mrc_bytes(nx: i32, ny: i32, nz: i32, mode: i32, apix: f32) -> Vec<u8> {
    let mut bytes = vec![0u8; 1024];
    let mut put = |offset: usize, raw: [u8; 4]| bytes[offset..offset + 4].copy_from_slice(&raw);

    put(0, nx.to_le_bytes());
    put(4, ny.to_le_bytes());
    put(8, nz.to_le_bytes());
    put(12, mode.to_le_bytes());
    put(28, nx.to_le_bytes());
    put(32, ny.to_le_bytes());
    put(36, nz.to_le_bytes());
    put(40, (nx as f32 * apix).to_le_bytes());
    put(44, (ny as f32 * apix).to_le_bytes());
    put(48, (nz as f32 * apix).to_le_bytes());
    put(208, *b"MAP ");
    put(212, [0x44, 0x44, 0, 0]);
    bytes
}

/// PC-ordered EM header with object pixel size `pixel_param` (Å x 100).
pub fn em_bytes(nx: i32, ny: i32, nz: i32, data_type: u8, pixel_param: i32) -> Vec<u8> {
    let mut bytes = vec![0u8; 512];
    bytes[0] = 6;
    bytes[3] = data_type;
    bytes[4..8].copy_from_slice(&nx.to_le_bytes());
    bytes[8..12].copy_from_slice(&ny.to_le_bytes());
    bytes[12..16].copy_from_slice(&nz.to_le_bytes());
    bytes[120..124].copy_from_slice(&pixel_param.to_le_bytes());
    bytes
}

/// Little-endian 8-bit grayscale TIFF with `pages` empty pages.
///
/// Each page gets LONG width/height tags and, when `dpi` is given, an
/// XResolution in pixels per inch.
pub fn tiff_bytes(width: u32, height: u32, pages: usize, dpi: Option<u32>) -> Vec<u8> {
    let mut bytes = b"II*\0".to_vec();
    bytes.extend_from_slice(&8u32.to_le_bytes());

    for page in 0..pages {
        let start = bytes.len();
        let tag_count: u16 = if dpi.is_some() { 5 } else { 3 };
        let ifd_len = 2 + usize::from(tag_count) * 12 + 4;
        let rational_at = (start + ifd_len) as u32;

        let mut entries: Vec<(u16, u16, u32, u32)> = vec![
            (256, 4, 1, width),
            (257, 4, 1, height),
            (258, 3, 1, 8),
        ];
        if dpi.is_some() {
            entries.push((282, 5, 1, rational_at));
            entries.push((296, 3, 1, 2));
        }

        bytes.extend_from_slice(&tag_count.to_le_bytes());
        for (tag, field_type, count, value) in entries {
            bytes.extend_from_slice(&tag.to_le_bytes());
            bytes.extend_from_slice(&field_type.to_le_bytes());
            bytes.extend_from_slice(&count.to_le_bytes());
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        let extra = if dpi.is_some() { 8 } else { 0 };
        let next = if page + 1 == pages {
            0
        } else {
            rational_at + extra
        };
        bytes.extend_from_slice(&next.to_le_bytes());
        if let Some(dpi) = dpi {
            bytes.extend_from_slice(&dpi.to_le_bytes());
            bytes.extend_from_slice(&1u32.to_le_bytes());
        }
    }
    bytes
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bytes).expect("write fixture file");
}

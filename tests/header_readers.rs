use cets_model::header::{
    check_file_is_mrc, check_file_is_tiff, get_image_dims, read_image_info, read_volume_header,
    VolumeFormat,
};
use cets_model::CetsError;

mod common;

fn approx(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 1e-4)
}

#[test]
fn mrc_stack_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mrc_stack.mrcs");
    common::write_file(&path, &common::mrc_bytes(64, 64, 215, 12, 3.54));

    let header = read_volume_header(&path).unwrap();
    assert_eq!(header.format, VolumeFormat::Mrc);
    assert_eq!((header.width, header.height, header.depth), (64, 64, 215));
    assert!(approx(header.voxel_size, 3.54));
}

#[test]
fn mrc_image_info_single_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("single.mrc");
    common::write_file(&path, &common::mrc_bytes(100, 100, 1, 2, 1.05));

    let info = read_image_info(&path).unwrap();
    assert_eq!((info.size_x, info.size_y, info.size_z), (100, 100, 1));
    assert_eq!(info.mode, "2");
    assert_eq!(info.mode_desc, "32-bit signed real");
    assert!(approx(info.apix_x, 1.05));
    assert!(approx(info.apix_y, 1.05));
    assert_eq!(info.apix_z, None);
}

#[test]
fn mrc_image_info_stack() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mrc_stack.mrcs");
    common::write_file(&path, &common::mrc_bytes(64, 64, 215, 12, 3.54));

    let info = read_image_info(&path).unwrap();
    assert_eq!(info.mode_desc, "16-bit float (IEEE754)");
    assert!(approx(info.apix_z, 3.54));
}

#[test]
fn mrc_variant_extensions_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["tomo.rec", "ts.st", "ts.ali", "avg.map", "UPPER.MRC"] {
        let path = dir.path().join(name);
        common::write_file(&path, &common::mrc_bytes(16, 16, 16, 2, 2.0));
        let header = read_volume_header(&path).unwrap();
        assert_eq!(header.depth, 16, "{name}");
    }
}

#[test]
fn tiff_stack_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiff_stack.tiff");
    common::write_file(&path, &common::tiff_bytes(78, 78, 24, None));

    let header = read_volume_header(&path).unwrap();
    assert_eq!(header.format, VolumeFormat::Tiff);
    assert_eq!((header.width, header.height, header.depth), (78, 78, 24));
    assert_eq!(header.voxel_size, None);

    let info = read_image_info(&path).unwrap();
    assert_eq!(info.mode, "L");
    assert_eq!(info.apix_x, None);
    assert_eq!(info.apix_z, None);
}

#[test]
fn tiff_non_square_keeps_width_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.tif");
    common::write_file(&path, &common::tiff_bytes(48, 32, 1, None));

    assert_eq!(get_image_dims(&path).unwrap(), (48, 32, 1));
}

#[test]
fn tiff_resolution_gives_pixel_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calibrated.tif");
    // 2.54e7 pixels per inch is 10 Å per pixel.
    common::write_file(&path, &common::tiff_bytes(32, 32, 3, Some(25_400_000)));

    let header = read_volume_header(&path).unwrap();
    assert_eq!(header.depth, 3);
    assert!(approx(header.voxel_size, 10.0));
}

#[test]
fn em_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.em");
    common::write_file(&path, &common::em_bytes(128, 128, 64, 5, 1350));

    let header = read_volume_header(&path).unwrap();
    assert_eq!(header.format, VolumeFormat::Em);
    assert_eq!((header.width, header.height, header.depth), (128, 128, 64));
    assert!(approx(header.voxel_size, 13.5));
}

#[test]
fn content_sniffing() {
    let dir = tempfile::tempdir().unwrap();
    let mrc = dir.path().join("single.mrc");
    let tif = dir.path().join("single.tif");
    common::write_file(&mrc, &common::mrc_bytes(100, 100, 1, 2, 1.05));
    common::write_file(&tif, &common::tiff_bytes(32, 32, 1, None));

    assert!(check_file_is_mrc(&mrc));
    assert!(!check_file_is_mrc(&tif));
    assert!(check_file_is_tiff(&tif));
    assert!(!check_file_is_tiff(&mrc));

    assert_eq!(get_image_dims(&mrc).unwrap(), (100, 100, 1));
    assert_eq!(get_image_dims(&tif).unwrap(), (32, 32, 1));
}

#[test]
fn mismatched_content_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actually_tiff.mrc");
    common::write_file(&path, &common::tiff_bytes(32, 32, 1, None));

    let err = read_volume_header(&path).unwrap_err();
    assert!(matches!(
        err,
        CetsError::FileFormat {
            format: VolumeFormat::Mrc,
            ..
        }
    ));
}

#[test]
fn unknown_content_and_extension() {
    let dir = tempfile::tempdir().unwrap();
    let text = dir.path().join("null.txt");
    common::write_file(&text, b"nothing to see");

    assert!(matches!(
        read_volume_header(&text),
        Err(CetsError::UnsupportedFormat(_))
    ));
    assert!(get_image_dims(&text).is_err());
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_volume_header(&dir.path().join("absent.em")).unwrap_err();
    assert!(matches!(err, CetsError::FileNotFound(_)));
}

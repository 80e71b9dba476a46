use proptest::prelude::*;
use rosettasim_png::{
    encode_rgba, write_image, write_image_with, EncodeError, PngEncoder, RasterEncoder,
};
use tempfile::tempdir;

fn gradient(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            out.extend_from_slice(&[
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x ^ y) & 0xFF) as u8,
                (255 - (x + y) % 256) as u8,
            ]);
        }
    }
    out
}

#[test]
fn standard_decoder_reproduces_pixels_exactly() {
    for (width, height) in [(1, 1), (2, 2), (7, 3), (64, 48), (333, 5)] {
        let rgba = gradient(width, height);
        let png = encode_rgba(width, height, &rgba).unwrap();

        let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
            .unwrap()
            .into_rgba8();
        assert_eq!(decoded.dimensions(), (width, height));
        assert_eq!(decoded.into_raw(), rgba, "{width}x{height}");
    }
}

#[test]
fn write_image_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shot.png");
    std::fs::write(&path, vec![0xAB; 10_000]).unwrap();

    let rgba = gradient(4, 4);
    write_image(&path, 4, 4, &rgba).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, encode_rgba(4, 4, &rgba).unwrap());
    let img = image::open(&path).unwrap().into_rgba8();
    assert_eq!(img.into_raw(), rgba);
}

#[test]
fn every_compression_level_is_lossless() {
    let rgba = gradient(20, 10);
    for level in 0..=9 {
        let png = PngEncoder::with_level(level);
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        write_image_with(&png, &path, 20, 10, &rgba).unwrap();

        let img = image::open(&path).unwrap().into_rgba8();
        assert_eq!(img.into_raw(), rgba, "level {level}");
    }
}

#[test]
fn invalid_input_leaves_destination_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shot.png");

    let err = write_image(&path, 4, 4, &[0u8; 10]).unwrap_err();
    assert!(matches!(err, EncodeError::PayloadLength { .. }));
    assert!(!path.exists());
}

#[test]
fn unwritable_destination_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("shot.png");

    let err = write_image(&path, 1, 1, &[1, 2, 3, 4]).unwrap_err();
    assert!(matches!(err, EncodeError::Io(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn standard_decoder_reproduces_arbitrary_frames(
        (width, height, rgba) in (1u32..32, 1u32..32).prop_flat_map(|(width, height)| {
            let len = (width * height * 4) as usize;
            (Just(width), Just(height), proptest::collection::vec(any::<u8>(), len))
        }),
        level in 0u32..=9,
    ) {
        let png = PngEncoder::with_level(level).encode_rgba(width, height, &rgba).unwrap();

        let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
            .unwrap()
            .into_rgba8();
        prop_assert_eq!(decoded.dimensions(), (width, height));
        prop_assert_eq!(decoded.into_raw(), rgba);
    }
}

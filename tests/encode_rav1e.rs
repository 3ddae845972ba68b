//! Saving with the rav1e encoder

#![cfg(feature = "encode")]

use imgref::Img;
use rgb::{Rgb, Rgba};
use zenavif_raster::{
    ChromaSampling, CodecChoice, EncodeOptions, Error, Metadata, RasterBuffer, RasterColor,
    Rav1eEncoder, container, save_raster,
};

/// 16x16 RGB8 gradient
fn make_rgb8_image() -> RasterBuffer {
    let mut pixels = Vec::with_capacity(16 * 16);
    for y in 0..16u8 {
        for x in 0..16u8 {
            pixels.push(Rgb {
                r: x * 16,
                g: y * 16,
                b: 128,
            });
        }
    }
    RasterBuffer::Rgb8(Img::new(pixels, 16, 16))
}

/// 16x16 RGBA16 gradient with a horizontal alpha ramp
fn make_rgba16_image() -> RasterBuffer {
    let mut pixels = Vec::with_capacity(16 * 16);
    for y in 0..16u16 {
        for x in 0..16u16 {
            pixels.push(Rgba {
                r: x * 4096,
                g: y * 4096,
                b: 32768,
                a: 65535 - x * 4096,
            });
        }
    }
    RasterBuffer::Rgba16(Img::new(pixels, 16, 16))
}

fn fast() -> EncodeOptions {
    EncodeOptions::new().speed(10)
}

#[test]
fn rgb8_420() {
    let _ = env_logger::builder().is_test(true).try_init();
    let artifact = save_raster(
        &make_rgb8_image(),
        &RasterColor::srgb(),
        &fast(),
        &Metadata::default(),
        Rav1eEncoder::new(),
    )
    .expect("encode should succeed");

    assert!(artifact.color_byte_size > 0);
    assert_eq!(artifact.alpha_byte_size, 0);
    let parsed = container::parse(&artifact.avif_file).unwrap();
    assert_eq!((parsed.color.width, parsed.color.height), (16, 16));
    assert_eq!(parsed.color.config.depth(), 8);
    assert_eq!(parsed.color.config.format(), ChromaSampling::Cs420);
    assert_eq!(parsed.color.data.len(), artifact.color_byte_size);
    assert!(parsed.alpha.is_none());
}

#[test]
fn rgba16_at_ten_bit_444() {
    let options = fast()
        .bit_depth(10)
        .pixel_format(ChromaSampling::Cs444)
        .alpha_quantizer(10);
    let artifact = save_raster(
        &make_rgba16_image(),
        &RasterColor::srgb(),
        &options,
        &Metadata::default(),
        Rav1eEncoder::new(),
    )
    .expect("encode should succeed");

    assert!(artifact.alpha_byte_size > 0);
    let parsed = container::parse(&artifact.avif_file).unwrap();
    assert_eq!(parsed.color.config.depth(), 10);
    assert_eq!(parsed.color.config.format(), ChromaSampling::Cs444);
    let alpha = parsed.alpha.expect("alpha item");
    assert!(alpha.config.monochrome);
    assert_eq!(alpha.config.depth(), 10);
}

#[test]
fn gray_at_eight_bit_is_monochrome() {
    let raster = RasterBuffer::Gray8(Img::new((0..=255u8).collect(), 16, 16));
    let artifact = save_raster(
        &raster,
        &RasterColor::srgb(),
        &fast(),
        &Metadata::default(),
        Rav1eEncoder::new(),
    )
    .unwrap();
    let parsed = container::parse(&artifact.avif_file).unwrap();
    assert!(parsed.color.config.monochrome);
}

#[test]
fn foreign_codec_choice_is_unsupported() {
    let err = save_raster(
        &make_rgb8_image(),
        &RasterColor::srgb(),
        &fast().codec(CodecChoice::Svt),
        &Metadata::default(),
        Rav1eEncoder::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "{err}");
}

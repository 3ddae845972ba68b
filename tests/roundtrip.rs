//! Save/load round trips through the container with a lossless test codec

mod common;

use common::{RawCodec, init_logging};
use imgref::ImgVec;
use rgb::{GrayA, Rgb, Rgba};
use zenavif_raster::{
    ChromaSampling, CleanAperture, ColorPrimaries, DecodeConfig, EncodeOptions, Error,
    MatrixCoefficients, Metadata, ProfileSource, RasterBuffer, RasterColor,
    TransferCharacteristics, container, load_raster, load_raster_with, primaries, profile,
    save_raster, save_raster_with_progress,
};

fn save(raster: &RasterBuffer, color: &RasterColor, options: &EncodeOptions) -> Vec<u8> {
    save_raster(raster, color, options, &Metadata::default(), RawCodec::default())
        .expect("save should succeed")
        .avif_file
}

fn gray8(values: &[u8], width: usize) -> RasterBuffer {
    RasterBuffer::Gray8(ImgVec::new(values.to_vec(), width, values.len() / width))
}

/// Re-serialize a saved file after editing its container fields
fn reserialize(file: &[u8], edit: impl FnOnce(&mut container::AvifContainer)) -> Vec<u8> {
    let mut parsed = container::parse(file).unwrap();
    edit(&mut parsed);
    container::serialize(&parsed).unwrap()
}

fn with_transforms(file: &[u8], edit: impl FnOnce(&mut zenavif_raster::Transforms)) -> Vec<u8> {
    reserialize(file, |c| edit(&mut c.transforms))
}

#[test]
fn white_rgb_survives_420() {
    init_logging();
    let raster = RasterBuffer::Rgb8(ImgVec::new(vec![Rgb { r: 255, g: 255, b: 255 }; 4], 2, 2));
    let file = save(&raster, &RasterColor::srgb(), &EncodeOptions::new().quantizer(0, 0));

    let loaded = load_raster(&file, RawCodec::default()).unwrap();
    let RasterBuffer::Rgb8(img) = &loaded.raster else {
        panic!("expected Rgb8, got {:?}", loaded.raster.layout());
    };
    assert_eq!((img.width(), img.height()), (2, 2));
    for px in img.buf() {
        for c in [px.r, px.g, px.b] {
            assert!(c >= 253, "channel {c} too far from 255");
        }
    }
    assert_eq!(loaded.color.source, ProfileSource::Nclx);
    assert!(loaded.icc.is_some());
}

#[test]
fn gray_alpha_keeps_alpha() {
    init_logging();
    let raster = RasterBuffer::GrayA8(ImgVec::new(vec![GrayA { v: 200, a: 128 }], 1, 1));
    let artifact = save_raster(
        &raster,
        &RasterColor::srgb(),
        &EncodeOptions::new(),
        &Metadata::default(),
        RawCodec::default(),
    )
    .unwrap();
    assert!(artifact.alpha_byte_size > 0);

    let loaded = load_raster(&artifact.avif_file, RawCodec::default()).unwrap();
    let RasterBuffer::GrayA8(img) = &loaded.raster else {
        panic!("expected GrayA8, got {:?}", loaded.raster.layout());
    };
    let px = img.buf()[0];
    assert_eq!(px.v, 200);
    assert!(px.a.abs_diff(128) <= 1, "alpha {}", px.a);
    assert!(loaded.color.is_gray);
}

#[test]
fn wide_depths_round_trip_as_16_bit() {
    init_logging();
    let values = [0u16, 65535, 32768, 1000];
    for (depth, tolerance) in [(10u8, 64u16), (12, 16)] {
        let raster = RasterBuffer::Gray16(ImgVec::new(values.to_vec(), 2, 2));
        let file = save(&raster, &RasterColor::srgb(), &EncodeOptions::new().bit_depth(depth));
        assert_eq!(container::parse(&file).unwrap().color.config.depth(), depth);

        let loaded = load_raster(&file, RawCodec::default()).unwrap();
        let RasterBuffer::Gray16(img) = &loaded.raster else {
            panic!("expected Gray16 at {depth}-bit, got {:?}", loaded.raster.layout());
        };
        for (&got, &want) in img.buf().iter().zip(&values) {
            assert!(got.abs_diff(want) <= tolerance, "{depth}-bit: {got} vs {want}");
        }
        assert_eq!(img.buf()[0], 0);
        assert_eq!(img.buf()[1], 65535);
    }
}

#[test]
fn eight_bit_raster_widens_for_ten_bit_save() {
    let file = save(&gray8(&[128], 1), &RasterColor::srgb(), &EncodeOptions::new().bit_depth(10));
    let loaded = load_raster(&file, RawCodec::default()).unwrap();
    let RasterBuffer::Gray16(img) = &loaded.raster else {
        panic!("expected Gray16, got {:?}", loaded.raster.layout());
    };
    assert!(img.buf()[0].abs_diff(128 * 257) <= 64);
}

#[test]
fn rgba16_alpha_is_independent() {
    let px = Rgba { r: 65535u16, g: 65535, b: 65535, a: 16384 };
    let raster = RasterBuffer::Rgba16(ImgVec::new(vec![px; 4], 2, 2));
    let options = EncodeOptions::new().bit_depth(12).pixel_format(ChromaSampling::Cs444);
    let file = save(&raster, &RasterColor::srgb(), &options);
    let loaded = load_raster(&file, RawCodec::default()).unwrap();
    let RasterBuffer::Rgba16(img) = &loaded.raster else {
        panic!("expected Rgba16, got {:?}", loaded.raster.layout());
    };
    for p in img.buf() {
        assert!(p.a.abs_diff(16384) <= 16, "alpha {}", p.a);
        assert!(p.g >= 65535 - 64, "green {}", p.g);
    }
}

#[test]
fn gray_rasters_are_saved_monochrome() {
    let file = save(
        &gray8(&[1, 2, 3, 4], 2),
        &RasterColor::srgb(),
        &EncodeOptions::new().pixel_format(ChromaSampling::Cs444),
    );
    let parsed = container::parse(&file).unwrap();
    assert!(parsed.color.config.monochrome);
    assert_eq!(parsed.color.config.format(), ChromaSampling::Monochrome);

    let loaded = load_raster(&file, RawCodec::default()).unwrap();
    assert_eq!(loaded.raster.to_packed_bytes(), vec![1, 2, 3, 4]);
}

#[test]
fn encoder_settings_for_color_and_alpha() {
    let raster = RasterBuffer::Rgba8(ImgVec::new(vec![Rgba { r: 1, g: 2, b: 3, a: 4 }; 4], 2, 2));
    let options = EncodeOptions::new().quantizer(3, 20).alpha_quantizer(5).speed(9).threads(4);
    let mut codec = RawCodec::default();
    save_raster(&raster, &RasterColor::srgb(), &options, &Metadata::default(), &mut codec).unwrap();

    let [color, alpha] = codec.encoded.as_slice() else {
        panic!("expected two frames, got {}", codec.encoded.len());
    };
    assert_eq!((color.min_quantizer, color.max_quantizer, color.is_alpha), (3, 20, false));
    assert_eq!((alpha.min_quantizer, alpha.max_quantizer, alpha.is_alpha), (0, 5, true));
    assert_eq!((color.speed, color.threads, color.timescale), (9, 4, 1));
    assert_eq!((color.tile_cols_log2, color.tile_rows_log2), (0, 0));
}

#[test]
fn progress_is_reported_in_order() {
    let mut seen = Vec::new();
    save_raster_with_progress(
        &gray8(&[7], 1),
        &RasterColor::srgb(),
        &EncodeOptions::new(),
        &Metadata::default(),
        RawCodec::default(),
        &mut |f: f32| seen.push(f),
    )
    .unwrap();
    assert_eq!(seen, [0.5, 0.75, 1.0]);
}

#[test]
fn invalid_bit_depth_is_rejected() {
    let err = save_raster(
        &gray8(&[7], 1),
        &RasterColor::srgb(),
        &EncodeOptions::new().bit_depth(9),
        &Metadata::default(),
        RawCodec::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "{err}");
}

#[test]
fn compact_color_uses_table_primaries() {
    init_logging();
    let bt2020 = primaries::values(ColorPrimaries::BT2020);
    let color = RasterColor::srgb().with_primaries(bt2020);
    let raster = RasterBuffer::Rgb8(ImgVec::new(vec![Rgb { r: 255, g: 255, b: 255 }], 1, 1));
    let artifact = save_raster(
        &raster,
        &color,
        &EncodeOptions::new().pixel_format(ChromaSampling::Cs444),
        &Metadata::default(),
        RawCodec::default(),
    )
    .unwrap();
    let cicp = artifact.cicp.unwrap();
    assert_eq!(cicp.color_primaries, ColorPrimaries::BT2020);
    assert_eq!(cicp.transfer_characteristics, TransferCharacteristics::SRGB);
    assert_eq!(cicp.matrix_coefficients, MatrixCoefficients::CHROMAT_NCL);
    assert!(cicp.full_range);
    assert!(artifact.icc.is_none());
    // The colr box has no code for this matrix; it lives in the sequence header
    assert!(container::parse(&artifact.avif_file).unwrap().cicp.is_none());

    let loaded = load_raster(&artifact.avif_file, RawCodec::default()).unwrap();
    assert_eq!(loaded.color.source, ProfileSource::Nclx);
    assert_eq!(loaded.color.primaries, Some(bt2020));
    assert_eq!(loaded.color.matrix, MatrixCoefficients::CHROMAT_NCL);
    assert!(loaded.raster.to_packed_bytes().iter().all(|&c| c >= 253));
}

#[test]
fn icc_mode_embeds_the_profile() {
    let raster = RasterBuffer::Rgb8(ImgVec::new(vec![Rgb { r: 10, g: 20, b: 30 }; 4], 2, 2));
    let artifact = save_raster(
        &raster,
        &RasterColor::srgb(),
        &EncodeOptions::new().save_icc(true).pixel_format(ChromaSampling::Cs444),
        &Metadata::default(),
        RawCodec::default(),
    )
    .unwrap();
    assert!(artifact.cicp.is_none());
    let icc = artifact.icc.clone().expect("ICC profile written");
    assert!(container::parse(&artifact.avif_file).unwrap().cicp.is_none());

    let loaded = load_raster(&artifact.avif_file, RawCodec::default()).unwrap();
    assert_eq!(loaded.color.source, ProfileSource::Icc);
    assert_eq!(loaded.color.matrix, MatrixCoefficients::BT709);
    assert_eq!(loaded.icc.as_deref(), Some(icc.as_slice()));
    let RasterBuffer::Rgb8(img) = &loaded.raster else {
        panic!("expected Rgb8, got {:?}", loaded.raster.layout());
    };
    for p in img.buf() {
        assert!(p.r.abs_diff(10) <= 2 && p.g.abs_diff(20) <= 2 && p.b.abs_diff(30) <= 2, "{p:?}");
    }
}

#[test]
fn gray_icc_on_color_planes_loads_gray() {
    let gray_icc = profile::gray_profile(false).encode().unwrap();
    let raster = RasterBuffer::Rgb8(ImgVec::new(vec![Rgb { r: 90, g: 90, b: 90 }; 4], 2, 2));
    let file = save(
        &raster,
        &RasterColor::from_icc(gray_icc, false),
        &EncodeOptions::new().save_icc(true).pixel_format(ChromaSampling::Cs444),
    );
    let loaded = load_raster(&file, RawCodec::default()).unwrap();
    assert!(loaded.color.is_gray);
    let RasterBuffer::Gray8(img) = &loaded.raster else {
        panic!("expected Gray8, got {:?}", loaded.raster.layout());
    };
    assert!(img.buf().iter().all(|v| v.abs_diff(90) <= 1));
}

#[test]
fn monochrome_with_srgb_icc_loads_gray() {
    init_logging();
    let file = save(&gray8(&[10, 100, 200, 250], 2), &RasterColor::srgb(), &EncodeOptions::new());
    let srgb = moxcms::ColorProfile::new_srgb().encode().unwrap();
    let file = reserialize(&file, |c| c.icc = Some(srgb.clone()));
    let parsed = container::parse(&file).unwrap();
    assert!(parsed.color.config.monochrome);
    assert_eq!(parsed.icc.as_deref(), Some(srgb.as_slice()));

    let loaded = load_raster(&file, RawCodec::default()).unwrap();
    let RasterBuffer::Gray8(img) = &loaded.raster else {
        panic!("expected Gray8, got {:?}", loaded.raster.layout());
    };
    assert_eq!(img.buf().as_slice(), &[10, 100, 200, 250]);
    assert!(loaded.color.is_gray);
    let icc = loaded.icc.expect("gray profile attached");
    let profile = moxcms::ColorProfile::new_from_slice(&icc).unwrap();
    assert_eq!(profile.color_space, moxcms::DataColorSpace::Gray);
}

#[test]
fn premultiplied_color_is_unpremultiplied_on_load() {
    let raster = RasterBuffer::GrayA8(ImgVec::new(vec![GrayA { v: 64, a: 128 }; 2], 2, 1));
    let file = save(&raster, &RasterColor::srgb(), &EncodeOptions::new());
    assert!(!container::parse(&file).unwrap().premultiplied);
    let file = reserialize(&file, |c| c.premultiplied = true);
    assert!(container::parse(&file).unwrap().premultiplied);

    let loaded = load_raster(&file, RawCodec::default()).unwrap();
    let RasterBuffer::GrayA8(img) = &loaded.raster else {
        panic!("expected GrayA8, got {:?}", loaded.raster.layout());
    };
    for px in img.buf() {
        assert!(px.v.abs_diff(128) <= 1, "straight value {}", px.v);
        assert!(px.a.abs_diff(128) <= 1, "alpha {}", px.a);
    }
}

#[test]
fn clap_rotation_and_mirror_are_applied() {
    let file = save(&gray8(&[0, 1, 2, 3, 4, 5], 3), &RasterColor::srgb(), &EncodeOptions::new());

    let rotated = with_transforms(&file, |t| t.irot = Some(1));
    let loaded = load_raster(&rotated, RawCodec::default()).unwrap();
    assert_eq!((loaded.raster.width(), loaded.raster.height()), (2, 3));
    assert_eq!(loaded.raster.to_packed_bytes(), vec![2, 5, 1, 4, 0, 3]);

    let mirrored = with_transforms(&file, |t| t.imir = Some(1));
    let loaded = load_raster(&mirrored, RawCodec::default()).unwrap();
    assert_eq!(loaded.raster.to_packed_bytes(), vec![2, 1, 0, 5, 4, 3]);

    // 2x2 aperture centered horizontally: offset 0.5 + 0.5 -> 1
    let cropped = with_transforms(&file, |t| {
        t.clap = Some(CleanAperture {
            width_n: 2,
            width_d: 1,
            height_n: 2,
            height_d: 1,
            horiz_off_n: 0,
            horiz_off_d: 1,
            vert_off_n: 0,
            vert_off_d: 1,
        })
    });
    let loaded = load_raster(&cropped, RawCodec::default()).unwrap();
    assert_eq!(loaded.raster.to_packed_bytes(), vec![1, 2, 4, 5]);

    let untouched = load_raster_with(
        &cropped,
        &DecodeConfig::new().apply_transforms(false),
        RawCodec::default(),
    )
    .unwrap();
    assert_eq!((untouched.raster.width(), untouched.raster.height()), (3, 2));
    assert!(untouched.transforms.clap.is_some());
}

#[test]
fn exif_and_xmp_round_trip() {
    let tiff = b"II*\0\x08\0\0\0".to_vec();
    let xmp = b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>".to_vec();
    let metadata = Metadata {
        exif: Some(tiff.clone()),
        xmp: Some(xmp.clone()),
    };
    let artifact = save_raster(
        &gray8(&[1], 1),
        &RasterColor::srgb(),
        &EncodeOptions::new(),
        &metadata,
        RawCodec::default(),
    )
    .unwrap();
    assert_eq!(artifact.exif.as_deref(), Some(tiff.as_slice()));

    // Stored with the 4-byte offset prefix
    let parsed = container::parse(&artifact.avif_file).unwrap();
    let item = parsed.exif_item.unwrap();
    assert_eq!(&item[..4], &[0, 0, 0, 0]);
    assert_eq!(&item[4..], tiff.as_slice());

    let loaded = load_raster(&artifact.avif_file, RawCodec::default()).unwrap();
    assert_eq!(loaded.metadata, metadata);
}

#[test]
fn metadata_flags_and_short_exif() {
    let metadata = Metadata {
        exif: Some(b"II*\0\x08\0\0\0".to_vec()),
        xmp: Some(b"<x/>".to_vec()),
    };
    let artifact = save_raster(
        &gray8(&[1], 1),
        &RasterColor::srgb(),
        &EncodeOptions::new().save_exif(false).save_xmp(false),
        &metadata,
        RawCodec::default(),
    )
    .unwrap();
    assert!(artifact.exif.is_none() && artifact.xmp.is_none());
    let loaded = load_raster(&artifact.avif_file, RawCodec::default()).unwrap();
    assert!(loaded.metadata.is_empty());

    let short = Metadata {
        exif: Some(b"II".to_vec()),
        xmp: None,
    };
    let artifact = save_raster(
        &gray8(&[1], 1),
        &RasterColor::srgb(),
        &EncodeOptions::new(),
        &short,
        RawCodec::default(),
    )
    .unwrap();
    assert!(artifact.exif.is_none());
    assert!(container::parse(&artifact.avif_file).unwrap().exif_item.is_none());
}

#[test]
fn frame_size_limit_is_enforced() {
    let file = save(&gray8(&[1, 2, 3, 4], 2), &RasterColor::srgb(), &EncodeOptions::new());
    let err = load_raster_with(&file, &DecodeConfig::new().frame_size_limit(3), RawCodec::default())
        .unwrap_err();
    assert!(matches!(err, Error::ImageTooLarge { width: 2, height: 2 }), "{err}");
    assert!(load_raster_with(&file, &DecodeConfig::new().frame_size_limit(4), RawCodec::default()).is_ok());
}

#[test]
fn malformed_input_is_a_parse_error() {
    let mut codec = RawCodec::default();
    for data in [&b""[..], &b"GIF89a\x01\x00\x01\x00"[..], &b"\0\0\0\x0cftypav"[..]] {
        let err = load_raster(data, &mut codec).unwrap_err();
        assert!(matches!(err, Error::Parse(_)), "{err}");
    }
    assert_eq!(codec.decoded, 0);
}

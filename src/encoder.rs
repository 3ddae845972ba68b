//! AV1 encoding via rav1e
//!
//! [`Rav1eEncoder`] implements [`Av1Encoder`] for still images. It encodes
//! one frame per call and returns the OBUs together with the `av1C`
//! configuration rav1e reports for the sequence.

use crate::codec::{Av1Config, Av1Encoder, Av1Payload, CodecChoice, CodecFrame, FrameSettings};
use crate::error::{Error, Result};
use crate::image::{self, ChromaSampling, Cicp};
use log::{debug, trace};
use rav1e::prelude::*;

/// rav1e-backed AV1 encoder
#[derive(Debug, Default, Clone, Copy)]
pub struct Rav1eEncoder;

impl Rav1eEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Av1Encoder for Rav1eEncoder {
    fn encode_frame(&mut self, frame: &CodecFrame, settings: &FrameSettings) -> Result<Av1Payload> {
        match settings.codec {
            CodecChoice::Auto | CodecChoice::Rav1e => {}
            CodecChoice::Aom => return Err(Error::Unsupported("the aom encoder is not built in")),
            CodecChoice::Svt => return Err(Error::Unsupported("the SVT-AV1 encoder is not built in")),
        }
        frame.validate()?;
        let config = build_config(frame, settings);
        if frame.depth > 8 {
            encode_with::<u16>(frame, &config)
        } else {
            encode_with::<u8>(frame, &config)
        }
    }
}

/// Map the 0..=63 quantizer scale onto rav1e's 0..=255
fn quantizer_to_rav1e(q: u8) -> u8 {
    let q = u32::from(q.min(63));
    ((q * 255 + 31) / 63) as u8
}

fn build_config(frame: &CodecFrame, settings: &FrameSettings) -> Config {
    let max_q = quantizer_to_rav1e(settings.max_quantizer);
    let min_q = quantizer_to_rav1e(settings.min_quantizer).min(max_q);
    let enc = EncoderConfig {
        width: frame.width(),
        height: frame.height(),
        time_base: Rational::new(1, settings.timescale.max(1)),
        bit_depth: usize::from(frame.depth),
        chroma_sampling: chroma_sampling(frame.format),
        chroma_sample_position: ChromaSamplePosition::Unknown,
        pixel_range: match frame.range {
            image::ColorRange::Full => PixelRange::Full,
            image::ColorRange::Limited => PixelRange::Limited,
        },
        color_description: (!settings.is_alpha).then(|| color_description(&settings.cicp)),
        still_picture: true,
        speed_settings: SpeedSettings::from_preset(settings.speed.min(10)),
        quantizer: usize::from(max_q),
        min_quantizer: min_q,
        tile_cols: 1 << settings.tile_cols_log2,
        tile_rows: 1 << settings.tile_rows_log2,
        low_latency: true,
        ..Default::default()
    };
    debug!(
        "rav1e: {}x{} {}-bit {:?}, quantizer {}..={}, speed {}, tiles {}x{}, {} threads{}",
        enc.width,
        enc.height,
        enc.bit_depth,
        enc.chroma_sampling,
        min_q,
        max_q,
        settings.speed,
        enc.tile_cols,
        enc.tile_rows,
        settings.threads,
        if settings.is_alpha { " (alpha)" } else { "" }
    );
    Config::new()
        .with_encoder_config(enc)
        .with_threads(settings.threads.max(1))
}

fn encode_with<P: Pixel>(frame: &CodecFrame, config: &Config) -> Result<Av1Payload> {
    let mut ctx: Context<P> = config
        .new_context()
        .map_err(|e| Error::Encode(format!("rav1e context error: {e}")))?;

    let mut input = ctx.new_frame();
    let planes = [Some(&frame.y), frame.u.as_ref(), frame.v.as_ref()];
    for (plane, source) in input.planes.iter_mut().zip(planes) {
        let Some(source) = source else { continue };
        let stride = plane.cfg.stride;
        let dest = plane.data_origin_mut();
        for (y, row) in source.rows().enumerate() {
            let Some(dest_row) = dest.get_mut(y * stride..y * stride + row.len()) else {
                return Err(Error::Encode("rav1e frame plane smaller than input".into()));
            };
            for (d, &s) in dest_row.iter_mut().zip(row) {
                *d = P::cast_from(s);
            }
        }
    }

    ctx.send_frame(input)
        .map_err(|e| Error::Encode(format!("rav1e send_frame error: {e}")))?;
    ctx.flush();

    let mut data = Vec::new();
    loop {
        match ctx.receive_packet() {
            Ok(packet) => {
                trace!("rav1e packet {} of {} bytes", packet.input_frameno, packet.data.len());
                data.try_reserve(packet.data.len())?;
                data.extend_from_slice(&packet.data);
            }
            Err(EncoderStatus::LimitReached) => break,
            Err(EncoderStatus::Encoded) | Err(EncoderStatus::NeedMoreData) => {}
            Err(e) => return Err(Error::Encode(format!("rav1e encode error: {e:?}"))),
        }
    }
    if data.is_empty() {
        return Err(Error::Encode("rav1e produced no output".into()));
    }

    // 4 fixed av1C bytes, then the sequence header OBU
    let header = ctx.container_sequence_header();
    let fixed = header
        .get(..4)
        .ok_or(Error::Encode("rav1e sequence header too short".into()))?;
    Ok(Av1Payload {
        data,
        config: Av1Config::from_bytes(fixed)?,
    })
}

fn chroma_sampling(format: ChromaSampling) -> rav1e::prelude::ChromaSampling {
    use rav1e::prelude::ChromaSampling as R;
    match format {
        ChromaSampling::Cs420 => R::Cs420,
        ChromaSampling::Cs422 => R::Cs422,
        ChromaSampling::Cs444 => R::Cs444,
        ChromaSampling::Monochrome => R::Cs400,
    }
}

/// Codes rav1e has no variant for are signalled as unspecified
fn color_description(cicp: &Cicp) -> ColorDescription {
    let color_primaries = match cicp.color_primaries.0 {
        1 => ColorPrimaries::BT709,
        4 => ColorPrimaries::BT470M,
        5 => ColorPrimaries::BT470BG,
        6 => ColorPrimaries::BT601,
        7 => ColorPrimaries::SMPTE240,
        8 => ColorPrimaries::GenericFilm,
        9 => ColorPrimaries::BT2020,
        10 => ColorPrimaries::XYZ,
        11 => ColorPrimaries::SMPTE431,
        12 => ColorPrimaries::SMPTE432,
        22 => ColorPrimaries::EBU3213,
        _ => ColorPrimaries::Unspecified,
    };
    let transfer_characteristics = match cicp.transfer_characteristics.0 {
        1 => TransferCharacteristics::BT709,
        4 => TransferCharacteristics::BT470M,
        5 => TransferCharacteristics::BT470BG,
        6 => TransferCharacteristics::BT601,
        7 => TransferCharacteristics::SMPTE240,
        8 => TransferCharacteristics::Linear,
        9 => TransferCharacteristics::Log100,
        10 => TransferCharacteristics::Log100Sqrt10,
        11 => TransferCharacteristics::IEC61966,
        12 => TransferCharacteristics::BT1361,
        13 => TransferCharacteristics::SRGB,
        14 => TransferCharacteristics::BT2020_10Bit,
        15 => TransferCharacteristics::BT2020_12Bit,
        16 => TransferCharacteristics::SMPTE2084,
        17 => TransferCharacteristics::SMPTE428,
        18 => TransferCharacteristics::HLG,
        _ => TransferCharacteristics::Unspecified,
    };
    let matrix_coefficients = match cicp.matrix_coefficients.0 {
        0 => MatrixCoefficients::Identity,
        1 => MatrixCoefficients::BT709,
        4 => MatrixCoefficients::FCC,
        5 => MatrixCoefficients::BT470BG,
        6 => MatrixCoefficients::BT601,
        7 => MatrixCoefficients::SMPTE240,
        8 => MatrixCoefficients::YCgCo,
        9 => MatrixCoefficients::BT2020NCL,
        10 => MatrixCoefficients::BT2020CL,
        11 => MatrixCoefficients::SMPTE2085,
        12 => MatrixCoefficients::ChromatNCL,
        13 => MatrixCoefficients::ChromatCL,
        14 => MatrixCoefficients::ICtCp,
        _ => MatrixCoefficients::Unspecified,
    };
    ColorDescription {
        color_primaries,
        transfer_characteristics,
        matrix_coefficients,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ColorRange, MatrixCoefficients as Mc, TransferCharacteristics as Tc};

    fn settings() -> FrameSettings {
        FrameSettings {
            min_quantizer: 0,
            max_quantizer: 10,
            speed: 10,
            codec: CodecChoice::Auto,
            threads: 1,
            tile_cols_log2: 0,
            tile_rows_log2: 0,
            timescale: 1,
            cicp: Cicp::SRGB,
            is_alpha: false,
        }
    }

    #[test]
    fn quantizer_scale() {
        assert_eq!(quantizer_to_rav1e(0), 0);
        assert_eq!(quantizer_to_rav1e(63), 255);
        assert_eq!(quantizer_to_rav1e(200), 255);
        assert!(quantizer_to_rav1e(31) < quantizer_to_rav1e(32));
    }

    #[test]
    fn cicp_codes_map_to_rav1e() {
        let d = color_description(&Cicp {
            transfer_characteristics: Tc::HLG,
            matrix_coefficients: Mc::CHROMAT_NCL,
            ..Cicp::SRGB
        });
        assert_eq!(d.color_primaries, ColorPrimaries::BT709);
        assert_eq!(d.transfer_characteristics, TransferCharacteristics::HLG);
        assert_eq!(d.matrix_coefficients, MatrixCoefficients::ChromatNCL);
    }

    #[test]
    fn other_codecs_are_unsupported() {
        let frame = CodecFrame::new(8, 8, 8, ChromaSampling::Cs420, ColorRange::Full).unwrap();
        let mut s = settings();
        s.codec = CodecChoice::Aom;
        assert!(matches!(
            Rav1eEncoder.encode_frame(&frame, &s),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn encodes_small_frames() {
        for (depth, format) in [
            (8, ChromaSampling::Cs420),
            (10, ChromaSampling::Cs444),
            (8, ChromaSampling::Monochrome),
        ] {
            let frame = CodecFrame::new(16, 8, depth, format, ColorRange::Full).unwrap();
            let out = Rav1eEncoder.encode_frame(&frame, &settings()).unwrap();
            assert!(!out.data.is_empty());
            assert_eq!(out.config.depth(), depth);
            assert_eq!(out.config.format(), format);
        }
    }
}

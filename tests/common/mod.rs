//! Lossless stand-in for an AV1 codec
//!
//! The "bitstream" is a small header (depth, range, CICP triple, size)
//! followed by the planes as little-endian u16 samples, so round trips through the container and the
//! transcoder can be checked without a real encoder.

#![allow(dead_code)]

use imgref::ImgVec;
use zenavif_raster::{
    Av1Config, Av1Decoder, Av1Encoder, Av1Payload, ChromaSampling, Cicp, CodecFrame, ColorPrimaries,
    ColorRange, Error, FrameSettings, MatrixCoefficients, Result, TransferCharacteristics,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records the settings of every frame it encodes
#[derive(Debug, Default)]
pub struct RawCodec {
    pub encoded: Vec<FrameSettings>,
    pub decoded: usize,
}

impl Av1Encoder for RawCodec {
    fn encode_frame(&mut self, frame: &CodecFrame, settings: &FrameSettings) -> Result<Av1Payload> {
        self.encoded.push(settings.clone());
        let cicp = &settings.cicp;
        let mut data = vec![
            frame.depth,
            u8::from(frame.range.is_full()),
            cicp.color_primaries.0,
            cicp.transfer_characteristics.0,
            cicp.matrix_coefficients.0,
        ];
        data.extend_from_slice(&(frame.width() as u32).to_le_bytes());
        data.extend_from_slice(&(frame.height() as u32).to_le_bytes());
        for plane in [Some(&frame.y), frame.u.as_ref(), frame.v.as_ref()].into_iter().flatten() {
            for row in plane.rows() {
                for &sample in row {
                    data.extend_from_slice(&sample.to_le_bytes());
                }
            }
        }
        Ok(Av1Payload {
            data,
            config: Av1Config::for_frame(frame.depth, frame.format),
        })
    }
}

impl Av1Decoder for RawCodec {
    fn decode_frame(&mut self, data: &[u8], config: &Av1Config) -> Result<CodecFrame> {
        self.decoded += 1;
        let [depth, full, cp, tc, mc, w0, w1, w2, w3, h0, h1, h2, h3, samples @ ..] = data else {
            return Err(Error::Decode("raw frame header truncated".into()));
        };
        let width = u32::from_le_bytes([*w0, *w1, *w2, *w3]) as usize;
        let height = u32::from_le_bytes([*h0, *h1, *h2, *h3]) as usize;
        let range = if *full == 1 { ColorRange::Full } else { ColorRange::Limited };
        let mut frame = CodecFrame::new(width, height, *depth, config.format(), range)?;
        frame.cicp = Some(Cicp {
            color_primaries: ColorPrimaries(*cp),
            transfer_characteristics: TransferCharacteristics(*tc),
            matrix_coefficients: MatrixCoefficients(*mc),
            full_range: *full == 1,
        });
        let mut samples = samples
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]));
        let planes = [Some(&mut frame.y), frame.u.as_mut(), frame.v.as_mut()];
        for plane in planes.into_iter().flatten() {
            for sample in plane.buf_mut().iter_mut() {
                *sample = samples
                    .next()
                    .ok_or_else(|| Error::Decode("raw frame samples truncated".into()))?;
            }
        }
        Ok(frame)
    }
}

/// A frame filled with one value per plane
pub fn flat_frame(width: usize, height: usize, depth: u8, format: ChromaSampling, values: [u16; 3]) -> CodecFrame {
    let mut frame = CodecFrame::new(width, height, depth, format, ColorRange::Full).unwrap();
    frame.y = ImgVec::new(vec![values[0]; width * height], width, height);
    if let (Some(u), Some(v)) = (frame.u.as_mut(), frame.v.as_mut()) {
        u.buf_mut().fill(values[1]);
        v.buf_mut().fill(values[2]);
    }
    frame
}

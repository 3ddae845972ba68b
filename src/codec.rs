//! AV1 codec collaborator seam and the planar frames exchanged with it
//!
//! The bitstream itself is produced and consumed by an external codec.
//! This module defines what crosses that boundary: planar YUV or
//! monochrome frames at 8, 10 or 12 bits, the `av1C` configuration record,
//! and the per-frame encoder settings.

use crate::error::{Error, Result};
use crate::image::{ChromaSampling, Cicp, ColorRange};
use imgref::ImgVec;

/// One planar image as the codec sees it.
///
/// Samples are stored in `u16` whatever the depth; only the low `depth`
/// bits are meaningful. Chroma planes are absent for monochrome frames.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecFrame {
    pub depth: u8,
    pub format: ChromaSampling,
    pub range: ColorRange,
    /// Color description from the sequence header, when the decoder
    /// reports one. Used when the container has no `colr nclx`.
    pub cicp: Option<Cicp>,
    pub y: ImgVec<u16>,
    pub u: Option<ImgVec<u16>>,
    pub v: Option<ImgVec<u16>>,
}

impl CodecFrame {
    /// Allocate a zeroed frame with correctly sized planes
    pub fn new(
        width: usize,
        height: usize,
        depth: u8,
        format: ChromaSampling,
        range: ColorRange,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput("frame dimensions must be non-zero"));
        }
        if !matches!(depth, 8 | 10 | 12) {
            return Err(Error::InvalidInput("codec bit depth must be 8, 10 or 12"));
        }
        let y = zeroed_plane(width, height)?;
        let (u, v) = if format.is_monochrome() {
            (None, None)
        } else {
            let (cw, ch) = format.chroma_size(width, height);
            (Some(zeroed_plane(cw, ch)?), Some(zeroed_plane(cw, ch)?))
        };
        Ok(Self {
            depth,
            format,
            range,
            cicp: None,
            y,
            u,
            v,
        })
    }

    pub fn width(&self) -> usize {
        self.y.width()
    }

    pub fn height(&self) -> usize {
        self.y.height()
    }

    /// Largest sample value at this frame's depth
    pub fn max_value(&self) -> u16 {
        crate::convert::max_value(self.depth) as u16
    }

    /// Check that planes agree with the declared format
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.depth, 8 | 10 | 12) {
            return Err(Error::Decode(format!("unsupported codec depth {}", self.depth)));
        }
        if self.format.is_monochrome() {
            return Ok(());
        }
        let expected = self.format.chroma_size(self.width(), self.height());
        for plane in [&self.u, &self.v] {
            match plane {
                Some(p) if (p.width(), p.height()) == expected => {}
                Some(_) => return Err(Error::Decode("chroma plane size does not match format".into())),
                None => return Err(Error::Decode("missing chroma plane".into())),
            }
        }
        Ok(())
    }
}

fn zeroed_plane(width: usize, height: usize) -> Result<ImgVec<u16>> {
    let len = width
        .checked_mul(height)
        .ok_or(Error::InvalidInput("frame dimensions overflow"))?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, 0);
    Ok(ImgVec::new(buf, width, height))
}

/// The fixed fields of an AV1 codec configuration record (`av1C`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Av1Config {
    pub seq_profile: u8,
    pub seq_level_idx_0: u8,
    pub seq_tier_0: bool,
    pub high_bitdepth: bool,
    pub twelve_bit: bool,
    pub monochrome: bool,
    pub chroma_subsampling_x: bool,
    pub chroma_subsampling_y: bool,
    pub chroma_sample_position: u8,
}

impl Av1Config {
    /// Configuration describing a frame of the given depth and format
    pub fn for_frame(depth: u8, format: ChromaSampling) -> Self {
        let (sx, sy) = format.shifts();
        let monochrome = format.is_monochrome();
        let seq_profile = match format {
            ChromaSampling::Cs444 => 1,
            ChromaSampling::Cs422 => 2,
            _ if depth == 12 => 2,
            _ => 0,
        };
        Self {
            seq_profile,
            seq_level_idx_0: 31,
            seq_tier_0: false,
            high_bitdepth: depth > 8,
            twelve_bit: depth == 12,
            monochrome,
            chroma_subsampling_x: monochrome || sx == 1,
            chroma_subsampling_y: monochrome || sy == 1,
            chroma_sample_position: 0,
        }
    }

    pub fn depth(&self) -> u8 {
        match (self.high_bitdepth, self.twelve_bit) {
            (true, true) => 12,
            (true, false) => 10,
            _ => 8,
        }
    }

    pub fn format(&self) -> ChromaSampling {
        if self.monochrome {
            return ChromaSampling::Monochrome;
        }
        match (self.chroma_subsampling_x, self.chroma_subsampling_y) {
            (true, true) => ChromaSampling::Cs420,
            (true, false) => ChromaSampling::Cs422,
            _ => ChromaSampling::Cs444,
        }
    }

    /// The four fixed bytes of the record
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            0x81,
            (self.seq_profile << 5) | (self.seq_level_idx_0 & 0x1F),
            (u8::from(self.seq_tier_0) << 7)
                | (u8::from(self.high_bitdepth) << 6)
                | (u8::from(self.twelve_bit) << 5)
                | (u8::from(self.monochrome) << 4)
                | (u8::from(self.chroma_subsampling_x) << 3)
                | (u8::from(self.chroma_subsampling_y) << 2)
                | (self.chroma_sample_position & 0x03),
            0,
        ]
    }

    /// Parse the fixed bytes of a record
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let [b0, b1, b2, ..] = *bytes else {
            return Err(Error::Parse("truncated av1C"));
        };
        if b0 & 0x80 == 0 || b0 & 0x7F != 1 {
            return Err(Error::Parse("invalid av1C marker or version"));
        }
        Ok(Self {
            seq_profile: b1 >> 5,
            seq_level_idx_0: b1 & 0x1F,
            seq_tier_0: b2 & 0x80 != 0,
            high_bitdepth: b2 & 0x40 != 0,
            twelve_bit: b2 & 0x20 != 0,
            monochrome: b2 & 0x10 != 0,
            chroma_subsampling_x: b2 & 0x08 != 0,
            chroma_subsampling_y: b2 & 0x04 != 0,
            chroma_sample_position: b2 & 0x03,
        })
    }
}

/// Compressed output for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Av1Payload {
    /// AV1 OBUs for the frame
    pub data: Vec<u8>,
    pub config: Av1Config,
}

/// Which AV1 encoder the caller would like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecChoice {
    /// Whatever encoder is available
    #[default]
    Auto,
    Rav1e,
    Aom,
    Svt,
}

/// Encoder settings for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSettings {
    /// Quantizer range on the 0..=63 scale
    pub min_quantizer: u8,
    pub max_quantizer: u8,
    /// 0 (slowest) to 10 (fastest)
    pub speed: u8,
    pub codec: CodecChoice,
    pub threads: usize,
    pub tile_cols_log2: u32,
    pub tile_rows_log2: u32,
    /// Ticks per second; stills use 1
    pub timescale: u64,
    /// Signalled in the sequence header
    pub cicp: Cicp,
    /// The frame is an alpha auxiliary image
    pub is_alpha: bool,
}

/// An AV1 encoder
pub trait Av1Encoder {
    fn encode_frame(&mut self, frame: &CodecFrame, settings: &FrameSettings) -> Result<Av1Payload>;
}

/// An AV1 decoder
///
/// Decoders should fill [`CodecFrame::cicp`] from the sequence header's
/// color description; files saved with an embedded ICC profile, or with
/// code points the `colr` box cannot carry, rely on it.
pub trait Av1Decoder {
    fn decode_frame(&mut self, data: &[u8], config: &Av1Config) -> Result<CodecFrame>;
}

impl<T: Av1Encoder + ?Sized> Av1Encoder for &mut T {
    fn encode_frame(&mut self, frame: &CodecFrame, settings: &FrameSettings) -> Result<Av1Payload> {
        (**self).encode_frame(frame, settings)
    }
}

impl<T: Av1Decoder + ?Sized> Av1Decoder for &mut T {
    fn decode_frame(&mut self, data: &[u8], config: &Av1Config) -> Result<CodecFrame> {
        (**self).decode_frame(data, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_sized_by_format() {
        let f = CodecFrame::new(5, 3, 10, ChromaSampling::Cs420, ColorRange::Full).unwrap();
        assert_eq!(f.u.as_ref().map(|p| (p.width(), p.height())), Some((3, 2)));
        assert_eq!(f.max_value(), 1023);
        f.validate().unwrap();

        let m = CodecFrame::new(5, 3, 8, ChromaSampling::Monochrome, ColorRange::Full).unwrap();
        assert!(m.u.is_none() && m.v.is_none());
    }

    #[test]
    fn rejects_bad_depth_and_size() {
        assert!(CodecFrame::new(0, 1, 8, ChromaSampling::Cs444, ColorRange::Full).is_err());
        assert!(CodecFrame::new(1, 1, 9, ChromaSampling::Cs444, ColorRange::Full).is_err());
    }

    #[test]
    fn av1c_bytes() {
        let config = Av1Config::for_frame(10, ChromaSampling::Cs420);
        assert_eq!(config.to_bytes(), [0x81, 0x1F, 0x4C, 0x00]);

        let mono = Av1Config::from_bytes(&Av1Config::for_frame(12, ChromaSampling::Monochrome).to_bytes()).unwrap();
        assert_eq!(mono.depth(), 12);
        assert_eq!(mono.format(), ChromaSampling::Monochrome);
        assert_eq!(mono.seq_profile, 2);

        assert!(Av1Config::from_bytes(&[0x01, 0, 0, 0]).is_err());
        assert!(Av1Config::from_bytes(&[0x81]).is_err());
    }
}

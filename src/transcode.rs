//! Packed host rasters <-> planar codec frames
//!
//! Every (alpha, gray, depth class) combination has one entry in a fixed
//! strategy table. Gray and alpha samples are copied by hand with range
//! expansion and depth rescaling; RGB goes through [`crate::yuv_convert`].
//!
//! Host 8-bit pairs with codec 8-bit and host 16-bit with codec 10/12-bit.
//! Callers adapt the host depth first with [`adapt_host_depth`].

use crate::codec::CodecFrame;
use crate::convert::{codec_to_host16, host16_to_codec, luma, narrow16, to_full_range, widen8};
use crate::error::{Error, Result};
use crate::image::{ChromaSampling, ColorRange};
use crate::raster::{ChannelLayout, RasterBuffer};
use crate::yuv_convert::{YuvMatrix, rgb_to_yuv, yuv_to_rgb};
use imgref::ImgVec;
use rgb::{GrayA, Rgb, Rgba};

/// What the decoder produced for one image
#[derive(Debug, Clone, Copy)]
pub struct DecodeInput<'a> {
    pub color: &'a CodecFrame,
    pub alpha: Option<&'a CodecFrame>,
    pub matrix: YuvMatrix,
}

/// Codec-side shape requested for an encode
#[derive(Debug, Clone, Copy)]
pub struct EncodeTarget {
    pub depth: u8,
    pub format: ChromaSampling,
    pub matrix: YuvMatrix,
}

/// Planar output of an encode-side transcode
#[derive(Debug, Clone)]
pub struct EncodedPlanes {
    pub color: CodecFrame,
    pub alpha: Option<CodecFrame>,
}

/// One row of the dispatch table
pub struct Strategy {
    pub layout: ChannelLayout,
    /// Host 16-bit / codec 10 or 12-bit
    pub wide: bool,
    decode: fn(&DecodeInput<'_>) -> Result<RasterBuffer>,
    encode: fn(&RasterBuffer, &EncodeTarget) -> Result<EncodedPlanes>,
}

impl core::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Strategy")
            .field("layout", &self.layout)
            .field("wide", &self.wide)
            .finish_non_exhaustive()
    }
}

impl Strategy {
    pub fn decode(&self, input: &DecodeInput<'_>) -> Result<RasterBuffer> {
        let depth = input.color.depth;
        if (depth > 8) != self.wide {
            return Err(Error::InvalidInput("codec depth does not match strategy"));
        }
        if self.layout.has_alpha() && input.alpha.is_none() {
            return Err(Error::InvalidInput("alpha plane missing"));
        }
        (self.decode)(input)
    }

    pub fn encode(&self, raster: &RasterBuffer, target: &EncodeTarget) -> Result<EncodedPlanes> {
        if raster.layout() != self.layout || (raster.bit_depth() == 16) != self.wide {
            return Err(Error::InvalidInput("raster does not match strategy"));
        }
        if (target.depth > 8) != self.wide {
            return Err(Error::InvalidInput("host depth does not match codec depth"));
        }
        (self.encode)(raster, target)
    }
}

fn mismatch() -> Error {
    Error::InvalidInput("raster does not match strategy")
}

/// Indexed by `alpha << 2 | gray << 1 | wide`
static STRATEGIES: [Strategy; 8] = [
    Strategy {
        layout: ChannelLayout::Rgb,
        wide: false,
        decode: |i| Ok(RasterBuffer::Rgb8(decode_rgb::<u8>(i)?)),
        encode: |r, t| match r {
            RasterBuffer::Rgb8(img) => encode_rgb(img, t),
            _ => Err(mismatch()),
        },
    },
    Strategy {
        layout: ChannelLayout::Rgb,
        wide: true,
        decode: |i| Ok(RasterBuffer::Rgb16(decode_rgb::<u16>(i)?)),
        encode: |r, t| match r {
            RasterBuffer::Rgb16(img) => encode_rgb(img, t),
            _ => Err(mismatch()),
        },
    },
    Strategy {
        layout: ChannelLayout::Gray,
        wide: false,
        decode: |i| Ok(RasterBuffer::Gray8(decode_gray::<u8>(i.color)?)),
        encode: |r, t| match r {
            RasterBuffer::Gray8(img) => encode_gray(img, t),
            _ => Err(mismatch()),
        },
    },
    Strategy {
        layout: ChannelLayout::Gray,
        wide: true,
        decode: |i| Ok(RasterBuffer::Gray16(decode_gray::<u16>(i.color)?)),
        encode: |r, t| match r {
            RasterBuffer::Gray16(img) => encode_gray(img, t),
            _ => Err(mismatch()),
        },
    },
    Strategy {
        layout: ChannelLayout::Rgba,
        wide: false,
        decode: |i| Ok(RasterBuffer::Rgba8(decode_rgba::<u8>(i)?)),
        encode: |r, t| match r {
            RasterBuffer::Rgba8(img) => encode_rgba(img, t),
            _ => Err(mismatch()),
        },
    },
    Strategy {
        layout: ChannelLayout::Rgba,
        wide: true,
        decode: |i| Ok(RasterBuffer::Rgba16(decode_rgba::<u16>(i)?)),
        encode: |r, t| match r {
            RasterBuffer::Rgba16(img) => encode_rgba(img, t),
            _ => Err(mismatch()),
        },
    },
    Strategy {
        layout: ChannelLayout::GrayAlpha,
        wide: false,
        decode: |i| Ok(RasterBuffer::GrayA8(decode_gray_alpha::<u8>(i)?)),
        encode: |r, t| match r {
            RasterBuffer::GrayA8(img) => encode_gray_alpha(img, t),
            _ => Err(mismatch()),
        },
    },
    Strategy {
        layout: ChannelLayout::GrayAlpha,
        wide: true,
        decode: |i| Ok(RasterBuffer::GrayA16(decode_gray_alpha::<u16>(i)?)),
        encode: |r, t| match r {
            RasterBuffer::GrayA16(img) => encode_gray_alpha(img, t),
            _ => Err(mismatch()),
        },
    },
];

/// Pick the strategy for a layout and depth class
pub fn select(has_alpha: bool, gray: bool, wide: bool) -> &'static Strategy {
    let index = (usize::from(has_alpha) << 2) | (usize::from(gray) << 1) | usize::from(wide);
    &STRATEGIES[index]
}

/// Strategy for an existing host raster
pub fn select_for(raster: &RasterBuffer) -> &'static Strategy {
    select(raster.has_alpha(), raster.is_grayscale(), raster.bit_depth() == 16)
}

/// Host sample type: `u8` for 8-bit codecs, `u16` for 10/12-bit
trait HostSample: Copy + Default + 'static {
    const MAX: f32;
    /// Full-range codec sample to host
    fn from_codec(value: u16, depth: u8) -> Self;
    fn to_codec(self, depth: u8) -> u16;
    fn from_unit(value: f32) -> Self;
    fn to_unit(self) -> f32;
}

impl HostSample for u8 {
    const MAX: f32 = 255.0;

    fn from_codec(value: u16, _depth: u8) -> Self {
        value.min(255) as u8
    }

    fn to_codec(self, _depth: u8) -> u16 {
        u16::from(self)
    }

    fn from_unit(value: f32) -> Self {
        (value * <Self as HostSample>::MAX + 0.5) as u8
    }

    fn to_unit(self) -> f32 {
        f32::from(self) / <Self as HostSample>::MAX
    }
}

impl HostSample for u16 {
    const MAX: f32 = 65535.0;

    fn from_codec(value: u16, depth: u8) -> Self {
        codec_to_host16(value, depth)
    }

    fn to_codec(self, depth: u8) -> u16 {
        host16_to_codec(self, depth)
    }

    fn from_unit(value: f32) -> Self {
        (value * <Self as HostSample>::MAX + 0.5) as u16
    }

    fn to_unit(self) -> f32 {
        f32::from(self) / <Self as HostSample>::MAX
    }
}

/// Luma plane of a frame as host samples, ignoring any chroma
fn decode_gray<S: HostSample>(frame: &CodecFrame) -> Result<ImgVec<S>> {
    plane_to_host(frame)
}

fn plane_to_host<S: HostSample>(frame: &CodecFrame) -> Result<ImgVec<S>> {
    let (width, height) = (frame.width(), frame.height());
    let mut out = Vec::new();
    out.try_reserve_exact(width * height)?;
    for row in frame.y.rows() {
        for &v in row {
            let full = to_full_range(frame.depth, v, frame.range);
            out.push(S::from_codec(full, frame.depth));
        }
    }
    Ok(ImgVec::new(out, width, height))
}

fn alpha_plane<S: HostSample>(input: &DecodeInput<'_>) -> Result<ImgVec<S>> {
    let alpha = input.alpha.ok_or(Error::InvalidInput("alpha plane missing"))?;
    if (alpha.width(), alpha.height()) != (input.color.width(), input.color.height()) {
        return Err(Error::Decode("alpha plane size does not match image".into()));
    }
    // Alpha keeps its own depth and range
    plane_to_host(alpha)
}

fn decode_gray_alpha<S: HostSample>(input: &DecodeInput<'_>) -> Result<ImgVec<GrayA<S>>> {
    let gray = plane_to_host::<S>(input.color)?;
    let alpha = alpha_plane::<S>(input)?;
    let (width, height) = (gray.width(), gray.height());
    let buf = gray
        .into_buf()
        .into_iter()
        .zip(alpha.into_buf())
        .map(|(v, a)| GrayA { v, a })
        .collect();
    Ok(ImgVec::new(buf, width, height))
}

fn decode_rgb<S: HostSample>(input: &DecodeInput<'_>) -> Result<ImgVec<Rgb<S>>> {
    let rgb = yuv_to_rgb(input.color, input.matrix)?;
    let (width, height) = (rgb.width(), rgb.height());
    let buf = rgb
        .into_buf()
        .into_iter()
        .map(|[r, g, b]| Rgb {
            r: S::from_unit(r),
            g: S::from_unit(g),
            b: S::from_unit(b),
        })
        .collect();
    Ok(ImgVec::new(buf, width, height))
}

fn decode_rgba<S: HostSample>(input: &DecodeInput<'_>) -> Result<ImgVec<Rgba<S>>> {
    let rgb = decode_rgb::<S>(input)?;
    let alpha = alpha_plane::<S>(input)?;
    let (width, height) = (rgb.width(), rgb.height());
    let buf = rgb
        .into_buf()
        .into_iter()
        .zip(alpha.into_buf())
        .map(|(px, a)| Rgba {
            r: px.r,
            g: px.g,
            b: px.b,
            a,
        })
        .collect();
    Ok(ImgVec::new(buf, width, height))
}

/// A full-range monochrome frame filled from `sample(x, y)`
fn mono_frame(
    width: usize,
    height: usize,
    depth: u8,
    sample: impl Fn(usize, usize) -> u16,
) -> Result<CodecFrame> {
    let mut frame = CodecFrame::new(width, height, depth, ChromaSampling::Monochrome, ColorRange::Full)?;
    for y in 0..height {
        for x in 0..width {
            frame.y[(x, y)] = sample(x, y);
        }
    }
    Ok(frame)
}

fn encode_gray<S: HostSample>(img: &ImgVec<S>, t: &EncodeTarget) -> Result<EncodedPlanes> {
    let color = mono_frame(img.width(), img.height(), t.depth, |x, y| img[(x, y)].to_codec(t.depth))?;
    Ok(EncodedPlanes { color, alpha: None })
}

fn encode_gray_alpha<S: HostSample>(img: &ImgVec<GrayA<S>>, t: &EncodeTarget) -> Result<EncodedPlanes> {
    let (w, h) = (img.width(), img.height());
    let color = mono_frame(w, h, t.depth, |x, y| img[(x, y)].v.to_codec(t.depth))?;
    let alpha = mono_frame(w, h, t.depth, |x, y| img[(x, y)].a.to_codec(t.depth))?;
    Ok(EncodedPlanes {
        color,
        alpha: Some(alpha),
    })
}

fn encode_rgb<S: HostSample>(img: &ImgVec<Rgb<S>>, t: &EncodeTarget) -> Result<EncodedPlanes> {
    let color = rgb_to_yuv(img.width(), img.height(), t.depth, t.format, t.matrix, |x, y| {
        let px = img[(x, y)];
        [px.r.to_unit(), px.g.to_unit(), px.b.to_unit()]
    })?;
    Ok(EncodedPlanes { color, alpha: None })
}

fn encode_rgba<S: HostSample>(img: &ImgVec<Rgba<S>>, t: &EncodeTarget) -> Result<EncodedPlanes> {
    let (w, h) = (img.width(), img.height());
    let color = rgb_to_yuv(w, h, t.depth, t.format, t.matrix, |x, y| {
        let px = img[(x, y)];
        [px.r.to_unit(), px.g.to_unit(), px.b.to_unit()]
    })?;
    let alpha = mono_frame(w, h, t.depth, |x, y| img[(x, y)].a.to_codec(t.depth))?;
    Ok(EncodedPlanes {
        color,
        alpha: Some(alpha),
    })
}

/// Rescale a raster to the host depth class of a codec depth.
///
/// 8-bit codecs take 8-bit rasters, 10/12-bit codecs take 16-bit ones.
pub fn adapt_host_depth(raster: RasterBuffer, codec_depth: u8) -> RasterBuffer {
    let want_wide = codec_depth > 8;
    if (raster.bit_depth() == 16) == want_wide {
        return raster;
    }
    fn map<A: Copy, B>(img: &ImgVec<A>, f: impl Fn(A) -> B) -> ImgVec<B> {
        let buf = img.rows().flat_map(|row| row.iter().map(|&p| f(p))).collect();
        ImgVec::new(buf, img.width(), img.height())
    }
    match &raster {
        RasterBuffer::Gray8(img) => RasterBuffer::Gray16(map(img, widen8)),
        RasterBuffer::GrayA8(img) => RasterBuffer::GrayA16(map(img, |p| GrayA {
            v: widen8(p.v),
            a: widen8(p.a),
        })),
        RasterBuffer::Rgb8(img) => RasterBuffer::Rgb16(map(img, |p| Rgb {
            r: widen8(p.r),
            g: widen8(p.g),
            b: widen8(p.b),
        })),
        RasterBuffer::Rgba8(img) => RasterBuffer::Rgba16(map(img, |p| Rgba {
            r: widen8(p.r),
            g: widen8(p.g),
            b: widen8(p.b),
            a: widen8(p.a),
        })),
        RasterBuffer::Gray16(img) => RasterBuffer::Gray8(map(img, narrow16)),
        RasterBuffer::GrayA16(img) => RasterBuffer::GrayA8(map(img, |p| GrayA {
            v: narrow16(p.v),
            a: narrow16(p.a),
        })),
        RasterBuffer::Rgb16(img) => RasterBuffer::Rgb8(map(img, |p| Rgb {
            r: narrow16(p.r),
            g: narrow16(p.g),
            b: narrow16(p.b),
        })),
        RasterBuffer::Rgba16(img) => RasterBuffer::Rgba8(map(img, |p| Rgba {
            r: narrow16(p.r),
            g: narrow16(p.g),
            b: narrow16(p.b),
            a: narrow16(p.a),
        })),
    }
}

/// Reduce an RGB(A) raster to gray(+alpha) with Rec.709 luma weights.
/// Gray rasters are returned as is.
pub fn to_grayscale(raster: RasterBuffer) -> RasterBuffer {
    fn map<A: Copy, B>(img: &ImgVec<A>, f: impl Fn(A) -> B) -> ImgVec<B> {
        let buf = img.rows().flat_map(|row| row.iter().map(|&p| f(p))).collect();
        ImgVec::new(buf, img.width(), img.height())
    }
    let y8 = |r: u8, g: u8, b: u8| (luma(r.into(), g.into(), b.into()) + 0.5).min(255.0) as u8;
    let y16 = |r: u16, g: u16, b: u16| (luma(r.into(), g.into(), b.into()) + 0.5).min(65535.0) as u16;
    match &raster {
        RasterBuffer::Rgb8(img) => RasterBuffer::Gray8(map(img, |p| y8(p.r, p.g, p.b))),
        RasterBuffer::Rgba8(img) => RasterBuffer::GrayA8(map(img, |p| GrayA {
            v: y8(p.r, p.g, p.b),
            a: p.a,
        })),
        RasterBuffer::Rgb16(img) => RasterBuffer::Gray16(map(img, |p| y16(p.r, p.g, p.b))),
        RasterBuffer::Rgba16(img) => RasterBuffer::GrayA16(map(img, |p| GrayA {
            v: y16(p.r, p.g, p.b),
            a: p.a,
        })),
        _ => raster,
    }
}

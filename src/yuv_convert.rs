//! YUV <-> RGB color space conversion
//!
//! Scalar conversions between planar codec frames and normalized RGB,
//! for any of the supported depths (8/10/12), chroma layouts, ranges and
//! matrices (identity, fixed Kr/Kb pairs, or pairs derived from the
//! primaries' chromaticities as in ITU-T H.273).

use crate::codec::CodecFrame;
use crate::error::{Error, Result};
use crate::image::{ChromaSampling, ColorPrimaries, ColorRange, MatrixCoefficients};
use crate::primaries;
use imgref::ImgVec;

/// How YUV relates to RGB for one image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YuvMatrix {
    /// Planes carry G, B, R directly
    Identity,
    /// Luma weights for R and B; G's weight is `1 - kr - kb`
    Ycbcr { kr: f32, kb: f32 },
}

impl YuvMatrix {
    /// Kr/Kb of BT.601 and BT.470BG
    pub const BT601: Self = Self::Ycbcr { kr: 0.299, kb: 0.114 };
    pub const BT709: Self = Self::Ycbcr { kr: 0.2126, kb: 0.0722 };
    /// Non-constant luminance BT.2020
    pub const BT2020: Self = Self::Ycbcr { kr: 0.2627, kb: 0.0593 };

    /// Matrix for CICP matrix coefficients.
    ///
    /// The chromaticity-derived matrices need the primaries. Unspecified
    /// coefficients use BT.601.
    pub fn from_cicp(mc: MatrixCoefficients, primaries: ColorPrimaries) -> Result<Self> {
        Ok(match mc {
            MatrixCoefficients::IDENTITY => YuvMatrix::Identity,
            MatrixCoefficients::BT709 => Self::BT709,
            MatrixCoefficients::FCC => Self::Ycbcr { kr: 0.30, kb: 0.11 },
            MatrixCoefficients::UNSPECIFIED
            | MatrixCoefficients::BT470BG
            | MatrixCoefficients::BT601 => Self::BT601,
            MatrixCoefficients::SMPTE240 => Self::Ycbcr { kr: 0.212, kb: 0.087 },
            MatrixCoefficients::BT2020_NCL | MatrixCoefficients::BT2020_CL => Self::BT2020,
            MatrixCoefficients::CHROMAT_NCL | MatrixCoefficients::CHROMAT_CL => {
                let (kr, kb) = primaries::values(primaries).luma_coefficients();
                Self::Ycbcr { kr, kb }
            }
            _ => return Err(Error::Unsupported("matrix coefficients")),
        })
    }

    fn kr_kb(self) -> (f32, f32) {
        match self {
            YuvMatrix::Identity => (0.0, 0.0),
            YuvMatrix::Ycbcr { kr, kb } => (kr, kb),
        }
    }
}

/// Normalization of one depth/range combination.
///
/// Maps code values to `y in [0, 1]` and `u, v in [-0.5, 0.5]`.
#[derive(Debug, Clone, Copy)]
struct Levels {
    y_offset: f32,
    y_scale: f32,
    uv_center: f32,
    uv_scale: f32,
    max: f32,
}

impl Levels {
    fn new(depth: u8, range: ColorRange) -> Self {
        let shift = f32::from(1u16 << (depth - 8));
        let max = crate::convert::max_value(depth) as f32;
        let uv_center = f32::from(1u16 << (depth - 1));
        match range {
            // Full range: Y, U, V are all in [0..max]
            ColorRange::Full => Self {
                y_offset: 0.0,
                y_scale: max,
                uv_center,
                uv_scale: max,
                max,
            },
            // Limited range: Y in [16..235], UV in [16..240], scaled by depth
            ColorRange::Limited => Self {
                y_offset: 16.0 * shift,
                y_scale: 219.0 * shift,
                uv_center,
                uv_scale: 224.0 * shift,
                max,
            },
        }
    }
}

/// Convert a codec frame to normalized RGB (`[0, 1]` per channel, clamped).
///
/// Subsampled chroma is upsampled bilinearly with centered sample siting.
/// Monochrome frames produce R = G = B.
pub fn yuv_to_rgb(frame: &CodecFrame, matrix: YuvMatrix) -> Result<ImgVec<[f32; 3]>> {
    frame.validate()?;
    let width = frame.width();
    let height = frame.height();
    let levels = Levels::new(frame.depth, frame.range);
    let (kr, kb) = matrix.kr_kb();
    let kg = 1.0 - kr - kb;

    // Chroma weights of R, G and B, from Kr and Kb
    let vr = 2.0 * (1.0 - kr);
    let ug = -2.0 * kb * (1.0 - kb) / kg;
    let vg = -2.0 * kr * (1.0 - kr) / kg;
    let ub = 2.0 * (1.0 - kb);

    let mut out = Vec::new();
    out.try_reserve_exact(width * height)?;

    let chroma = match (&frame.u, &frame.v) {
        (Some(u), Some(v)) => Some(ChromaSampler::new(u, v, frame.format)),
        _ => None,
    };

    for y in 0..height {
        for x in 0..width {
            let luma = f32::from(frame.y[(x, y)]);
            let (u, v) = chroma.as_ref().map_or((levels.uv_center, levels.uv_center), |c| c.sample(x, y));

            let rgb = match matrix {
                YuvMatrix::Identity => {
                    // Identity stores G in Y, B in U, R in V
                    let n = |s: f32| (s - levels.y_offset) / levels.y_scale;
                    if chroma.is_none() {
                        let g = n(luma);
                        [g, g, g]
                    } else {
                        [n(v), n(luma), n(u)]
                    }
                }
                YuvMatrix::Ycbcr { .. } => {
                    let y_norm = (luma - levels.y_offset) / levels.y_scale;
                    let u_norm = (u - levels.uv_center) / levels.uv_scale;
                    let v_norm = (v - levels.uv_center) / levels.uv_scale;
                    // R = Y + Vr * V, G = Y + Ug * U + Vg * V, B = Y + Ub * U
                    [
                        y_norm + vr * v_norm,
                        y_norm + ug * u_norm + vg * v_norm,
                        y_norm + ub * u_norm,
                    ]
                }
            };
            out.push(rgb.map(|c| c.clamp(0.0, 1.0)));
        }
    }
    Ok(ImgVec::new(out, width, height))
}

/// Bilinear chroma lookup at luma coordinates
struct ChromaSampler<'a> {
    u: &'a ImgVec<u16>,
    v: &'a ImgVec<u16>,
    shift_x: u32,
    shift_y: u32,
}

impl<'a> ChromaSampler<'a> {
    fn new(u: &'a ImgVec<u16>, v: &'a ImgVec<u16>, format: ChromaSampling) -> Self {
        let (shift_x, shift_y) = format.shifts();
        Self {
            u,
            v,
            shift_x,
            shift_y,
        }
    }

    /// Map a luma position to chroma space and split into two taps and a weight
    fn taps(pos: usize, shift: u32, size: usize) -> (usize, usize, f32) {
        if shift == 0 {
            return (pos, pos, 0.0);
        }
        // Chroma samples sit between pairs of luma samples
        let raw = (pos as f32 + 0.5) * 0.5 - 0.5;
        // Edge samples replicate
        let c = raw.max(0.0).min(size as f32 - 1.0);
        let c0 = c.floor() as usize;
        let c1 = (c0 + 1).min(size - 1);
        (c0, c1, c - c0 as f32)
    }

    fn sample(&self, x: usize, y: usize) -> (f32, f32) {
        let (cx0, cx1, fx) = Self::taps(x, self.shift_x, self.u.width());
        let (cy0, cy1, fy) = Self::taps(y, self.shift_y, self.u.height());
        let fx1 = 1.0 - fx;
        let fy1 = 1.0 - fy;
        let bilinear = |p: &ImgVec<u16>| {
            let p00 = f32::from(p[(cx0, cy0)]);
            let p01 = f32::from(p[(cx1, cy0)]);
            let p10 = f32::from(p[(cx0, cy1)]);
            let p11 = f32::from(p[(cx1, cy1)]);
            p00 * fx1 * fy1 + p01 * fx * fy1 + p10 * fx1 * fy + p11 * fx * fy
        };
        (bilinear(self.u), bilinear(self.v))
    }
}

/// Convert normalized RGB to a full-range codec frame.
///
/// `rgb(x, y)` returns the pixel as `[r, g, b]` in `[0, 1]`. Subsampled
/// chroma is the mean of the covered pixels.
pub fn rgb_to_yuv(
    width: usize,
    height: usize,
    depth: u8,
    format: ChromaSampling,
    matrix: YuvMatrix,
    rgb: impl Fn(usize, usize) -> [f32; 3],
) -> Result<CodecFrame> {
    if matrix == YuvMatrix::Identity && !matches!(format, ChromaSampling::Cs444) {
        return Err(Error::InvalidInput("identity matrix requires 4:4:4"));
    }
    let mut frame = CodecFrame::new(width, height, depth, format, ColorRange::Full)?;
    let levels = Levels::new(depth, ColorRange::Full);
    let (kr, kb) = matrix.kr_kb();
    let kg = 1.0 - kr - kb;
    let quantize = |v: f32| (v * levels.max + 0.5).clamp(0.0, levels.max) as u16;
    let quantize_chroma = |c: f32| (c * levels.uv_scale + levels.uv_center + 0.5).clamp(0.0, levels.max) as u16;

    if format.is_monochrome() {
        for y in 0..height {
            for x in 0..width {
                let [r, g, b] = rgb(x, y);
                frame.y[(x, y)] = quantize(kr * r + kg * g + kb * b);
            }
        }
        return Ok(frame);
    }

    let (shift_x, shift_y) = format.shifts();
    let (Some(u_plane), Some(v_plane)) = (frame.u.as_mut(), frame.v.as_mut()) else {
        return Err(Error::InvalidInput("chroma planes missing"));
    };

    for cy in 0..u_plane.height() {
        for cx in 0..u_plane.width() {
            let mut sum_u = 0.0f32;
            let mut sum_v = 0.0f32;
            let mut count = 0.0f32;
            let x_start = cx << shift_x;
            let y_start = cy << shift_y;
            for y in y_start..(y_start + (1 << shift_y)).min(height) {
                for x in x_start..(x_start + (1 << shift_x)).min(width) {
                    let [r, g, b] = rgb(x, y);
                    match matrix {
                        YuvMatrix::Identity => {
                            frame.y[(x, y)] = quantize(g);
                            sum_u += b;
                            sum_v += r;
                        }
                        YuvMatrix::Ycbcr { .. } => {
                            let luma = kr * r + kg * g + kb * b;
                            frame.y[(x, y)] = quantize(luma);
                            sum_u += (b - luma) / (2.0 * (1.0 - kb));
                            sum_v += (r - luma) / (2.0 * (1.0 - kr));
                        }
                    }
                    count += 1.0;
                }
            }
            let (u, v) = (sum_u / count, sum_v / count);
            match matrix {
                YuvMatrix::Identity => {
                    u_plane[(cx, cy)] = quantize(u);
                    v_plane[(cx, cy)] = quantize(v);
                }
                YuvMatrix::Ycbcr { .. } => {
                    u_plane[(cx, cy)] = quantize_chroma(u);
                    v_plane[(cx, cy)] = quantize_chroma(v);
                }
            }
        }
    }
    Ok(frame)
}

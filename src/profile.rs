//! Color profile resolution in both directions
//!
//! On load, the embedded ICC profile or the NCLX code points are turned into
//! a [`ColorDescriptor`] plus the ICC bytes that describe the decoded
//! samples. On save, the raster's color space is reduced either to ICC bytes
//! or to a CICP triple, and when the declared primaries differ from the
//! raster's own, a working-space profile is produced so the samples can be
//! converted to match what the file declares.

use crate::curves::{SRGB_PARAMETRIC, TransferCurve, tone_curve_is_linear};
use crate::error::Result;
use crate::image::{Cicp, ColorPrimaries, MatrixCoefficients, TransferCharacteristics};
use crate::primaries::{self, PrimariesSet};
use crate::raster::RasterBuffer;
use bytemuck::Pod;
use imgref::ImgVec;
use log::{debug, warn};
use moxcms::{
    Chromaticity, ColorProfile, DataColorSpace, Layout, LocalizableString, ProfileClass,
    ProfileText, ToneReprCurve, TransformExecutor, TransformOptions, Xyzd,
};

const PROFILE_COPYRIGHT: &str = "Public Domain";
const PROFILE_MANUFACTURER: &str = "zenavif-raster";

const D65_XY: (f32, f32) = (0.3127, 0.3290);
const D50_XYZ: [f64; 3] = [0.9642, 1.0, 0.8249];

/// Where the color description of an image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// An embedded ICC profile
    Icc,
    /// NCLX code points
    Nclx,
    /// Nothing usable: the embedded profile could not be parsed
    Unmanaged,
}

/// Resolved color description of one image
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDescriptor {
    pub source: ProfileSource,
    /// Chromaticities, absent for gray and unmanaged images
    pub primaries: Option<PrimariesSet>,
    pub transfer: TransferCurve,
    pub matrix: MatrixCoefficients,
    pub full_range: bool,
    /// Peak luminance in cd/m², only set for PQ
    pub max_luminance_nits: Option<u32>,
    /// The profile describes a single gray channel
    pub is_gray: bool,
}

impl ColorDescriptor {
    pub fn is_linear(&self) -> bool {
        self.transfer.is_linear()
    }
}

/// Output of the load-side resolution
#[derive(Debug, Clone)]
pub struct DecodedColor {
    pub descriptor: ColorDescriptor,
    /// ICC bytes describing the decoded samples
    pub icc: Option<Vec<u8>>,
    /// Read only the luma plane, producing a gray raster directly
    pub load_gray: bool,
}

/// Resolve the color of a decoded image.
///
/// `monochrome` is the codec's YUV400 marker. An unparseable ICC profile
/// is not fatal: the image loads as non-linear RGB with no profile.
/// An NCLX transfer code with no curve construction is fatal.
pub fn resolve_decode(icc: Option<&[u8]>, cicp: &Cicp, monochrome: bool) -> Result<DecodedColor> {
    if let Some(bytes) = icc.filter(|b| !b.is_empty()) {
        match ColorProfile::new_from_slice(bytes) {
            // A gray frame cannot carry an RGB profile; the built-in gray one replaces it
            Ok(profile) if monochrome && profile.color_space != DataColorSpace::Gray => {
                warn!(
                    "ignoring {:?} ICC profile on a monochrome image, using built-in gray",
                    profile.color_space
                );
            }
            Ok(profile) => {
                let is_gray = profile.color_space == DataColorSpace::Gray;
                let transfer = if profile_is_linear(&profile) {
                    TransferCurve::Linear
                } else {
                    TransferCurve::Unknown
                };
                return Ok(DecodedColor {
                    descriptor: ColorDescriptor {
                        source: ProfileSource::Icc,
                        primaries: if is_gray { None } else { profile_primaries(&profile) },
                        transfer,
                        matrix: cicp.matrix_coefficients,
                        full_range: cicp.full_range,
                        max_luminance_nits: None,
                        is_gray,
                    },
                    icc: Some(bytes.to_vec()),
                    // Identity matrix means the planes are RGB, whatever the profile says
                    load_gray: is_gray && cicp.matrix_coefficients != MatrixCoefficients::IDENTITY,
                });
            }
            Err(err) if monochrome => {
                warn!("failed to read ICC profile, using built-in gray: {err}");
            }
            Err(err) => {
                warn!("failed to read ICC profile, loading as unmanaged RGB: {err}");
                return Ok(DecodedColor {
                    descriptor: ColorDescriptor {
                        source: ProfileSource::Unmanaged,
                        primaries: None,
                        transfer: TransferCurve::Unknown,
                        matrix: cicp.matrix_coefficients,
                        full_range: cicp.full_range,
                        max_luminance_nits: None,
                        is_gray: false,
                    },
                    icc: None,
                    load_gray: false,
                });
            }
        }
    }

    if monochrome {
        let linear = cicp.transfer_characteristics == TransferCharacteristics::LINEAR;
        let profile = gray_profile(linear);
        return Ok(DecodedColor {
            descriptor: ColorDescriptor {
                source: ProfileSource::Nclx,
                primaries: None,
                transfer: if linear { TransferCurve::Linear } else { TransferCurve::ParametricSrgb },
                matrix: cicp.matrix_coefficients,
                full_range: cicp.full_range,
                max_luminance_nits: None,
                is_gray: true,
            },
            icc: Some(profile.encode()?),
            load_gray: true,
        });
    }

    let code = if cicp.color_primaries.is_unspecified() {
        ColorPrimaries::BT709
    } else {
        cicp.color_primaries
    };
    let transfer = TransferCurve::from_cicp(cicp.transfer_characteristics)?;
    let values = primaries::values(code);
    let profile = nclx_profile(&values, transfer)?;
    debug!(
        "NCLX profile: primaries {} transfer {} ({})",
        code.0,
        cicp.transfer_characteristics.0,
        transfer.description_suffix()
    );

    Ok(DecodedColor {
        descriptor: ColorDescriptor {
            source: ProfileSource::Nclx,
            primaries: Some(values),
            transfer,
            matrix: cicp.matrix_coefficients,
            full_range: cicp.full_range,
            max_luminance_nits: transfer.max_luminance(),
            is_gray: false,
        },
        icc: Some(profile.encode()?),
        load_gray: false,
    })
}

/// Color space of a raster handed in for saving
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RasterColor {
    /// The raster's ICC profile, if it has one
    pub icc: Option<Vec<u8>>,
    /// Chromaticities of the raster; derived from `icc` when absent
    pub primaries: Option<PrimariesSet>,
    /// Samples are linear light
    pub linear: bool,
}

impl RasterColor {
    /// Non-linear sRGB
    pub fn srgb() -> Self {
        Self::default()
    }

    /// Linear-light samples with sRGB primaries
    pub fn linear_srgb() -> Self {
        Self {
            linear: true,
            ..Self::default()
        }
    }

    /// Described by an ICC profile
    pub fn from_icc(icc: Vec<u8>, linear: bool) -> Self {
        Self {
            icc: Some(icc),
            primaries: None,
            linear,
        }
    }

    pub fn with_primaries(mut self, primaries: PrimariesSet) -> Self {
        self.primaries = Some(primaries);
        self
    }

    fn curve(&self) -> TransferCurve {
        if self.linear {
            TransferCurve::Linear
        } else {
            TransferCurve::ParametricSrgb
        }
    }
}

/// Output of the save-side resolution
#[derive(Debug, Clone)]
pub struct EncodeColor {
    /// Code points written to the `colr nclx` box
    pub cicp: Cicp,
    /// ICC bytes written to the `colr prof` box
    pub icc: Option<Vec<u8>>,
    pub descriptor: ColorDescriptor,
    /// Source and target profiles when the samples must be converted into
    /// the declared space before encoding
    pub conversion: Option<(ColorProfile, ColorProfile)>,
}

/// Resolve how a raster's color is written.
///
/// `save_icc` selects the embedded-profile mode; otherwise the compact
/// CICP mode is used. Output is always full range.
pub fn resolve_encode(color: &RasterColor, gray: bool, save_icc: bool) -> Result<EncodeColor> {
    let transfer_code = if color.linear {
        TransferCharacteristics::LINEAR
    } else {
        TransferCharacteristics::SRGB
    };

    if save_icc {
        let (icc, transfer) = if gray {
            (gray_profile(color.linear).encode()?, transfer_code)
        } else {
            let icc = match &color.icc {
                Some(icc) => icc.clone(),
                None => {
                    let set = color.primaries.unwrap_or_else(|| primaries::values(ColorPrimaries::BT709));
                    nclx_profile(&set, color.curve())?.encode()?
                }
            };
            (icc, TransferCharacteristics::UNSPECIFIED)
        };
        let cicp = Cicp {
            color_primaries: ColorPrimaries::UNSPECIFIED,
            transfer_characteristics: transfer,
            matrix_coefficients: MatrixCoefficients::BT709,
            full_range: true,
        };
        return Ok(EncodeColor {
            cicp,
            icc: Some(icc),
            descriptor: ColorDescriptor {
                source: ProfileSource::Icc,
                primaries: if gray { None } else { raster_primaries(color) },
                transfer: color.curve(),
                matrix: MatrixCoefficients::BT709,
                full_range: true,
                max_luminance_nits: None,
                is_gray: gray,
            },
            conversion: None,
        });
    }

    if gray {
        return Ok(EncodeColor {
            cicp: Cicp {
                color_primaries: ColorPrimaries::BT709,
                transfer_characteristics: transfer_code,
                matrix_coefficients: MatrixCoefficients::BT709,
                full_range: true,
            },
            icc: None,
            descriptor: ColorDescriptor {
                source: ProfileSource::Nclx,
                primaries: None,
                transfer: color.curve(),
                matrix: MatrixCoefficients::BT709,
                full_range: true,
                max_luminance_nits: None,
                is_gray: true,
            },
            conversion: None,
        });
    }

    let actual = raster_primaries(color).unwrap_or_else(|| primaries::values(ColorPrimaries::BT709));
    let code = primaries::best_match(&actual);
    let matrix = if code == ColorPrimaries::BT709 {
        MatrixCoefficients::BT709
    } else {
        MatrixCoefficients::CHROMAT_NCL
    };
    let declared = primaries::values(code);
    debug!("compact color: primaries {} ({}), matrix {}", code.0, primaries::name(code), matrix.0);

    // The declared space replaces the raster's: convert whenever the raster
    // carries its own curve (ICC) or its chromaticities were rounded to a table entry.
    let conversion = if color.icc.is_some() || actual != declared {
        let source = match &color.icc {
            Some(icc) => ColorProfile::new_from_slice(icc)?,
            None => nclx_profile(&actual, color.curve())?,
        };
        Some((source, nclx_profile(&declared, color.curve())?))
    } else {
        None
    };

    Ok(EncodeColor {
        cicp: Cicp {
            color_primaries: code,
            transfer_characteristics: transfer_code,
            matrix_coefficients: matrix,
            full_range: true,
        },
        icc: None,
        descriptor: ColorDescriptor {
            source: ProfileSource::Nclx,
            primaries: Some(declared),
            transfer: color.curve(),
            matrix,
            full_range: true,
            max_luminance_nits: None,
            is_gray: false,
        },
        conversion,
    })
}

fn raster_primaries(color: &RasterColor) -> Option<PrimariesSet> {
    if color.primaries.is_some() {
        return color.primaries;
    }
    let icc = color.icc.as_deref()?;
    match ColorProfile::new_from_slice(icc) {
        Ok(profile) => profile_primaries(&profile),
        Err(err) => {
            warn!("raster ICC profile unreadable, assuming BT.709 primaries: {err}");
            None
        }
    }
}

/// Build an RGB profile from chromaticities and a transfer curve.
///
/// The description is the matched primaries name followed by the curve
/// suffix, e.g. `"BT.709 sRGB-TRC RGB"`.
pub fn nclx_profile(set: &PrimariesSet, transfer: TransferCurve) -> Result<ColorProfile> {
    let mut profile = ColorProfile::default();
    profile.profile_class = ProfileClass::DisplayDevice;
    profile.color_space = DataColorSpace::Rgb;
    profile.pcs = DataColorSpace::Xyz;
    profile.white_point = xyzd(D50_XYZ);

    let (wx, wy) = set.white();
    let chroma = |(x, y): (f32, f32)| Chromaticity::new(x, y);
    profile.update_rgb_colorimetry(
        Chromaticity::new(wx, wy).to_xyyb(),
        moxcms::ColorPrimaries {
            red: chroma(set.red()),
            green: chroma(set.green()),
            blue: chroma(set.blue()),
        },
    );
    profile.media_white_point = Some(white_xyzd(wx, wy));

    let trc = transfer
        .to_tone_curve()
        .ok_or(crate::Error::Profile("no tone curve for an unknown transfer".into()))?;
    profile.red_trc = Some(trc.clone());
    profile.green_trc = Some(trc.clone());
    profile.blue_trc = Some(trc);

    if let Some(nits) = transfer.max_luminance() {
        profile.luminance = Some(Xyzd::new(0.0, f64::from(nits), 0.0));
    }

    let name = primaries::find(set).map_or("", |p| p.name);
    let description = format!("{name} {}", transfer.description_suffix());
    profile.description = Some(text(&description));
    profile.device_model = Some(text(&description));
    profile.copyright = Some(text(PROFILE_COPYRIGHT));
    profile.device_manufacturer = Some(text(PROFILE_MANUFACTURER));
    Ok(profile)
}

/// D65 gray profile with a linear or sRGB tone curve
pub fn gray_profile(linear: bool) -> ColorProfile {
    let mut profile = ColorProfile::new_gray_with_gamma(1.0);
    if !linear {
        profile.gray_trc = Some(ToneReprCurve::Parametric(SRGB_PARAMETRIC.to_vec()));
    }
    profile.media_white_point = Some(white_xyzd(D65_XY.0, D65_XY.1));
    let description = if linear { "D65 gray linear" } else { "D65 gray sRGB-TRC" };
    profile.description = Some(text(description));
    profile.copyright = Some(text(PROFILE_COPYRIGHT));
    profile
}

fn text(value: &str) -> ProfileText {
    ProfileText::Localizable(vec![LocalizableString::new(
        "en".to_string(),
        "US".to_string(),
        value.to_string(),
    )])
}

fn xyzd(v: [f64; 3]) -> Xyzd {
    Xyzd::new(v[0], v[1], v[2])
}

fn white_xyzd(x: f32, y: f32) -> Xyzd {
    let (x, y) = (f64::from(x), f64::from(y));
    Xyzd::new(x / y, 1.0, (1.0 - x - y) / y)
}

/// Whether every channel curve of a profile is the identity
pub fn profile_is_linear(profile: &ColorProfile) -> bool {
    let curves: Vec<&Option<ToneReprCurve>> = match profile.color_space {
        DataColorSpace::Gray => vec![&profile.gray_trc],
        _ => vec![&profile.red_trc, &profile.green_trc, &profile.blue_trc],
    };
    curves
        .into_iter()
        .all(|c| c.as_ref().is_some_and(tone_curve_is_linear))
}

/// Chromaticities described by an RGB profile.
///
/// Prefers the profile's own CICP tag. Otherwise the D50-adapted colorants
/// are adapted back to the media white point (Bradford) before taking xy.
pub fn profile_primaries(profile: &ColorProfile) -> Option<PrimariesSet> {
    if profile.color_space != DataColorSpace::Rgb {
        return None;
    }
    if let Some(cicp) = &profile.cicp {
        let code = ColorPrimaries(cicp.color_primaries as u8);
        if primaries::lookup(code).is_some() && !code.is_unspecified() {
            return Some(primaries::values(code));
        }
    }

    let white = profile
        .media_white_point
        .map_or_else(|| white_xyzd(D65_XY.0, D65_XY.1), |w| w);
    let white = [white.x, white.y, white.z];
    let xy = |c: Xyzd| -> Option<(f32, f32)> {
        let [x, y, z] = bradford_adapt([c.x, c.y, c.z], D50_XYZ, white);
        let sum = x + y + z;
        (sum.abs() > f64::EPSILON).then(|| ((x / sum) as f32, (y / sum) as f32))
    };
    let (rx, ry) = xy(profile.red_colorant)?;
    let (gx, gy) = xy(profile.green_colorant)?;
    let (bx, by) = xy(profile.blue_colorant)?;
    let sum = white[0] + white[1] + white[2];
    let (wx, wy) = ((white[0] / sum) as f32, (white[1] / sum) as f32);
    Some(PrimariesSet([rx, ry, gx, gy, bx, by, wx, wy]))
}

/// Convert an RGB raster's samples from one profile's space to another's.
///
/// Gray rasters are returned unchanged. Alpha passes through untouched.
pub fn convert_raster(
    raster: &RasterBuffer,
    source: &ColorProfile,
    target: &ColorProfile,
) -> Result<RasterBuffer> {
    let options = TransformOptions::default();
    let mut out = raster.clone();
    match &mut out {
        RasterBuffer::Rgb8(img) => {
            let t = source.create_transform_8bit(Layout::Rgb, target, Layout::Rgb, options)?;
            transform_rows(img, &*t)?;
        }
        RasterBuffer::Rgba8(img) => {
            let t = source.create_transform_8bit(Layout::Rgba, target, Layout::Rgba, options)?;
            transform_rows(img, &*t)?;
        }
        RasterBuffer::Rgb16(img) => {
            let t = source.create_transform_16bit(Layout::Rgb, target, Layout::Rgb, options)?;
            transform_rows(img, &*t)?;
        }
        RasterBuffer::Rgba16(img) => {
            let t = source.create_transform_16bit(Layout::Rgba, target, Layout::Rgba, options)?;
            transform_rows(img, &*t)?;
        }
        _ => {}
    }
    Ok(out)
}

fn transform_rows<P, T>(
    img: &mut ImgVec<P>,
    executor: &(dyn TransformExecutor<T> + Send + Sync),
) -> Result<()>
where
    P: Pod,
    T: Pod + Copy + Default,
{
    // Transforms are not in-place; one row of input is staged here
    let mut scratch: Vec<T> = Vec::new();
    for row in img.rows_mut() {
        scratch.clear();
        scratch.extend_from_slice(bytemuck::cast_slice::<P, T>(row));
        executor.transform(&scratch, bytemuck::cast_slice_mut::<P, T>(row))?;
    }
    Ok(())
}

const BRADFORD: [[f64; 3]; 3] = [
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
];

const BRADFORD_INV: [[f64; 3]; 3] = [
    [0.9869929, -0.1470543, 0.1599627],
    [0.4323053, 0.5183603, 0.0492912],
    [-0.0085287, 0.0400428, 0.9684867],
];

fn mul3(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn bradford_adapt(xyz: [f64; 3], from: [f64; 3], to: [f64; 3]) -> [f64; 3] {
    let src = mul3(&BRADFORD, from);
    let dst = mul3(&BRADFORD, to);
    let lms = mul3(&BRADFORD, xyz);
    let scaled = [
        lms[0] * dst[0] / src[0],
        lms[1] * dst[1] / src[1],
        lms[2] * dst[2] / src[2],
    ];
    mul3(&BRADFORD_INV, scaled)
}

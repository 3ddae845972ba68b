//! AVIF (HEIF / ISOBMFF) still-image container
//!
//! Only what a single still image needs: the primary AV1 item, an optional
//! alpha auxiliary item, color information, display transforms, and Exif
//! and XMP metadata items. Files are muxed with `avif-serialize`.

mod read;

pub use read::parse;

use crate::codec::Av1Config;
use crate::error::{Error, Result};
use crate::image::Cicp;
use crate::transform::{CleanAperture, Transforms};
use avif_serialize::constants as nclx;
use avif_serialize::{Aviffy, ClapBox};
use log::debug;

/// Auxiliary type URN identifying an alpha plane
pub const ALPHA_URN: &str = "urn:mpeg:mpegB:cicp:systems:auxiliary:alpha";
/// Older HEVC-era alpha URN, accepted on read
pub const ALPHA_URN_HEVC: &str = "urn:mpeg:hevc:2015:auxid:1";
/// Content type of the XMP `mime` item
pub const XMP_CONTENT_TYPE: &str = "application/rdf+xml";

/// One coded AV1 image item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedImage {
    /// AV1 OBUs
    pub data: Vec<u8>,
    pub config: Av1Config,
    /// Dimensions from `ispe`
    pub width: u32,
    pub height: u32,
}

/// Everything this crate reads from or writes to an AVIF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvifContainer {
    pub color: CodedImage,
    pub alpha: Option<CodedImage>,
    /// `colr` `nclx` of the color item
    pub cicp: Option<Cicp>,
    /// `colr` `prof`/`rICC` of the color item
    pub icc: Option<Vec<u8>>,
    pub transforms: Transforms,
    /// Exif item payload, including its 4-byte TIFF offset prefix
    pub exif_item: Option<Vec<u8>>,
    pub xmp: Option<Vec<u8>>,
    /// Color samples are premultiplied by alpha (`prem` reference)
    pub premultiplied: bool,
}

/// Write an AVIF file.
///
/// An ICC profile replaces `colr nclx`. Code points the box writer has no
/// constant for (chromaticity-derived matrices, for one) are left out of
/// the container too; readers then take them from the AV1 sequence header.
/// The alpha item must have the color item's size and depth.
pub fn serialize(file: &AvifContainer) -> Result<Vec<u8>> {
    let color = &file.color;
    let config = &color.config;
    if let Some(alpha) = &file.alpha
        && ((alpha.width, alpha.height) != (color.width, color.height)
            || alpha.config.depth() != config.depth())
    {
        return Err(Error::InvalidInput("alpha item must match the color item's size and depth"));
    }

    let mut aviffy = Aviffy::new();
    aviffy
        .set_width(color.width)
        .set_height(color.height)
        .set_bit_depth(config.depth())
        .set_seq_profile(config.seq_profile)
        .set_monochrome(config.monochrome)
        .set_chroma_subsampling((config.chroma_subsampling_x, config.chroma_subsampling_y))
        .set_premultiplied_alpha(file.premultiplied);

    if let Some(icc) = &file.icc {
        aviffy.set_icc_profile(icc.clone());
    } else if let Some(cicp) = &file.cicp {
        match nclx_codes(cicp) {
            Some((primaries, transfer, matrix)) => {
                aviffy
                    .set_color_primaries(primaries)
                    .set_transfer_characteristics(transfer)
                    .set_matrix_coefficients(matrix)
                    .set_full_color_range(cicp.full_range);
            }
            None => debug!(
                "cicp {}/{}/{} has no colr constant, leaving it to the sequence header",
                cicp.color_primaries.0, cicp.transfer_characteristics.0, cicp.matrix_coefficients.0
            ),
        }
    }

    let transforms = &file.transforms;
    if let Some(clap) = &transforms.clap {
        aviffy.set_clean_aperture(clap_box(clap)?);
    }
    if let Some(angle) = transforms.irot {
        aviffy.set_rotation(angle);
    }
    if let Some(axis) = transforms.imir {
        aviffy.set_mirror(axis);
    }
    if let Some(exif) = &file.exif_item {
        aviffy.set_exif(exif.clone());
    }
    if let Some(xmp) = &file.xmp {
        aviffy.set_xmp(xmp.clone());
    }

    let alpha = file.alpha.as_ref().map(|a| a.data.as_slice());
    let mut out = Vec::new();
    out.try_reserve(color.data.len() + alpha.map_or(0, <[u8]>::len) + 1024)?;
    aviffy.write_slice(&mut out, &color.data, alpha)?;
    debug!(
        "wrote AVIF: {}x{} {}-bit, {} bytes",
        color.width,
        color.height,
        config.depth(),
        out.len()
    );
    Ok(out)
}

/// The `colr nclx` constants for `cicp`, if all three have one
fn nclx_codes(
    cicp: &Cicp,
) -> Option<(nclx::ColorPrimaries, nclx::TransferCharacteristics, nclx::MatrixCoefficients)> {
    use nclx::{ColorPrimaries as P, MatrixCoefficients as M, TransferCharacteristics as T};

    let primaries = match cicp.color_primaries.0 {
        1 => P::Bt709,
        2 => P::Unspecified,
        6 => P::Bt601,
        9 => P::Bt2020,
        11 => P::DciP3,
        12 => P::DisplayP3,
        _ => return None,
    };
    let transfer = match cicp.transfer_characteristics.0 {
        1 => T::Bt709,
        2 => T::Unspecified,
        4 => T::Bt470M,
        5 => T::Bt470BG,
        6 => T::Bt601,
        7 => T::Smpte240,
        8 => T::Linear,
        9 => T::Log,
        10 => T::LogSqrt,
        11 => T::Iec61966,
        12 => T::Bt1361,
        13 => T::Srgb,
        14 => T::Bt2020_10,
        15 => T::Bt2020_12,
        16 => T::Smpte2084,
        17 => T::Smpte428,
        18 => T::Hlg,
        _ => return None,
    };
    let matrix = match cicp.matrix_coefficients.0 {
        0 => M::Rgb,
        1 => M::Bt709,
        2 => M::Unspecified,
        6 => M::Bt601,
        8 => M::Ycgco,
        9 => M::Bt2020Ncl,
        10 => M::Bt2020Cl,
        _ => return None,
    };
    Some((primaries, transfer, matrix))
}

fn clap_box(clap: &CleanAperture) -> Result<ClapBox> {
    fn fit<T: TryFrom<i64>>(value: i64) -> Result<T> {
        T::try_from(value).map_err(|_| Error::InvalidInput("clean aperture value out of range"))
    }
    // Offsets are signed, stored as their two's complement bits
    let signed = |v: u32| i64::from(v as i32);
    Ok(ClapBox::new(
        fit(i64::from(clap.width_n))?,
        fit(i64::from(clap.width_d))?,
        fit(i64::from(clap.height_n))?,
        fit(i64::from(clap.height_d))?,
        fit(signed(clap.horiz_off_n))?,
        fit(i64::from(clap.horiz_off_d))?,
        fit(signed(clap.vert_off_n))?,
        fit(i64::from(clap.vert_off_d))?,
    ))
}

//! # zenavif-raster
//!
//! Color-managed raster import and export for AVIF.
//!
//! This crate sits between a host image API (packed 8/16-bit gray, gray +
//! alpha, RGB and RGBA buffers) and an AV1 codec. It resolves the color
//! description of a file to an ICC profile or CICP code points, expands
//! limited-range samples, rescales between host and codec bit depths,
//! plans encoder tiles, reads and writes the AVIF container, and applies
//! the crop, rotation and mirror the container signals.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "encode")] {
//! use zenavif_raster::{save_raster, EncodeOptions, Metadata, RasterBuffer, RasterColor, Rav1eEncoder};
//! use imgref::ImgVec;
//! use rgb::Rgb;
//!
//! let pixels = vec![Rgb { r: 255u8, g: 255, b: 255 }; 4];
//! let raster = RasterBuffer::Rgb8(ImgVec::new(pixels, 2, 2));
//! let artifact = save_raster(
//!     &raster,
//!     &RasterColor::srgb(),
//!     &EncodeOptions::new().quantizer(0, 0),
//!     &Metadata::default(),
//!     Rav1eEncoder::new(),
//! )
//! .unwrap();
//! std::fs::write("white.avif", &artifact.avif_file).unwrap();
//! # }
//! ```
//!
//! Loading needs an AV1 decoder; any type implementing [`Av1Decoder`]
//! can be passed to [`load_raster`].
//!
//! ## Features
//!
//! - **`encode`** (default): AV1 encoding via rav1e ([`Rav1eEncoder`])
//! - **`encode-threading`**: rav1e's multi-threaded encoding

pub mod codec;
mod config;
pub mod container;
pub mod convert;
pub mod curves;
#[cfg(feature = "encode")]
mod encoder;
mod error;
mod image;
mod metadata;
pub mod primaries;
pub mod profile;
mod raster;
pub mod tiles;
pub mod transcode;
pub mod transform;
pub mod yuv_convert;

pub use codec::{
    Av1Config, Av1Decoder, Av1Encoder, Av1Payload, CodecChoice, CodecFrame, FrameSettings,
};
pub use config::{DecodeConfig, EncodeOptions};
#[cfg(feature = "encode")]
pub use encoder::Rav1eEncoder;
pub use error::{Error, Result};
pub use image::{
    ChromaSampling, Cicp, ColorPrimaries, ColorRange, MatrixCoefficients, TransferCharacteristics,
};
pub use metadata::{Metadata, exif_from_item, exif_to_item};
pub use primaries::PrimariesSet;
pub use profile::{ColorDescriptor, ProfileSource, RasterColor};
pub use raster::{ChannelLayout, RasterBuffer};
pub use transform::{CleanAperture, CropRect, Transforms};

use container::{AvifContainer, CodedImage};
use log::{debug, warn};
use transcode::{DecodeInput, EncodeTarget};
use yuv_convert::YuvMatrix;

/// A loaded image with everything the host needs to import it
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Decoded samples, with the container's transforms applied unless
    /// [`DecodeConfig::apply_transforms`] turned that off
    pub raster: RasterBuffer,
    pub color: ColorDescriptor,
    /// ICC profile describing `raster`: the embedded one, or one built
    /// from the NCLX code points
    pub icc: Option<Vec<u8>>,
    pub metadata: Metadata,
    /// Transforms signalled in the file
    pub transforms: Transforms,
    /// The crop actually applied, if any
    pub crop: Option<CropRect>,
}

/// Output of a save: the file plus what was written into it
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    /// The complete AVIF file bytes
    pub avif_file: Vec<u8>,
    /// Bytes used for the color AV1 payload
    pub color_byte_size: usize,
    /// Bytes used for the alpha AV1 payload
    pub alpha_byte_size: usize,
    /// Embedded ICC profile
    pub icc: Option<Vec<u8>>,
    /// Code points signalled for the color item when no ICC profile is
    /// embedded
    pub cicp: Option<Cicp>,
    /// EXIF written, without the item's offset prefix
    pub exif: Option<Vec<u8>>,
    pub xmp: Option<Vec<u8>>,
    /// Color description of the encoded samples
    pub color: ColorDescriptor,
}

/// Receives the completed fraction of a save, in `0.0..=1.0`
pub trait Progress {
    fn report(&mut self, fraction: f32);
}

impl<F: FnMut(f32)> Progress for F {
    fn report(&mut self, fraction: f32) {
        self(fraction)
    }
}

/// Load an AVIF file with default settings
///
/// # Example
///
/// ```no_run
/// # fn example(decoder: impl zenavif_raster::Av1Decoder) {
/// let avif_data = std::fs::read("image.avif").unwrap();
/// let image = zenavif_raster::load_raster(&avif_data, decoder).unwrap();
/// println!("{}x{}", image.raster.width(), image.raster.height());
/// # }
/// ```
pub fn load_raster(data: &[u8], decoder: impl Av1Decoder) -> Result<LoadedImage> {
    load_raster_with(data, &DecodeConfig::default(), decoder)
}

/// Load an AVIF file with custom settings
///
/// # Arguments
///
/// * `data` - Raw AVIF file data
/// * `config` - Decoder configuration
/// * `decoder` - AV1 decoder for the color and alpha items
pub fn load_raster_with(
    data: &[u8],
    config: &DecodeConfig,
    mut decoder: impl Av1Decoder,
) -> Result<LoadedImage> {
    let file = container::parse(data)?;
    config.check_size(file.color.width, file.color.height)?;

    let color_frame = decode_item(&mut decoder, &file.color)?;
    let alpha_frame = match &file.alpha {
        Some(alpha) => Some(decode_item(&mut decoder, alpha)?),
        None => None,
    };

    // Code points come from nclx, else the sequence header, else unspecified
    // primaries and transfer with a BT.601 matrix. The range is always the
    // one the sequence header signals.
    let full_range = color_frame.range.is_full();
    let cicp = match file.cicp.or(color_frame.cicp) {
        Some(cicp) => Cicp { full_range, ..cicp },
        None => Cicp {
            color_primaries: ColorPrimaries::UNSPECIFIED,
            transfer_characteristics: TransferCharacteristics::UNSPECIFIED,
            matrix_coefficients: MatrixCoefficients::BT601,
            full_range,
        },
    };
    let monochrome = color_frame.format.is_monochrome();
    let resolved = profile::resolve_decode(file.icc.as_deref(), &cicp, monochrome)?;

    let gray = monochrome || resolved.load_gray;
    let matrix = if gray {
        YuvMatrix::BT709
    } else {
        YuvMatrix::from_cicp(cicp.matrix_coefficients, cicp.color_primaries)?
    };
    let strategy = transcode::select(alpha_frame.is_some(), gray, color_frame.depth > 8);
    debug!(
        "loading {}x{} {}-bit {:?} as {:?}{}",
        color_frame.width(),
        color_frame.height(),
        color_frame.depth,
        color_frame.format,
        strategy.layout,
        if strategy.wide { " (16-bit)" } else { "" }
    );
    let mut raster = strategy.decode(&DecodeInput {
        color: &color_frame,
        alpha: alpha_frame.as_ref(),
        matrix,
    })?;
    if resolved.descriptor.is_gray && !gray {
        raster = transcode::to_grayscale(raster);
    }
    if file.premultiplied {
        raster.unpremultiply();
    }

    let mut crop = None;
    if config.apply_transforms && !file.transforms.is_empty() {
        (raster, crop) = file.transforms.apply(raster);
    }

    let exif = file.exif_item.as_deref().and_then(|item| match exif_from_item(item) {
        Ok(exif) => Some(exif),
        Err(err) => {
            warn!("dropping Exif item: {err}");
            None
        }
    });

    Ok(LoadedImage {
        raster,
        color: resolved.descriptor,
        icc: resolved.icc,
        metadata: Metadata {
            exif,
            xmp: file.xmp,
        },
        transforms: file.transforms,
        crop,
    })
}

fn decode_item(decoder: &mut impl Av1Decoder, item: &CodedImage) -> Result<CodecFrame> {
    let frame = decoder.decode_frame(&item.data, &item.config)?;
    frame.validate()?;
    if frame.width() != item.width as usize || frame.height() != item.height as usize {
        return Err(Error::Decode(format!(
            "decoded {}x{} frame for a {}x{} item",
            frame.width(),
            frame.height(),
            item.width,
            item.height
        )));
    }
    Ok(frame)
}

/// Save a raster as AVIF
///
/// `color` describes the raster's samples. `options` are validated (and
/// clamped) first. EXIF and XMP from `metadata` are written when the
/// corresponding options are set.
pub fn save_raster(
    raster: &RasterBuffer,
    color: &RasterColor,
    options: &EncodeOptions,
    metadata: &Metadata,
    encoder: impl Av1Encoder,
) -> Result<EncodedArtifact> {
    save_raster_with_progress(raster, color, options, metadata, encoder, &mut |_: f32| {})
}

/// [`save_raster`] with progress reporting
///
/// Reports 0.5 once the color frame is encoded, 0.75 when the encoder is
/// done, and 1.0 when the file is assembled.
pub fn save_raster_with_progress(
    raster: &RasterBuffer,
    color: &RasterColor,
    options: &EncodeOptions,
    metadata: &Metadata,
    mut encoder: impl Av1Encoder,
    progress: &mut dyn Progress,
) -> Result<EncodedArtifact> {
    let options = options.clone().validate()?;
    let (width, height) = (raster.width(), raster.height());
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput("raster has no pixels"));
    }
    let too_large = || Error::ImageTooLarge {
        width: u32::try_from(width).unwrap_or(u32::MAX),
        height: u32::try_from(height).unwrap_or(u32::MAX),
    };
    let frame_width = u32::try_from(width).map_err(|_| too_large())?;
    let frame_height = u32::try_from(height).map_err(|_| too_large())?;

    let gray = raster.is_grayscale();
    let format = if gray {
        ChromaSampling::Monochrome
    } else {
        options.pixel_format
    };
    let resolved = profile::resolve_encode(color, gray, options.save_icc)?;
    let cicp = resolved.cicp;

    let mut host = transcode::adapt_host_depth(raster.clone(), options.bit_depth);
    if let Some((source, target)) = &resolved.conversion {
        host = profile::convert_raster(&host, source, target)?;
    }
    let matrix = YuvMatrix::from_cicp(cicp.matrix_coefficients, cicp.color_primaries)?;
    let planes = transcode::select_for(&host).encode(
        &host,
        &EncodeTarget {
            depth: options.bit_depth,
            format,
            matrix,
        },
    )?;

    let tiles = tiles::plan(frame_width, frame_height);
    let settings = FrameSettings {
        min_quantizer: options.min_quantizer,
        max_quantizer: options.max_quantizer,
        speed: options.speed,
        codec: options.codec,
        threads: options.threads,
        tile_cols_log2: tiles.tile_cols_log2,
        tile_rows_log2: tiles.tile_rows_log2,
        timescale: 1,
        cicp,
        is_alpha: false,
    };
    debug!(
        "saving {width}x{height} as {}-bit {format:?}, cicp {}/{}/{}, tiles 2^{} x 2^{}",
        options.bit_depth,
        cicp.color_primaries.0,
        cicp.transfer_characteristics.0,
        cicp.matrix_coefficients.0,
        tiles.tile_cols_log2,
        tiles.tile_rows_log2
    );

    let color_payload = encoder.encode_frame(&planes.color, &settings)?;
    progress.report(0.5);
    let alpha_payload = match &planes.alpha {
        Some(alpha) => {
            let alpha_settings = FrameSettings {
                min_quantizer: 0,
                max_quantizer: options.alpha_quantizer,
                is_alpha: true,
                ..settings.clone()
            };
            Some(encoder.encode_frame(alpha, &alpha_settings)?)
        }
        None => None,
    };
    progress.report(0.75);

    let exif = metadata.exif.as_ref().filter(|_| options.save_exif);
    let exif_item = exif.and_then(|e| exif_to_item(e));
    let xmp = metadata
        .xmp
        .clone()
        .filter(|x| options.save_xmp && !x.is_empty());

    let color_byte_size = color_payload.data.len();
    let alpha_byte_size = alpha_payload.as_ref().map_or(0, |a| a.data.len());
    let coded = |payload: Av1Payload| CodedImage {
        data: payload.data,
        config: payload.config,
        width: frame_width,
        height: frame_height,
    };
    let file = AvifContainer {
        color: coded(color_payload),
        alpha: alpha_payload.map(coded),
        cicp: Some(cicp),
        icc: resolved.icc.clone(),
        transforms: Transforms::default(),
        exif_item: exif_item.clone(),
        xmp: xmp.clone(),
        premultiplied: false,
    };
    let avif_file = container::serialize(&file)?;
    progress.report(1.0);

    Ok(EncodedArtifact {
        avif_file,
        color_byte_size,
        alpha_byte_size,
        cicp: resolved.icc.is_none().then_some(cicp),
        icc: resolved.icc,
        exif: exif_item.and(exif.cloned()),
        xmp,
        color: resolved.descriptor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_report_progress() {
        let mut seen = Vec::new();
        {
            let mut p = |f: f32| seen.push(f);
            let progress: &mut dyn Progress = &mut p;
            progress.report(0.5);
            progress.report(1.0);
        }
        assert_eq!(seen, [0.5, 1.0]);
    }
}

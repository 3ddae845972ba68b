//! Encoder and decoder configuration

use crate::codec::CodecChoice;
use crate::error::{Error, Result};
use crate::image::ChromaSampling;
use log::debug;

/// Highest quantizer on the AV1 0..=63 scale
pub const MAX_QUANTIZER: u8 = 63;
/// Fastest encoder speed preset
pub const MAX_SPEED: u8 = 10;
/// Upper bound on the encoder thread hint
pub const MAX_THREADS: usize = 64;

/// Options for saving a raster as AVIF
///
/// Uses a builder pattern matching [`DecodeConfig`]. Call
/// [`EncodeOptions::validate`] (done by [`crate::save_raster`]) to clamp
/// out-of-range values.
///
/// # Example
///
/// ```
/// use zenavif_raster::{ChromaSampling, EncodeOptions};
///
/// let options = EncodeOptions::new()
///     .quantizer(0, 20)
///     .pixel_format(ChromaSampling::Cs444)
///     .bit_depth(10)
///     .speed(8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub(crate) min_quantizer: u8,
    pub(crate) max_quantizer: u8,
    pub(crate) alpha_quantizer: u8,
    pub(crate) pixel_format: ChromaSampling,
    pub(crate) bit_depth: u8,
    pub(crate) codec: CodecChoice,
    pub(crate) speed: u8,
    pub(crate) save_icc: bool,
    pub(crate) save_exif: bool,
    pub(crate) save_xmp: bool,
    pub(crate) threads: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            min_quantizer: 0,
            max_quantizer: 40,
            alpha_quantizer: 0,
            pixel_format: ChromaSampling::Cs420,
            bit_depth: 8,
            codec: CodecChoice::Auto,
            speed: 6,
            save_icc: false,
            save_exif: true,
            save_xmp: true,
            threads: 1,
        }
    }
}

impl EncodeOptions {
    /// Create options with default settings
    ///
    /// Defaults: quantizer 0..=40, lossless alpha, YUV420, 8-bit, speed 6
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color quantizer range (0 = best, 63 = worst)
    pub fn quantizer(mut self, min: u8, max: u8) -> Self {
        self.min_quantizer = min;
        self.max_quantizer = max;
        self
    }

    /// Set the maximum quantizer of the alpha plane (0 = lossless)
    pub fn alpha_quantizer(mut self, quantizer: u8) -> Self {
        self.alpha_quantizer = quantizer;
        self
    }

    /// Set the chroma subsampling. Gray rasters always use monochrome.
    pub fn pixel_format(mut self, format: ChromaSampling) -> Self {
        self.pixel_format = format;
        self
    }

    /// Set the codec bit depth: 8, 10 or 12
    pub fn bit_depth(mut self, depth: u8) -> Self {
        self.bit_depth = depth;
        self
    }

    pub fn codec(mut self, codec: CodecChoice) -> Self {
        self.codec = codec;
        self
    }

    /// Set encoding speed (0 = slowest/best, 10 = fastest)
    pub fn speed(mut self, speed: u8) -> Self {
        self.speed = speed;
        self
    }

    /// Embed the raster's ICC profile instead of compact CICP codes
    pub fn save_icc(mut self, save: bool) -> Self {
        self.save_icc = save;
        self
    }

    pub fn save_exif(mut self, save: bool) -> Self {
        self.save_exif = save;
        self
    }

    pub fn save_xmp(mut self, save: bool) -> Self {
        self.save_xmp = save;
        self
    }

    /// Thread hint passed to the encoder
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Clamp every setting into its legal range.
    ///
    /// The max quantizer is clamped first so the min quantizer never
    /// exceeds it. Bit depths other than 8, 10 and 12 are rejected.
    pub fn validate(mut self) -> Result<Self> {
        if !matches!(self.bit_depth, 8 | 10 | 12) {
            return Err(Error::InvalidInput("bit depth must be 8, 10 or 12"));
        }
        self.max_quantizer = self.max_quantizer.min(MAX_QUANTIZER);
        self.min_quantizer = self.min_quantizer.min(self.max_quantizer);
        self.alpha_quantizer = self.alpha_quantizer.min(MAX_QUANTIZER);
        self.speed = self.speed.min(MAX_SPEED);
        self.threads = self.threads.clamp(1, MAX_THREADS);
        debug!(
            "encode options: q {}..={}, alpha q {}, {:?}, {}-bit, speed {}, {} threads",
            self.min_quantizer,
            self.max_quantizer,
            self.alpha_quantizer,
            self.pixel_format,
            self.bit_depth,
            self.speed,
            self.threads
        );
        Ok(self)
    }
}

/// Configuration for AVIF loading
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Maximum frame size limit in pixels (0 = no limit)
    pub(crate) frame_size_limit: u64,
    /// Apply clean aperture, rotation and mirror to the output
    pub(crate) apply_transforms: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            frame_size_limit: 0,
            apply_transforms: true,
        }
    }
}

impl DecodeConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum frame size limit in total pixels
    ///
    /// If width * height exceeds this limit, loading fails with
    /// [`Error::ImageTooLarge`]. 0 means no limit.
    pub fn frame_size_limit(mut self, limit: u64) -> Self {
        self.frame_size_limit = limit;
        self
    }

    /// Enable or disable applying `clap`/`irot`/`imir` to the loaded raster
    ///
    /// The transforms are reported in either case.
    pub fn apply_transforms(mut self, apply: bool) -> Self {
        self.apply_transforms = apply;
        self
    }

    pub(crate) fn check_size(&self, width: u32, height: u32) -> Result<()> {
        if self.frame_size_limit != 0
            && u64::from(width) * u64::from(height) > self.frame_size_limit
        {
            return Err(Error::ImageTooLarge { width, height });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = EncodeOptions::new();
        assert_eq!((o.min_quantizer, o.max_quantizer, o.alpha_quantizer), (0, 40, 0));
        assert_eq!(o.pixel_format, ChromaSampling::Cs420);
        assert_eq!((o.bit_depth, o.speed, o.threads), (8, 6, 1));
        assert!(!o.save_icc && o.save_exif && o.save_xmp);
        assert_eq!(o.clone().validate().unwrap(), o);
    }

    #[test]
    fn validate_clamps() {
        let o = EncodeOptions::new()
            .quantizer(70, 99)
            .alpha_quantizer(200)
            .speed(11)
            .threads(0)
            .validate()
            .unwrap();
        assert_eq!((o.min_quantizer, o.max_quantizer, o.alpha_quantizer), (63, 63, 63));
        assert_eq!((o.speed, o.threads), (10, 1));

        let o = EncodeOptions::new().quantizer(30, 10).threads(1000).validate().unwrap();
        assert_eq!((o.min_quantizer, o.max_quantizer, o.threads), (10, 10, 64));
    }

    #[test]
    fn validate_rejects_depth() {
        for depth in [0, 9, 16] {
            assert!(matches!(
                EncodeOptions::new().bit_depth(depth).validate(),
                Err(Error::InvalidInput(_))
            ));
        }
        assert!(EncodeOptions::new().bit_depth(12).validate().is_ok());
    }

    #[test]
    fn frame_size_limit() {
        let c = DecodeConfig::new().frame_size_limit(100);
        assert!(c.check_size(10, 10).is_ok());
        assert!(matches!(
            c.check_size(11, 10),
            Err(Error::ImageTooLarge { width: 11, height: 10 })
        ));
        assert!(DecodeConfig::new().check_size(u32::MAX, u32::MAX).is_ok());
    }
}

//! CICP code points, chroma sampling and sample range

/// Chroma subsampling format (the AVIF pixel format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaSampling {
    /// 4:2:0 - chroma is half resolution in both dimensions
    #[default]
    Cs420,
    /// 4:2:2 - chroma is half resolution horizontally
    Cs422,
    /// 4:4:4 - no chroma subsampling
    Cs444,
    /// Monochrome (no chroma), YUV400
    Monochrome,
}

impl ChromaSampling {
    /// Horizontal and vertical chroma shift (log2 of the subsampling factor)
    pub fn shifts(self) -> (u32, u32) {
        match self {
            ChromaSampling::Cs420 => (1, 1),
            ChromaSampling::Cs422 => (1, 0),
            ChromaSampling::Cs444 | ChromaSampling::Monochrome => (0, 0),
        }
    }

    /// Dimensions of a chroma plane for a frame of `width` x `height`
    pub fn chroma_size(self, width: usize, height: usize) -> (usize, usize) {
        let (sx, sy) = self.shifts();
        ((width + (1 << sx) - 1) >> sx, (height + (1 << sy) - 1) >> sy)
    }

    pub fn is_monochrome(self) -> bool {
        self == ChromaSampling::Monochrome
    }
}

/// Color primaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorPrimaries(pub u8);

impl ColorPrimaries {
    pub const UNKNOWN: Self = Self(0);
    pub const BT709: Self = Self(1);
    pub const UNSPECIFIED: Self = Self(2);
    pub const BT470M: Self = Self(4);
    pub const BT470BG: Self = Self(5);
    pub const BT601: Self = Self(6);
    pub const SMPTE240: Self = Self(7);
    pub const FILM: Self = Self(8);
    pub const BT2020: Self = Self(9);
    pub const XYZ: Self = Self(10);
    pub const SMPTE431: Self = Self(11);
    pub const SMPTE432: Self = Self(12);
    pub const EBU3213: Self = Self(22);

    /// Unknown (0) and unspecified (2) both mean "not signalled"
    pub fn is_unspecified(self) -> bool {
        self == Self::UNKNOWN || self == Self::UNSPECIFIED
    }
}

/// Transfer characteristics (gamma curve)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferCharacteristics(pub u8);

impl TransferCharacteristics {
    pub const UNKNOWN: Self = Self(0);
    pub const BT709: Self = Self(1);
    pub const UNSPECIFIED: Self = Self(2);
    pub const BT470M: Self = Self(4);
    pub const BT470BG: Self = Self(5);
    pub const BT601: Self = Self(6);
    pub const SMPTE240: Self = Self(7);
    pub const LINEAR: Self = Self(8);
    pub const LOG100: Self = Self(9);
    pub const LOG100_SQRT10: Self = Self(10);
    pub const IEC61966: Self = Self(11);
    pub const BT1361: Self = Self(12);
    pub const SRGB: Self = Self(13);
    pub const BT2020_10BIT: Self = Self(14);
    pub const BT2020_12BIT: Self = Self(15);
    pub const SMPTE2084: Self = Self(16);
    pub const SMPTE428: Self = Self(17);
    pub const HLG: Self = Self(18);

    pub fn is_unspecified(self) -> bool {
        self == Self::UNKNOWN || self == Self::UNSPECIFIED
    }
}

/// Matrix coefficients for YUV to RGB conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatrixCoefficients(pub u8);

impl MatrixCoefficients {
    pub const IDENTITY: Self = Self(0);
    pub const BT709: Self = Self(1);
    pub const UNSPECIFIED: Self = Self(2);
    pub const FCC: Self = Self(4);
    pub const BT470BG: Self = Self(5);
    pub const BT601: Self = Self(6);
    pub const SMPTE240: Self = Self(7);
    pub const YCGCO: Self = Self(8);
    pub const BT2020_NCL: Self = Self(9);
    pub const BT2020_CL: Self = Self(10);
    pub const SMPTE2085: Self = Self(11);
    pub const CHROMAT_NCL: Self = Self(12);
    pub const CHROMAT_CL: Self = Self(13);
    pub const ICTCP: Self = Self(14);
}

/// Color range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorRange {
    /// Limited/studio range (Y: 16-235, UV: 16-240 for 8-bit)
    #[default]
    Limited,
    /// Full range (0-255 for 8-bit)
    Full,
}

impl ColorRange {
    pub fn is_full(self) -> bool {
        self == ColorRange::Full
    }
}

/// The compact NCLX color description carried in a `colr` box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cicp {
    pub color_primaries: ColorPrimaries,
    pub transfer_characteristics: TransferCharacteristics,
    pub matrix_coefficients: MatrixCoefficients,
    pub full_range: bool,
}

impl Cicp {
    /// sRGB primaries and transfer with BT.709 matrix, full range
    pub const SRGB: Self = Self {
        color_primaries: ColorPrimaries::BT709,
        transfer_characteristics: TransferCharacteristics::SRGB,
        matrix_coefficients: MatrixCoefficients::BT709,
        full_range: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroma_plane_sizes_round_up() {
        assert_eq!(ChromaSampling::Cs420.chroma_size(5, 3), (3, 2));
        assert_eq!(ChromaSampling::Cs422.chroma_size(5, 3), (3, 3));
        assert_eq!(ChromaSampling::Cs444.chroma_size(5, 3), (5, 3));
    }

    #[test]
    fn zero_and_two_are_unspecified() {
        assert!(ColorPrimaries(0).is_unspecified());
        assert!(ColorPrimaries(2).is_unspecified());
        assert!(!ColorPrimaries::BT709.is_unspecified());
        assert!(TransferCharacteristics(2).is_unspecified());
        assert!(!TransferCharacteristics::LINEAR.is_unspecified());
    }
}

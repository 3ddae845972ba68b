//! Sample range conversion: bit depth rescaling and limited-to-full range expansion

use crate::image::ColorRange;

/// Largest sample value for a bit depth (255, 1023, 4095, 65535)
#[inline]
pub fn max_value(bit_depth: u8) -> u32 {
    (1u32 << bit_depth) - 1
}

/// Rescale a sample from `0..=from_max` to `0..=to_max`.
///
/// Computes `round(value / from_max * to_max)` in single precision,
/// rounding half up, and clamps to `[0, to_max]`.
#[inline]
pub fn rescale(value: u32, from_max: u32, to_max: u32) -> u32 {
    let scaled = ((value as f32 / from_max as f32) * to_max as f32 + 0.5) as i64;
    scaled.clamp(0, i64::from(to_max)) as u32
}

/// Expand a limited-range luma or alpha sample to full range.
///
/// Black (16 << (depth - 8)) maps to 0 and white (235 << (depth - 8)) to the
/// full-range maximum. Depths other than 8, 10 and 12 pass through.
#[inline]
pub fn limited_to_full(bit_depth: u8, value: u16) -> u16 {
    let (min, max, full) = match bit_depth {
        8 => (16i32, 235i32, 255i32),
        10 => (64, 940, 1023),
        12 => (256, 3760, 4095),
        _ => return value,
    };
    let v = i32::from(value);
    let expanded = ((v - min) * full + (max - min) / 2) / (max - min);
    expanded.clamp(0, full) as u16
}

/// Bring a codec sample into full range, depending on the plane's signalled range
#[inline]
pub fn to_full_range(bit_depth: u8, value: u16, range: ColorRange) -> u16 {
    match range {
        ColorRange::Full => value,
        ColorRange::Limited => limited_to_full(bit_depth, value),
    }
}

/// Codec sample (8/10/12-bit, already full range) to host 16-bit
#[inline]
pub fn codec_to_host16(value: u16, codec_depth: u8) -> u16 {
    rescale(u32::from(value), max_value(codec_depth), 0xFFFF) as u16
}

/// Host 16-bit sample to codec 10/12-bit
#[inline]
pub fn host16_to_codec(value: u16, codec_depth: u8) -> u16 {
    rescale(u32::from(value), 0xFFFF, max_value(codec_depth)) as u16
}

/// 8-bit host sample widened to 16-bit
#[inline]
pub fn widen8(value: u8) -> u16 {
    u16::from(value) * 257
}

/// 16-bit host sample narrowed to 8-bit
#[inline]
pub fn narrow16(value: u16) -> u8 {
    rescale(u32::from(value), 0xFFFF, 0xFF) as u8
}

/// Rec.709 luma of a full-range RGB triple, in the same sample scale
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_endpoints() {
        for (from, to) in [(65535, 1023), (65535, 4095), (1023, 65535), (4095, 65535), (255, 65535)] {
            assert_eq!(rescale(0, from, to), 0);
            assert_eq!(rescale(from, from, to), to);
        }
    }

    #[test]
    fn rescale_is_monotonic() {
        let mut prev = 0;
        for v in 0..=65535u32 {
            let out = rescale(v, 65535, 1023);
            assert!(out >= prev, "rescale({v}) = {out} < {prev}");
            prev = out;
        }
        let mut prev = 0;
        for v in 0..=4095u32 {
            let out = rescale(v, 4095, 65535);
            assert!(out >= prev);
            prev = out;
        }
    }

    #[test]
    fn rescale_rounds_half_up() {
        // 1/2 * 1 = 0.5 -> 1
        assert_eq!(rescale(1, 2, 1), 1);
        // 32767/65535 * 1023 = 511.49 -> 511
        assert_eq!(rescale(32767, 65535, 1023), 511);
        assert_eq!(rescale(32768, 65535, 1023), 512);
    }

    #[test]
    fn rescale_clamps_out_of_range_input() {
        assert_eq!(rescale(70000, 65535, 1023), 1023);
    }

    #[test]
    fn limited_black_and_white_points() {
        for depth in [8u8, 10, 12] {
            let shift = depth - 8;
            let black = 16u16 << shift;
            let white = 235u16 << shift;
            assert_eq!(limited_to_full(depth, black), 0, "depth {depth}");
            assert_eq!(limited_to_full(depth, white), max_value(depth) as u16, "depth {depth}");
        }
    }

    #[test]
    fn limited_clamps_footroom_and_headroom() {
        assert_eq!(limited_to_full(8, 0), 0);
        assert_eq!(limited_to_full(8, 255), 255);
        assert_eq!(limited_to_full(10, 1023), 1023);
        assert_eq!(limited_to_full(12, 5), 0);
    }

    #[test]
    fn limited_midpoint_8bit() {
        // (126 - 16) * 255 / 219 = 128.08
        assert_eq!(limited_to_full(8, 126), 128);
    }

    #[test]
    fn full_range_passes_through() {
        assert_eq!(to_full_range(8, 16, ColorRange::Full), 16);
        assert_eq!(to_full_range(8, 16, ColorRange::Limited), 0);
    }

    #[test]
    fn host_depth_roundtrip() {
        for v in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(narrow16(widen8(v)), v);
        }
        for v in 0..=1023u16 {
            assert_eq!(host16_to_codec(codec_to_host16(v, 10), 10), v);
        }
    }
}

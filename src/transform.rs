//! Display transforms carried in the container: clean aperture, rotation, mirror
//!
//! They are applied to the decoded raster in the order crop, rotate, mirror.

use crate::raster::RasterBuffer;
use log::warn;

/// Clean aperture (`clap`) fractions as stored in the box.
///
/// Offsets are signed in the box even though they are read as unsigned
/// 32-bit words; they are reinterpreted when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanAperture {
    pub width_n: u32,
    pub width_d: u32,
    pub height_n: u32,
    pub height_d: u32,
    pub horiz_off_n: u32,
    pub horiz_off_d: u32,
    pub vert_off_n: u32,
    pub vert_off_d: u32,
}

/// A crop rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Transforms signalled for the primary item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transforms {
    pub clap: Option<CleanAperture>,
    /// Counter-clockwise rotation in units of 90 degrees (0..=3)
    pub irot: Option<u8>,
    /// Mirror axis: 0 flips top and bottom, 1 flips left and right
    pub imir: Option<u8>,
}

impl Transforms {
    pub fn is_empty(&self) -> bool {
        self.clap.is_none() && self.irot.is_none() && self.imir.is_none()
    }

    /// Apply crop, rotation and mirror in that order.
    ///
    /// Returns the new raster and the crop that was actually applied.
    pub fn apply(&self, raster: RasterBuffer) -> (RasterBuffer, Option<CropRect>) {
        let mut raster = raster;
        let mut applied = None;
        if let Some(clap) = &self.clap {
            if let Some(rect) = clap_crop(clap, raster.width(), raster.height()) {
                raster = crop(&raster, rect);
                applied = Some(rect);
            }
        }
        if let Some(angle) = self.irot {
            raster = rotate(&raster, angle);
        }
        if let Some(axis) = self.imir {
            raster = mirror(&raster, axis);
        }
        (raster, applied)
    }
}

/// Crop rectangle for a clean aperture.
///
/// Returns `None` (with a warning for bad boxes) when no crop applies.
pub fn clap_crop(clap: &CleanAperture, width: usize, height: usize) -> Option<CropRect> {
    if clap.width_d == 0 || clap.height_d == 0 || clap.horiz_off_d == 0 || clap.vert_off_d == 0 {
        warn!("clean aperture has a zero denominator, not cropping");
        return None;
    }
    let (w, h) = (width as f64, height as f64);

    let new_width = ((f64::from(clap.width_n) / f64::from(clap.width_d) + 0.5) as usize).min(width);
    let new_height = ((f64::from(clap.height_n) / f64::from(clap.height_d) + 0.5) as usize).min(height);
    if new_width == 0 || new_height == 0 {
        return None;
    }

    let offset = |n: u32, d: u32, full: f64, size: usize| -> usize {
        let off = f64::from(n as i32) / f64::from(d) + (full - size as f64) / 2.0 + 0.5;
        // Truncation toward zero, then clamp into the image
        let max = (full as usize - size) as i64;
        (off as i64).clamp(0, max) as usize
    };
    Some(CropRect {
        x: offset(clap.horiz_off_n, clap.horiz_off_d, w, new_width),
        y: offset(clap.vert_off_n, clap.vert_off_d, h, new_height),
        width: new_width,
        height: new_height,
    })
}

pub fn crop(raster: &RasterBuffer, rect: CropRect) -> RasterBuffer {
    raster.remap(rect.width, rect.height, |x, y| (x + rect.x, y + rect.y))
}

/// Rotate counter-clockwise by `angle * 90` degrees
pub fn rotate(raster: &RasterBuffer, angle: u8) -> RasterBuffer {
    let (w, h) = (raster.width(), raster.height());
    match angle & 3 {
        1 => raster.remap(h, w, |x, y| (w - 1 - y, x)),
        2 => raster.remap(w, h, |x, y| (w - 1 - x, h - 1 - y)),
        3 => raster.remap(h, w, |x, y| (y, h - 1 - x)),
        _ => raster.clone(),
    }
}

pub fn mirror(raster: &RasterBuffer, axis: u8) -> RasterBuffer {
    let (w, h) = (raster.width(), raster.height());
    match axis {
        0 => raster.remap(w, h, |x, y| (x, h - 1 - y)),
        1 => raster.remap(w, h, |x, y| (w - 1 - x, y)),
        _ => raster.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgref::ImgVec;

    // 3x2 with distinct values:
    // 0 1 2
    // 3 4 5
    fn sample() -> RasterBuffer {
        RasterBuffer::Gray8(ImgVec::new(vec![0, 1, 2, 3, 4, 5], 3, 2))
    }

    fn pixels(r: &RasterBuffer) -> (usize, usize, Vec<u8>) {
        (r.width(), r.height(), r.to_packed_bytes())
    }

    fn clap(w: (u32, u32), h: (u32, u32), x: (i32, u32), y: (i32, u32)) -> CleanAperture {
        CleanAperture {
            width_n: w.0,
            width_d: w.1,
            height_n: h.0,
            height_d: h.1,
            horiz_off_n: x.0 as u32,
            horiz_off_d: x.1,
            vert_off_n: y.0 as u32,
            vert_off_d: y.1,
        }
    }

    #[test]
    fn rotations() {
        assert_eq!(pixels(&rotate(&sample(), 1)), (2, 3, vec![2, 5, 1, 4, 0, 3]));
        assert_eq!(pixels(&rotate(&sample(), 2)), (3, 2, vec![5, 4, 3, 2, 1, 0]));
        assert_eq!(pixels(&rotate(&sample(), 3)), (2, 3, vec![3, 0, 4, 1, 5, 2]));
        assert_eq!(pixels(&rotate(&sample(), 0)), pixels(&sample()));
    }

    #[test]
    fn mirrors() {
        assert_eq!(pixels(&mirror(&sample(), 0)), (3, 2, vec![3, 4, 5, 0, 1, 2]));
        assert_eq!(pixels(&mirror(&sample(), 1)), (3, 2, vec![2, 1, 0, 5, 4, 3]));
    }

    #[test]
    fn centered_clap() {
        // 1x1 aperture in 3x2: x = 1 + 0.5 -> 1, y = 0.5 + 0.5 -> 1
        let rect = clap_crop(&clap((1, 1), (1, 1), (0, 1), (0, 1)), 3, 2).unwrap();
        assert_eq!(rect, CropRect { x: 1, y: 1, width: 1, height: 1 });
    }

    #[test]
    fn clap_offsets_are_signed_and_clamped() {
        let rect = clap_crop(&clap((2, 1), (1, 1), (-10, 1), (10, 1)), 3, 2).unwrap();
        assert_eq!((rect.x, rect.y), (0, 1));
        assert_eq!((rect.width, rect.height), (2, 1));
    }

    #[test]
    fn oversized_clap_is_capped() {
        let rect = clap_crop(&clap((100, 1), (7, 2), (0, 1), (0, 1)), 3, 2).unwrap();
        assert_eq!(rect, CropRect { x: 0, y: 0, width: 3, height: 2 });
    }

    #[test]
    fn zero_denominator_leaves_image_unchanged() {
        let t = Transforms {
            clap: Some(clap((1, 1), (1, 0), (0, 1), (0, 1))),
            ..Default::default()
        };
        let (out, applied) = t.apply(sample());
        assert!(applied.is_none());
        assert_eq!(pixels(&out), pixels(&sample()));
    }

    #[test]
    fn crop_then_rotate_then_mirror() {
        let t = Transforms {
            clap: Some(clap((2, 1), (2, 1), (-1, 2), (0, 1))),
            irot: Some(2),
            imir: Some(1),
        };
        let (out, applied) = t.apply(sample());
        // -0.5 + 0.5 + 0.5 = 0.5 -> 0
        assert_eq!(applied, Some(CropRect { x: 0, y: 0, width: 2, height: 2 }));
        // crop [0 1; 3 4], rotate 180 [4 3; 1 0], mirror [3 4; 0 1]
        assert_eq!(pixels(&out), (2, 2, vec![3, 4, 0, 1]));
    }
}

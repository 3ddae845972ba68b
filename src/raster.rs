//! Host-side packed raster buffers

use imgref::ImgVec;
use rgb::{GrayA, Rgb, Rgba};

/// Channel layout of a packed host raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::GrayAlpha => 2,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, ChannelLayout::GrayAlpha | ChannelLayout::Rgba)
    }

    pub fn is_gray(self) -> bool {
        matches!(self, ChannelLayout::Gray | ChannelLayout::GrayAlpha)
    }
}

/// A packed, row-major host raster at 8 or 16 bits per sample.
///
/// Samples are always full range. 16-bit variants use the whole
/// `0..=65535` range regardless of the codec depth they came from.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RasterBuffer {
    /// 8-bit grayscale
    Gray8(ImgVec<u8>),
    /// 8-bit grayscale with alpha
    GrayA8(ImgVec<GrayA<u8>>),
    /// 8-bit RGB
    Rgb8(ImgVec<Rgb<u8>>),
    /// 8-bit RGBA
    Rgba8(ImgVec<Rgba<u8>>),
    /// 16-bit grayscale
    Gray16(ImgVec<u16>),
    /// 16-bit grayscale with alpha
    GrayA16(ImgVec<GrayA<u16>>),
    /// 16-bit RGB
    Rgb16(ImgVec<Rgb<u16>>),
    /// 16-bit RGBA
    Rgba16(ImgVec<Rgba<u16>>),
}

macro_rules! each_variant {
    ($self:expr, $img:ident => $body:expr) => {
        match $self {
            RasterBuffer::Gray8($img) => $body,
            RasterBuffer::GrayA8($img) => $body,
            RasterBuffer::Rgb8($img) => $body,
            RasterBuffer::Rgba8($img) => $body,
            RasterBuffer::Gray16($img) => $body,
            RasterBuffer::GrayA16($img) => $body,
            RasterBuffer::Rgb16($img) => $body,
            RasterBuffer::Rgba16($img) => $body,
        }
    };
}

impl RasterBuffer {
    /// Get the width of the raster
    pub fn width(&self) -> usize {
        each_variant!(self, img => img.width())
    }

    /// Get the height of the raster
    pub fn height(&self) -> usize {
        each_variant!(self, img => img.height())
    }

    pub fn layout(&self) -> ChannelLayout {
        match self {
            RasterBuffer::Gray8(_) | RasterBuffer::Gray16(_) => ChannelLayout::Gray,
            RasterBuffer::GrayA8(_) | RasterBuffer::GrayA16(_) => ChannelLayout::GrayAlpha,
            RasterBuffer::Rgb8(_) | RasterBuffer::Rgb16(_) => ChannelLayout::Rgb,
            RasterBuffer::Rgba8(_) | RasterBuffer::Rgba16(_) => ChannelLayout::Rgba,
        }
    }

    /// Returns true if the raster has an alpha channel
    pub fn has_alpha(&self) -> bool {
        self.layout().has_alpha()
    }

    /// Returns true if the raster is grayscale
    pub fn is_grayscale(&self) -> bool {
        self.layout().is_gray()
    }

    /// Returns the bit depth of the raster (8 or 16)
    pub fn bit_depth(&self) -> u8 {
        match self {
            RasterBuffer::Gray8(_)
            | RasterBuffer::GrayA8(_)
            | RasterBuffer::Rgb8(_)
            | RasterBuffer::Rgba8(_) => 8,
            _ => 16,
        }
    }

    /// Bytes per row of tightly packed samples
    pub fn row_bytes(&self) -> usize {
        self.width() * self.layout().channels() * usize::from(self.bit_depth() / 8)
    }

    /// Copy the samples out as tightly packed native-endian bytes
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.row_bytes() * self.height());
        each_variant!(self, img => {
            for row in img.rows() {
                out.extend_from_slice(bytemuck::cast_slice(row));
            }
        });
        out
    }

    /// Map every pixel through a rotation/mirror-style index remap.
    ///
    /// `index(x, y)` returns the source coordinate for destination `(x, y)`
    /// in a `new_width` x `new_height` raster.
    pub(crate) fn remap(
        &self,
        new_width: usize,
        new_height: usize,
        index: impl Fn(usize, usize) -> (usize, usize),
    ) -> RasterBuffer {
        fn remap_img<T: Copy>(
            img: &ImgVec<T>,
            w: usize,
            h: usize,
            index: &impl Fn(usize, usize) -> (usize, usize),
        ) -> ImgVec<T> {
            let mut buf = Vec::with_capacity(w * h);
            for y in 0..h {
                for x in 0..w {
                    let (sx, sy) = index(x, y);
                    buf.push(img[(sx, sy)]);
                }
            }
            ImgVec::new(buf, w, h)
        }
        match self {
            RasterBuffer::Gray8(img) => RasterBuffer::Gray8(remap_img(img, new_width, new_height, &index)),
            RasterBuffer::GrayA8(img) => RasterBuffer::GrayA8(remap_img(img, new_width, new_height, &index)),
            RasterBuffer::Rgb8(img) => RasterBuffer::Rgb8(remap_img(img, new_width, new_height, &index)),
            RasterBuffer::Rgba8(img) => RasterBuffer::Rgba8(remap_img(img, new_width, new_height, &index)),
            RasterBuffer::Gray16(img) => RasterBuffer::Gray16(remap_img(img, new_width, new_height, &index)),
            RasterBuffer::GrayA16(img) => RasterBuffer::GrayA16(remap_img(img, new_width, new_height, &index)),
            RasterBuffer::Rgb16(img) => RasterBuffer::Rgb16(remap_img(img, new_width, new_height, &index)),
            RasterBuffer::Rgba16(img) => RasterBuffer::Rgba16(remap_img(img, new_width, new_height, &index)),
        }
    }

    /// Divide color samples by alpha, for rasters decoded from a file whose
    /// color item is premultiplied. Fully transparent pixels are left alone.
    pub(crate) fn unpremultiply(&mut self) {
        fn straight(c: u32, a: u32, max: u32) -> u32 {
            ((c * max + a / 2) / a).min(max)
        }
        match self {
            RasterBuffer::GrayA8(img) => {
                for px in img.rows_mut().flatten().filter(|px| px.a != 0 && px.a != u8::MAX) {
                    px.v = straight(px.v.into(), px.a.into(), 0xFF) as u8;
                }
            }
            RasterBuffer::Rgba8(img) => {
                for px in img.rows_mut().flatten().filter(|px| px.a != 0 && px.a != u8::MAX) {
                    let a = u32::from(px.a);
                    px.r = straight(px.r.into(), a, 0xFF) as u8;
                    px.g = straight(px.g.into(), a, 0xFF) as u8;
                    px.b = straight(px.b.into(), a, 0xFF) as u8;
                }
            }
            RasterBuffer::GrayA16(img) => {
                for px in img.rows_mut().flatten().filter(|px| px.a != 0 && px.a != u16::MAX) {
                    px.v = straight(px.v.into(), px.a.into(), 0xFFFF) as u16;
                }
            }
            RasterBuffer::Rgba16(img) => {
                for px in img.rows_mut().flatten().filter(|px| px.a != 0 && px.a != u16::MAX) {
                    let a = u32::from(px.a);
                    px.r = straight(px.r.into(), a, 0xFFFF) as u16;
                    px.g = straight(px.g.into(), a, 0xFFFF) as u16;
                    px.b = straight(px.b.into(), a, 0xFFFF) as u16;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_width_times_channels_times_bytes() {
        let img = RasterBuffer::Rgba16(ImgVec::new(vec![Rgba::new(0u16, 0, 0, 0); 6], 3, 2));
        assert_eq!(img.row_bytes(), 3 * 4 * 2);
        assert_eq!(img.to_packed_bytes().len(), 3 * 4 * 2 * 2);

        let img = RasterBuffer::GrayA8(ImgVec::new(vec![GrayA { v: 1u8, a: 2 }; 4], 2, 2));
        assert_eq!(img.row_bytes(), 4);
        assert_eq!(img.to_packed_bytes(), vec![1, 2, 1, 2, 1, 2, 1, 2]);
    }

    #[test]
    fn layout_flags() {
        let img = RasterBuffer::Gray16(ImgVec::new(vec![0u16; 1], 1, 1));
        assert!(img.is_grayscale());
        assert!(!img.has_alpha());
        assert_eq!(img.bit_depth(), 16);
    }

    #[test]
    fn unpremultiply_divides_by_alpha() {
        let mut img = RasterBuffer::GrayA8(ImgVec::new(
            vec![
                GrayA { v: 64u8, a: 128 },
                GrayA { v: 9, a: 0 },
                GrayA { v: 200, a: 255 },
                GrayA { v: 200, a: 100 },
            ],
            4,
            1,
        ));
        img.unpremultiply();
        let RasterBuffer::GrayA8(img) = img else { unreachable!() };
        let v: Vec<u8> = img.buf().iter().map(|px| px.v).collect();
        assert_eq!(v, [128, 9, 200, 255]);

        let mut img = RasterBuffer::Rgba16(ImgVec::new(vec![Rgba::new(0x4000u16, 0x8000, 0, 0x8000)], 1, 1));
        img.unpremultiply();
        let RasterBuffer::Rgba16(img) = img else { unreachable!() };
        assert_eq!(img.buf()[0], Rgba::new(0x8000, 0xFFFF, 0, 0x8000));
    }
}

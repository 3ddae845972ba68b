//! EXIF and XMP payloads
//!
//! An AVIF `Exif` item starts with a 4-byte big-endian offset to the TIFF
//! header. The payloads exchanged with callers never carry that prefix.

use crate::error::{Error, Result};
use log::warn;

/// Metadata blobs attached to an image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Raw EXIF (TIFF structure, starting with `II*\0` or `MM\0*`)
    pub exif: Option<Vec<u8>>,
    /// XMP packet
    pub xmp: Option<Vec<u8>>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.xmp.is_none()
    }
}

/// Strip the TIFF header offset from an `Exif` item payload.
///
/// A zero offset is the common case; a non-zero offset skips that many
/// bytes past the prefix.
pub fn exif_from_item(item: &[u8]) -> Result<Vec<u8>> {
    let [a, b, c, d, rest @ ..] = item else {
        return Err(Error::Parse("Exif item shorter than its offset field"));
    };
    let offset = u32::from_be_bytes([*a, *b, *c, *d]) as usize;
    rest.get(offset..)
        .map(<[u8]>::to_vec)
        .ok_or(Error::Parse("Exif TIFF header offset out of bounds"))
}

/// Build an `Exif` item payload (offset 0) from raw EXIF.
///
/// Returns `None` for payloads too short to hold a TIFF header.
pub fn exif_to_item(exif: &[u8]) -> Option<Vec<u8>> {
    if exif.len() < 4 {
        warn!("EXIF payload of {} bytes is too short, not writing it", exif.len());
        return None;
    }
    let mut item = Vec::with_capacity(exif.len() + 4);
    item.extend_from_slice(&0u32.to_be_bytes());
    item.extend_from_slice(exif);
    Some(item)
}

//! Error types for zenavif-raster

/// Error type for AVIF raster load/save operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// AVIF container is malformed, truncated, or not an AVIF file
    #[error("AVIF parse error: {0}")]
    Parse(&'static str),

    /// AVIF item extraction failed
    #[error("AVIF item error: {0}")]
    Container(#[from] avif_parse::Error),

    /// AVIF muxing failed
    #[error("AVIF write error: {0}")]
    Write(#[from] std::io::Error),

    /// AV1 decode error reported by the codec
    #[error("AV1 decode error: {0}")]
    Decode(String),

    /// AV1 encode error reported by the codec
    #[error("AV1 encode error: {0}")]
    Encode(String),

    /// Transfer characteristics code with no known curve construction
    #[error("Unsupported transfer characteristics: {0}")]
    UnsupportedTransfer(u8),

    /// Color management failure (profile construction or serialization)
    #[error("Color profile error: {0}")]
    Profile(String),

    /// Unsupported feature
    #[error("Unsupported: {0}")]
    Unsupported(&'static str),

    /// Caller-supplied data is inconsistent
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Image dimensions exceed configured limit
    #[error("Image too large: {width}x{height}")]
    ImageTooLarge {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Memory allocation failed
    #[error("Out of memory")]
    OutOfMemory,
}

impl From<moxcms::CmsError> for Error {
    fn from(err: moxcms::CmsError) -> Self {
        Error::Profile(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

/// Result type for zenavif-raster operations
pub type Result<T, E = Error> = core::result::Result<T, E>;

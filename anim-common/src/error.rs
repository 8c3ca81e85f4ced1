//! Error type shared by every codec operation.

/// Result alias used throughout the codec.
pub type Result<T, E = AnimError> = std::result::Result<T, E>;

/// Failure of a single encode/decode call.
///
/// Every variant aborts the current operation; there are no partial results.
#[derive(Debug, thiserror::Error)]
pub enum AnimError {
    #[error("Size limit exceeded: {0}")]
    SizeLimitExceeded(String),

    #[error("Address {address:#X} is not found in any of the provided segments")]
    AddressNotInAnySegment { address: u32 },

    #[error("Segment {segment:#04X} not found in segment list")]
    UnknownSegment { segment: u8 },

    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Translation {value} at unit scale {scale} does not fit a signed 16-bit value")]
    TranslationOutOfRange { value: f32, scale: f32 },

    #[error("Read of {len} bytes at {address:#X} is outside the {size:#X}-byte source")]
    OutOfBounds { address: u64, len: usize, size: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnimError {
    pub(crate) fn size(message: impl Into<String>) -> Self {
        Self::SizeLimitExceeded(message.into())
    }

    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Self::StructuralMismatch(message.into())
    }
}

//! Error types for image region and buffer operations.

use thiserror::Error;

/// Broad classification of an [`ImageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The image was used before it was configured or allocated.
    Configuration,
    /// The pixel buffer could not be reserved.
    Allocation,
    /// A pixel index fell outside the buffered region.
    OutOfBounds,
}

/// Errors that can occur while configuring or accessing an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// `allocate` was called before any region was set.
    #[error("no region set: call set_regions before allocate")]
    RegionNotSet,

    /// A buffer operation was attempted on an image without storage.
    #[error("image buffer is not allocated")]
    NotAllocated,

    /// Supplied pixel data does not match the region volume.
    #[error("buffer length mismatch: region holds {expected} pixels, got {got}")]
    LengthMismatch {
        /// Pixel count of the region.
        expected: usize,
        /// Length of the supplied data.
        got: usize,
    },

    /// The product of the region size does not fit in `usize`.
    #[error("region volume overflows: size {size:?}")]
    VolumeOverflow {
        /// Requested size along each dimension.
        size: Vec<usize>,
    },

    /// `origin + size` does not fit in the index type on some axis.
    #[error("region exceeds index range on axis {axis}: origin {origin}, size {size}")]
    IndexRangeOverflow {
        /// The offending dimension.
        axis: usize,
        /// Region origin on that axis.
        origin: i64,
        /// Region size on that axis.
        size: usize,
    },

    /// The allocator refused to reserve the buffer.
    #[error("cannot reserve buffer for {pixels} pixels")]
    OutOfMemory {
        /// Number of pixels requested.
        pixels: usize,
    },

    /// A pixel index lies outside the buffered region.
    #[error("index {index:?} outside region [{lower:?}, {upper:?})")]
    OutOfBounds {
        /// The rejected index.
        index: Vec<i64>,
        /// Inclusive lower corner of the region.
        lower: Vec<i64>,
        /// Exclusive upper corner of the region.
        upper: Vec<i64>,
    },
}

impl ImageError {
    /// Returns the class of failure this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageError::RegionNotSet
            | ImageError::NotAllocated
            | ImageError::LengthMismatch { .. } => ErrorKind::Configuration,
            ImageError::VolumeOverflow { .. }
            | ImageError::IndexRangeOverflow { .. }
            | ImageError::OutOfMemory { .. } => ErrorKind::Allocation,
            ImageError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
        }
    }
}

/// Result alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

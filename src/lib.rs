pub mod error;
pub mod image;
pub mod region;

pub use error::{ErrorKind, ImageError, Result};
pub use image::Image;
pub use region::{Index, Offset, Region, Size};

/// Volume of unsigned 16-bit samples, the layout used by the demo binaries.
pub type Volume = Image<u16, 3>;

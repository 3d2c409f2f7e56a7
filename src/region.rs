//! Lightweight index, size, and region value types.
//!
//! These are plain `Copy` values. They are passed around by value and never
//! shared, so an image and its callers each hold their own copy.

use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{ImageError, Result};

/// Position of a pixel, one signed coordinate per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Index<const D: usize>(pub [i64; D]);

/// Extent of a region, one unsigned count per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<const D: usize>(pub [usize; D]);

/// Signed displacement between two indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset<const D: usize>(pub [i64; D]);

impl<const D: usize> Index<D> {
    pub fn zero() -> Self {
        Self([0; D])
    }

    pub fn as_array(&self) -> [i64; D] {
        self.0
    }

    /// Shifts this index by `offset`, or `None` if any axis leaves `i64`.
    pub fn checked_add(self, offset: Offset<D>) -> Option<Index<D>> {
        let mut out = self.0;
        for (c, d) in out.iter_mut().zip(offset.0) {
            *c = c.checked_add(d)?;
        }
        Some(Index(out))
    }

    /// Displacement from `other` to this index, or `None` if any axis
    /// leaves `i64`.
    pub fn checked_sub(self, other: Index<D>) -> Option<Offset<D>> {
        let mut out = [0; D];
        for axis in 0..D {
            out[axis] = self.0[axis].checked_sub(other.0[axis])?;
        }
        Some(Offset(out))
    }
}

impl<const D: usize> Default for Index<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> From<[i64; D]> for Index<D> {
    fn from(coords: [i64; D]) -> Self {
        Self(coords)
    }
}

impl<const D: usize> std::ops::Index<usize> for Index<D> {
    type Output = i64;
    fn index(&self, axis: usize) -> &i64 {
        &self.0[axis]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Index<D> {
    fn index_mut(&mut self, axis: usize) -> &mut i64 {
        &mut self.0[axis]
    }
}

impl<const D: usize> fmt::Display for Index<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (axis, c) in self.0.iter().enumerate() {
            if axis > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

/// Panics on `i64` overflow in every build profile; use
/// [`Index::checked_add`] to handle it.
impl<const D: usize> Add<Offset<D>> for Index<D> {
    type Output = Index<D>;
    #[track_caller]
    fn add(self, rhs: Offset<D>) -> Index<D> {
        match self.checked_add(rhs) {
            Some(index) => index,
            None => panic!("index {} + offset {:?} overflows", self, rhs.0),
        }
    }
}

/// Panics on `i64` overflow in every build profile; use
/// [`Index::checked_sub`] to handle it.
impl<const D: usize> Sub for Index<D> {
    type Output = Offset<D>;
    #[track_caller]
    fn sub(self, rhs: Index<D>) -> Offset<D> {
        match self.checked_sub(rhs) {
            Some(offset) => offset,
            None => panic!("index {} - index {} overflows", self, rhs),
        }
    }
}

impl<const D: usize> Size<D> {
    /// Number of pixels covered, or `None` if the product overflows `usize`.
    pub fn volume(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }

    pub fn as_array(&self) -> [usize; D] {
        self.0
    }
}

impl<const D: usize> Default for Size<D> {
    fn default() -> Self {
        Self([0; D])
    }
}

impl<const D: usize> From<[usize; D]> for Size<D> {
    fn from(extent: [usize; D]) -> Self {
        Self(extent)
    }
}

impl<const D: usize> std::ops::Index<usize> for Size<D> {
    type Output = usize;
    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Size<D> {
    fn index_mut(&mut self, axis: usize) -> &mut usize {
        &mut self.0[axis]
    }
}

impl<const D: usize> From<[i64; D]> for Offset<D> {
    fn from(delta: [i64; D]) -> Self {
        Self(delta)
    }
}

/// Rectangular block of pixels: an origin index plus a size.
///
/// Bounds are half-open. On each axis `k` the valid coordinates are
/// `index[k]` through `index[k] + size[k] - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region<const D: usize> {
    index: Index<D>,
    size: Size<D>,
}

impl<const D: usize> Region<D> {
    pub fn new(index: [i64; D], size: [usize; D]) -> Self {
        Self {
            index: Index(index),
            size: Size(size),
        }
    }

    /// Region of the given size starting at the zero index.
    pub fn from_size(size: [usize; D]) -> Self {
        Self::new([0; D], size)
    }

    pub fn set_index(&mut self, index: Index<D>) {
        self.index = index;
    }

    pub fn set_size(&mut self, size: Size<D>) {
        self.size = size;
    }

    pub fn index(&self) -> Index<D> {
        self.index
    }

    pub fn size(&self) -> Size<D> {
        self.size
    }

    /// Total pixel count, or `None` on overflow.
    pub fn number_of_pixels(&self) -> Option<usize> {
        self.size.volume()
    }

    /// Exclusive upper corner, `index + size` on every axis.
    ///
    /// Fails if any axis leaves the `i64` range.
    pub fn upper_index(&self) -> Result<Index<D>> {
        let mut upper = [0; D];
        for axis in 0..D {
            let origin = self.index.0[axis];
            let size = self.size.0[axis];
            upper[axis] = i64::try_from(size)
                .ok()
                .and_then(|s| origin.checked_add(s))
                .ok_or(ImageError::IndexRangeOverflow { axis, origin, size })?;
        }
        Ok(Index(upper))
    }

    /// Whether `index` addresses a pixel inside this region.
    pub fn is_inside(&self, index: Index<D>) -> bool {
        (0..D).all(|axis| {
            let rel = index.0[axis] as i128 - self.index.0[axis] as i128;
            rel >= 0 && rel < self.size.0[axis] as i128
        })
    }
}

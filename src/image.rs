use log::{debug, warn};

use crate::error::{ImageError, Result};
use crate::region::{Index, Region};

/// Dense `D`-dimensional image holding one `T` per pixel.
///
/// An image starts out empty. Give it a region with [`Image::set_regions`],
/// reserve storage with [`Image::allocate`], then read and write pixels by
/// [`Index`]. Pixels are stored contiguously with the first axis varying
/// fastest.
///
/// `get_pixel` and `set_pixel` validate every index. They are meant for
/// occasional point access; walking the whole image is better done over
/// [`Image::data`] directly.
#[derive(Clone, Debug)]
pub struct Image<T, const D: usize> {
    region: Option<Region<D>>,
    allocated: bool,
    upper: Index<D>,
    strides: [usize; D],
    data: Vec<T>,
}

impl<T, const D: usize> Image<T, D> {
    /// Creates an image with no region and no storage.
    pub fn new() -> Self {
        Self {
            region: None,
            allocated: false,
            upper: Index::zero(),
            strides: [0; D],
            data: Vec::new(),
        }
    }

    /// Sets the region and allocates it in one step.
    pub fn with_region(region: Region<D>) -> Result<Self>
    where
        T: Default + Clone,
    {
        let mut image = Self::new();
        image.set_regions(region);
        image.allocate()?;
        Ok(image)
    }

    /// Wraps existing pixel data laid out in this crate's linear order.
    pub fn from_vec(region: Region<D>, data: Vec<T>) -> Result<Self> {
        let mut image = Self::new();
        image.set_regions(region);
        let (upper, pixels) = image.layout()?;
        if data.len() != pixels {
            return Err(ImageError::LengthMismatch {
                expected: pixels,
                got: data.len(),
            });
        }
        image.install(upper, data);
        Ok(image)
    }

    /// Configures the region. Any existing buffer is released; call
    /// [`Image::allocate`] again before touching pixels.
    pub fn set_regions(&mut self, region: Region<D>) {
        debug!(
            "image region set: index {}, size {:?}",
            region.index(),
            region.size().as_array()
        );
        self.region = Some(region);
        self.allocated = false;
        self.data = Vec::new();
    }

    /// Reserves storage for every pixel of the configured region.
    ///
    /// Pixel values are unspecified until [`Image::fill_buffer`] is called.
    /// On failure the image is left unallocated.
    ///
    /// The region must satisfy `index + size` within `i64` on every axis even
    /// when its volume is zero, so an empty region with an out-of-range extent
    /// fails with [`ImageError::IndexRangeOverflow`] rather than allocating an
    /// empty buffer.
    pub fn allocate(&mut self) -> Result<()>
    where
        T: Default + Clone,
    {
        self.allocated = false;
        self.data = Vec::new();

        let result = self.layout().and_then(|(upper, pixels)| {
            let mut data = Vec::new();
            data.try_reserve_exact(pixels)
                .map_err(|_| ImageError::OutOfMemory { pixels })?;
            data.resize(pixels, T::default());
            Ok((upper, data))
        });

        match result {
            Ok((upper, data)) => {
                debug!("image allocated: {} pixels", data.len());
                self.install(upper, data);
                Ok(())
            }
            Err(err) => {
                warn!("image allocation failed: {}", err);
                Err(err)
            }
        }
    }

    /// Validates the region and returns its exclusive upper corner and volume.
    fn layout(&self) -> Result<(Index<D>, usize)> {
        let region = self.region.ok_or(ImageError::RegionNotSet)?;
        let pixels = region
            .number_of_pixels()
            .ok_or_else(|| ImageError::VolumeOverflow {
                size: region.size().as_array().to_vec(),
            })?;
        let upper = region.upper_index()?;
        Ok((upper, pixels))
    }

    fn install(&mut self, upper: Index<D>, data: Vec<T>) {
        let size = self.region.map(|r| r.size().as_array()).unwrap_or([0; D]);

        // Prefix products can only overflow when some later axis is empty,
        // in which case no index is ever inside the region.
        let mut stride = 1usize;
        for axis in 0..D {
            self.strides[axis] = stride;
            stride = stride.saturating_mul(size[axis]);
        }

        self.upper = upper;
        self.data = data;
        self.allocated = true;
    }

    /// Sets every pixel to `value`.
    pub fn fill_buffer(&mut self, value: T) -> Result<()>
    where
        T: Clone,
    {
        if !self.allocated {
            return Err(ImageError::NotAllocated);
        }
        self.data.fill(value);
        Ok(())
    }

    /// Returns a copy of the pixel at `index`.
    pub fn get_pixel(&self, index: Index<D>) -> Result<T>
    where
        T: Copy,
    {
        let offset = self.compute_offset(index)?;
        Ok(self.data[offset])
    }

    /// Overwrites the pixel at `index`. The buffer is untouched on error.
    pub fn set_pixel(&mut self, index: Index<D>, value: T) -> Result<()> {
        let offset = self.compute_offset(index)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Reads a pixel without validating `index`.
    ///
    /// # Safety
    /// The image must be allocated and `index` must lie inside its region.
    #[inline]
    pub unsafe fn get_pixel_unchecked(&self, index: Index<D>) -> T
    where
        T: Copy,
    {
        debug_assert!(self.allocated && self.region.map_or(false, |r| r.is_inside(index)));
        let offset = self.linear_offset(index);
        // SAFETY: the caller guarantees the index is inside the allocated region.
        unsafe { *self.data.get_unchecked(offset) }
    }

    /// Writes a pixel without validating `index`.
    ///
    /// # Safety
    /// The image must be allocated and `index` must lie inside its region.
    #[inline]
    pub unsafe fn set_pixel_unchecked(&mut self, index: Index<D>, value: T) {
        debug_assert!(self.allocated && self.region.map_or(false, |r| r.is_inside(index)));
        let offset = self.linear_offset(index);
        // SAFETY: the caller guarantees the index is inside the allocated region.
        unsafe { *self.data.get_unchecked_mut(offset) = value };
    }

    /// Maps `index` to its position in [`Image::data`].
    pub fn compute_offset(&self, index: Index<D>) -> Result<usize> {
        let region = match self.region {
            Some(region) if self.allocated => region,
            _ => return Err(ImageError::NotAllocated),
        };
        if !region.is_inside(index) {
            return Err(ImageError::OutOfBounds {
                index: index.as_array().to_vec(),
                lower: region.index().as_array().to_vec(),
                upper: self.upper.as_array().to_vec(),
            });
        }
        Ok(self.linear_offset(index))
    }

    /// Maps a buffer position back to the pixel index it stores.
    pub fn compute_index(&self, offset: usize) -> Option<Index<D>> {
        if !self.allocated || offset >= self.data.len() {
            return None;
        }
        let origin = self.region?.index();
        let mut index = origin;
        let mut rest = offset;
        for axis in (0..D).rev() {
            let stride = self.strides[axis];
            index[axis] = origin[axis] + (rest / stride) as i64;
            rest %= stride;
        }
        Some(index)
    }

    #[inline]
    fn linear_offset(&self, index: Index<D>) -> usize {
        let origin = self.region.map(|r| r.index()).unwrap_or_default();
        let mut offset = 0;
        for axis in 0..D {
            offset += (index[axis] - origin[axis]) as usize * self.strides[axis];
        }
        offset
    }

    /// The configured region, whether or not it has been allocated.
    pub fn region(&self) -> Option<Region<D>> {
        self.region
    }

    /// The region backed by storage, if the image is allocated.
    pub fn buffered_region(&self) -> Option<Region<D>> {
        self.region.filter(|_| self.allocated)
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Number of stored pixels; zero when unallocated.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T, const D: usize> Default for Image<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const D: usize> std::ops::Index<Index<D>> for Image<T, D> {
    type Output = T;
    #[track_caller]
    fn index(&self, index: Index<D>) -> &T {
        match self.compute_offset(index) {
            Ok(offset) => &self.data[offset],
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T, const D: usize> std::ops::IndexMut<Index<D>> for Image<T, D> {
    #[track_caller]
    fn index_mut(&mut self, index: Index<D>) -> &mut T {
        match self.compute_offset(index) {
            Ok(offset) => &mut self.data[offset],
            Err(err) => panic!("{}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn small() -> Image<u8, 3> {
        Image::with_region(Region::new([1, -1, 0], [3, 2, 2])).unwrap()
    }

    #[test]
    fn test_allocate_without_region() {
        let mut image = Image::<u16, 3>::new();
        let err = image.allocate().unwrap_err();
        assert_eq!(err, ImageError::RegionNotSet);
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!image.is_allocated());
    }

    #[test]
    fn test_access_before_allocate() {
        let mut image = Image::<u16, 2>::new();
        image.set_regions(Region::from_size([2, 2]));
        assert_eq!(image.fill_buffer(1), Err(ImageError::NotAllocated));
        assert_eq!(image.get_pixel(Index([0, 0])), Err(ImageError::NotAllocated));
        assert_eq!(image.set_pixel(Index([0, 0]), 1), Err(ImageError::NotAllocated));
        assert_eq!(image.buffered_region(), None);
    }

    #[test]
    fn test_first_axis_varies_fastest() {
        let image = small();
        assert_eq!(image.len(), 12);
        assert_eq!(image.compute_offset(Index([1, -1, 0])), Ok(0));
        assert_eq!(image.compute_offset(Index([2, -1, 0])), Ok(1));
        assert_eq!(image.compute_offset(Index([1, 0, 0])), Ok(3));
        assert_eq!(image.compute_offset(Index([1, -1, 1])), Ok(6));
        assert_eq!(image.compute_offset(Index([3, 0, 1])), Ok(11));
    }

    #[test]
    fn test_compute_index_inverts_offset() {
        let image = small();
        for offset in 0..image.len() {
            let index = image.compute_index(offset).unwrap();
            assert_eq!(image.compute_offset(index), Ok(offset));
        }
        assert_eq!(image.compute_index(image.len()), None);
    }

    #[test]
    fn test_set_regions_releases_buffer() {
        let mut image = small();
        image.fill_buffer(7).unwrap();
        image.set_regions(Region::from_size([1, 1, 1]));
        assert!(!image.is_allocated());
        assert!(image.is_empty());
        assert_eq!(image.get_pixel(Index([0, 0, 0])), Err(ImageError::NotAllocated));

        image.allocate().unwrap();
        assert_eq!(image.buffered_region(), Some(Region::from_size([1, 1, 1])));
    }

    #[test]
    fn test_zero_volume_region() {
        let image = Image::<f32, 3>::with_region(Region::from_size([5, 0, 5])).unwrap();
        assert!(image.is_allocated());
        assert!(image.is_empty());
        let err = image.get_pixel(Index([0, 0, 0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn test_volume_overflow_leaves_unallocated() {
        let mut image = small();
        image.set_regions(Region::from_size([usize::MAX, 2, 1]));
        let err = image.allocate().unwrap_err();
        assert!(matches!(err, ImageError::VolumeOverflow { .. }));
        assert_eq!(err.kind(), ErrorKind::Allocation);
        assert!(!image.is_allocated());
    }

    #[test]
    fn test_index_range_overflow() {
        let mut image = Image::<u8, 1>::new();
        image.set_regions(Region::new([i64::MAX], [1]));
        assert_eq!(
            image.allocate(),
            Err(ImageError::IndexRangeOverflow {
                axis: 0,
                origin: i64::MAX,
                size: 1,
            })
        );
    }

    #[test]
    fn test_out_of_memory() {
        let mut image = Image::<u64, 1>::new();
        image.set_regions(Region::from_size([usize::MAX / 2]));
        let err = image.allocate().unwrap_err();
        assert_eq!(err, ImageError::OutOfMemory { pixels: usize::MAX / 2 });
        assert!(!image.is_allocated());
    }

    #[test]
    fn test_failed_set_leaves_buffer() {
        let mut image = small();
        image.fill_buffer(3).unwrap();
        let before = image.data().to_vec();
        let err = image.set_pixel(Index([4, 0, 0]), 9).unwrap_err();
        assert_eq!(
            err,
            ImageError::OutOfBounds {
                index: vec![4, 0, 0],
                lower: vec![1, -1, 0],
                upper: vec![4, 1, 2],
            }
        );
        assert_eq!(image.data(), &before[..]);
    }

    #[test]
    fn test_from_vec() {
        let region = Region::from_size([2, 2]);
        let image = Image::from_vec(region, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(image.get_pixel(Index([1, 0])), Ok(2));
        assert_eq!(image.get_pixel(Index([0, 1])), Ok(3));

        let err = Image::from_vec(region, vec![1, 2, 3]).unwrap_err();
        assert_eq!(err, ImageError::LengthMismatch { expected: 4, got: 3 });
    }

    #[test]
    fn test_unchecked_access() {
        let mut image = small();
        image.fill_buffer(0).unwrap();
        let index = Index([3, 0, 1]);
        unsafe {
            image.set_pixel_unchecked(index, 42);
            assert_eq!(image.get_pixel_unchecked(index), 42);
        }
        assert_eq!(image.get_pixel(index), Ok(42));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_unchecked_write_outside_region_asserts() {
        let mut image = Image::<u8, 2>::with_region(Region::from_size([2, 2])).unwrap();
        unsafe { image.set_pixel_unchecked(Index([2, 0]), 9) };
    }

    #[test]
    fn test_empty_region_with_overflowing_extent() {
        let mut image = Image::<u8, 2>::new();
        image.set_regions(Region::from_size([usize::MAX, 0]));
        assert_eq!(
            image.allocate(),
            Err(ImageError::IndexRangeOverflow {
                axis: 0,
                origin: 0,
                size: usize::MAX,
            })
        );
        assert!(!image.is_allocated());
    }

    #[test]
    fn test_index_operator() {
        let mut image = small();
        image[Index([2, 0, 1])] = 5;
        assert_eq!(image[Index([2, 0, 1])], 5);
    }

    #[test]
    #[should_panic(expected = "outside region")]
    fn test_index_operator_panics_out_of_bounds() {
        let image = small();
        let _ = image[Index([0, 0, 0])];
    }
}

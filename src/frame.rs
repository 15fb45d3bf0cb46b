// frame.rs — Single-channel 8-bit luminance frame.
//
// Row-major, tightly packed: pixel (x, y) lives at index y * width + x and
// the buffer length is exactly width * height. There is no stride padding,
// so a flat index can walk from the end of one row into the start of the
// next. The smoother relies on that (see gaussian.rs).

use std::fmt;

/// A luminance frame with runtime dimensions.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Frame {
    /// Create a black frame.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    /// Create a frame where every pixel has the same intensity.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Frame {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Wrap an existing buffer.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "frame buffer length ({}) must equal width * height ({})",
            data.len(),
            width * height,
        );
        Frame { data, width, height }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels (and bytes) in the frame.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Intensity at (x, y). x is column, y is row.
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.bounds_check(x, y);
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.bounds_check(x, y);
        self.data[y * self.width + x] = value;
    }

    /// Borrow row `y` as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Iterate over all pixels as `(x, y, value)` in raster order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % w, i / w, v))
    }

    /// Number of pixels equal to `value`.
    pub fn count_equal(&self, value: u8) -> usize {
        self.data.iter().filter(|&&v| v == value).count()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn bounds_check(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x},{y}) out of bounds for frame {}×{}",
            self.width,
            self.height,
        );
    }
}

// Small frames show up in test failures; print the top-left corner only.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frame {{ {}×{} }}", self.width, self.height)?;
        for y in 0..self.height.min(8) {
            write!(f, "  row {y}: {:?}", &self.row(y)[..self.width.min(16)])?;
            if self.width > 16 {
                write!(f, " ...")?;
            }
            writeln!(f)?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black() {
        let frame = Frame::new(4, 3);
        assert_eq!(frame.len(), 12);
        assert!(frame.pixels().all(|(_, _, v)| v == 0));
    }

    #[test]
    fn test_row_major_layout() {
        let frame = Frame::from_vec(3, 2, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(frame.get(0, 1), 4);
        assert_eq!(frame.get(2, 0), 3);
        assert_eq!(frame.row(1), &[4, 5, 6]);
    }

    #[test]
    fn test_pixels_raster_order() {
        let frame = Frame::from_vec(2, 2, vec![10, 20, 30, 40]);
        let collected: Vec<_> = frame.pixels().collect();
        assert_eq!(
            collected,
            vec![(0, 0, 10), (1, 0, 20), (0, 1, 30), (1, 1, 40)]
        );
    }

    #[test]
    fn test_set_and_count() {
        let mut frame = Frame::filled(5, 5, 128);
        frame.set(2, 3, 255);
        frame.set(4, 4, 255);
        assert_eq!(frame.count_equal(255), 2);
        assert_eq!(frame.count_equal(128), 23);
    }

    #[test]
    #[should_panic(expected = "width * height")]
    fn test_from_vec_length_mismatch() {
        Frame::from_vec(4, 4, vec![0; 15]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds() {
        let frame = Frame::new(4, 4);
        frame.get(4, 0);
    }
}

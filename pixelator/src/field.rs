//! Single-channel float grid used for the difference field and the
//! gradient magnitude map.

use imgref::{Img, ImgVec};

/// Single-channel floating point field.
///
/// Rows are stored contiguously with no padding; the data length is
/// always exactly `width * height`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldF {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl FieldF {
    /// Creates a new field filled with zeros.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Creates a field from a flat row-major vector.
    ///
    /// # Panics
    /// Panics if the data length doesn't match `width * height`.
    #[must_use]
    pub fn from_vec(data: Vec<f32>, width: usize, height: usize) -> Self {
        assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
        }
    }

    /// Field width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns a reference to a row.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Returns a mutable reference to a row.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Gets a single value.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Sets a single value.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Returns the raw data as a slice.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the field and returns an `ImgVec` for the public API.
    #[must_use]
    pub fn into_imgvec(self) -> ImgVec<f32> {
        Img::new(self.data, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let field = FieldF::new(7, 3);
        assert_eq!(field.width(), 7);
        assert_eq!(field.height(), 3);
        assert!(field.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_value_access() {
        let mut field = FieldF::new(10, 10);
        field.set(5, 3, 42.0);
        assert!((field.get(5, 3) - 42.0).abs() < 0.001);
    }

    #[test]
    fn test_row_access() {
        let mut field = FieldF::new(4, 4);
        field.row_mut(2)[1] = 99.0;
        assert!((field.row(2)[1] - 99.0).abs() < 0.001);
        assert!((field.get(1, 2) - 99.0).abs() < 0.001);
    }

    #[test]
    fn test_from_vec_roundtrip() {
        let data: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let field = FieldF::from_vec(data.clone(), 4, 3);
        assert_eq!(field.get(0, 0), 0.0);
        assert_eq!(field.get(3, 2), 11.0);

        let img = field.into_imgvec();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 3);
        assert_eq!(img.buf(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "assertion")]
    fn test_from_vec_wrong_length() {
        let _ = FieldF::from_vec(vec![0.0; 5], 4, 3);
    }
}

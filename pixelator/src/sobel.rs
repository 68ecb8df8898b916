//! Structural highlighter: directional Sobel gradients over the
//! combined difference field.
//!
//! The combined per-pixel difference sequence is reshaped to image-1's
//! dimensions and run through a separable Sobel derivative along each
//! axis. The output is the per-pixel gradient magnitude
//! `hypot(gx, gy)`, which highlights edges and structural change in
//! the difference field rather than raw magnitude. No score depends on
//! this map; it exists for visualization.

use crate::field::FieldF;
use crate::GradientKsize;

/// 5-tap Sobel derivative and smoothing kernels.
const DERIV_5: [f32; 5] = [-1.0, -2.0, 0.0, 2.0, 1.0];
const SMOOTH_5: [f32; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];

/// 3-tap Sobel derivative and smoothing kernels.
const DERIV_3: [f32; 3] = [-1.0, 0.0, 1.0];
const SMOOTH_3: [f32; 3] = [1.0, 2.0, 1.0];

impl GradientKsize {
    fn deriv(self) -> &'static [f32] {
        match self {
            Self::Three => &DERIV_3,
            Self::Five => &DERIV_5,
        }
    }

    fn smooth(self) -> &'static [f32] {
        match self {
            Self::Three => &SMOOTH_3,
            Self::Five => &SMOOTH_5,
        }
    }
}

/// Mirrors an out-of-range coordinate without repeating the edge
/// sample (reflect-101 border).
#[inline]
fn mirror(i: isize, n: isize) -> usize {
    if n == 1 {
        return 0;
    }
    let mut i = i;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

/// Correlates each row with a 1-D kernel.
fn correlate_rows(input: &FieldF, kernel: &[f32]) -> FieldF {
    let width = input.width();
    let height = input.height();
    let radius = (kernel.len() / 2) as isize;

    let mut output = FieldF::new(width, height);
    for y in 0..height {
        let in_row = input.row(y);
        let out_row = output.row_mut(y);
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, &coeff) in kernel.iter().enumerate() {
                let src = mirror(x as isize + k as isize - radius, width as isize);
                acc += coeff * in_row[src];
            }
            out_row[x] = acc;
        }
    }
    output
}

/// Correlates each column with a 1-D kernel.
fn correlate_cols(input: &FieldF, kernel: &[f32]) -> FieldF {
    let width = input.width();
    let height = input.height();
    let radius = (kernel.len() / 2) as isize;

    let mut output = FieldF::new(width, height);
    for y in 0..height {
        let out_row = output.row_mut(y);
        for (k, &coeff) in kernel.iter().enumerate() {
            let src_y = mirror(y as isize + k as isize - radius, height as isize);
            let in_row = input.row(src_y);
            for x in 0..width {
                out_row[x] += coeff * in_row[x];
            }
        }
    }
    output
}

/// Computes the Sobel gradient magnitude map of a difference field.
///
/// Applies the separable derivative kernel along x (smoothing along y)
/// and along y (smoothing along x), then combines the two directional
/// gradients as `hypot(gx, gy)` per pixel.
#[must_use]
pub(crate) fn gradient_magnitude(field: &FieldF, ksize: GradientKsize) -> FieldF {
    let deriv = ksize.deriv();
    let smooth = ksize.smooth();

    let gx = correlate_cols(&correlate_rows(field, deriv), smooth);
    let gy = correlate_cols(&correlate_rows(field, smooth), deriv);

    let width = field.width();
    let height = field.height();
    let mut out = FieldF::new(width, height);
    for y in 0..height {
        let gx_row = gx.row(y);
        let gy_row = gy.row(y);
        let out_row = out.row_mut(y);
        for x in 0..width {
            out_row[x] = gx_row[x].hypot(gy_row[x]);
        }
    }
    out
}

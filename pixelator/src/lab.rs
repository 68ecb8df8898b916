//! sRGB to CIELAB conversion.
//!
//! The perceptual metric works in CIELAB (D65 white point), where
//! Euclidean distance approximates visual difference far better than
//! raw RGB distance. The transform is sRGB decode -> linear RGB ->
//! XYZ -> L*a*b*, all in float precision.

use rgb::RGB8;

/// A color sample in CIELAB: `[L, a, b]`.
///
/// L is lightness (0 for black, 100 for diffuse white); a and b are
/// the two chroma axes.
pub type LabSample = [f32; 3];

/// sRGB transfer function (gamma decoding) - slow version.
#[inline]
fn srgb_to_linear_slow(v: u8) -> f32 {
    let v = f32::from(v) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Pre-computed sRGB to linear lookup table (256 entries).
static SRGB_TO_LINEAR_LUT: std::sync::LazyLock<[f32; 256]> = std::sync::LazyLock::new(|| {
    let mut lut = [0.0f32; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = srgb_to_linear_slow(i as u8);
    }
    lut
});

/// sRGB transfer function (gamma decoding) using lookup table.
#[inline]
#[must_use]
pub fn srgb_to_linear(v: u8) -> f32 {
    SRGB_TO_LINEAR_LUT[v as usize]
}

// D65 reference white.
const REF_X: f32 = 0.95047;
const REF_Y: f32 = 1.0;
const REF_Z: f32 = 1.08883;

/// CIELAB knee function.
#[inline]
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    const DELTA_CUBED: f32 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Converts an 8-bit sRGB sample to CIELAB.
#[must_use]
pub fn srgb_to_lab(px: RGB8) -> LabSample {
    let r = srgb_to_linear(px.r);
    let g = srgb_to_linear(px.g);
    let b = srgb_to_linear(px.b);

    // Linear RGB to XYZ (D65 illuminant).
    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    let fx = lab_f(x / REF_X);
    let fy = lab_f(y / REF_Y);
    let fz = lab_f(z / REF_Z);

    [
        116.0 * fy - 16.0,
        500.0 * (fx - fy),
        200.0 * (fy - fz),
    ]
}

/// Euclidean magnitude of a Lab sample (distance from the origin).
#[inline]
#[must_use]
pub fn lab_norm(s: LabSample) -> f64 {
    let l = f64::from(s[0]);
    let a = f64::from(s[1]);
    let b = f64::from(s[2]);
    (l * l + a * a + b * b).sqrt()
}

/// Euclidean distance between two Lab samples.
#[inline]
#[must_use]
pub fn lab_distance(s1: LabSample, s2: LabSample) -> f64 {
    let dl = f64::from(s2[0]) - f64::from(s1[0]);
    let da = f64::from(s2[1]) - f64::from(s1[1]);
    let db = f64::from(s2[2]) - f64::from(s1[2]);
    (dl * dl + da * da + db * db).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_is_origin() {
        let lab = srgb_to_lab(RGB8::new(0, 0, 0));
        assert!(lab[0].abs() < 1e-4);
        assert!(lab[1].abs() < 1e-4);
        assert!(lab[2].abs() < 1e-4);
    }

    #[test]
    fn test_white_lightness() {
        // Diffuse white: L = 100 with near-zero chroma.
        let lab = srgb_to_lab(RGB8::new(255, 255, 255));
        assert!((lab[0] - 100.0).abs() < 0.05, "L = {}", lab[0]);
        assert!(lab[1].abs() < 0.05, "a = {}", lab[1]);
        assert!(lab[2].abs() < 0.05, "b = {}", lab[2]);
    }

    #[test]
    fn test_gray_has_no_chroma() {
        for v in [32u8, 96, 160, 224] {
            let lab = srgb_to_lab(RGB8::new(v, v, v));
            assert!(lab[1].abs() < 0.05);
            assert!(lab[2].abs() < 0.05);
        }
    }

    #[test]
    fn test_lightness_monotonic() {
        let mut prev = -1.0f32;
        for v in 0..=255u8 {
            let lab = srgb_to_lab(RGB8::new(v, v, v));
            assert!(lab[0] > prev, "L not monotonic at {v}");
            prev = lab[0];
        }
    }

    #[test]
    fn test_distance_properties() {
        let a = srgb_to_lab(RGB8::new(200, 30, 40));
        let b = srgb_to_lab(RGB8::new(30, 200, 40));

        // Symmetric, non-negative, zero only for identical samples.
        assert!(lab_distance(a, b) > 0.0);
        assert!((lab_distance(a, b) - lab_distance(b, a)).abs() < 1e-12);
        assert_eq!(lab_distance(a, a), 0.0);
    }

    #[test]
    fn test_norm_matches_distance_from_black() {
        let s = srgb_to_lab(RGB8::new(120, 64, 230));
        let black = srgb_to_lab(RGB8::new(0, 0, 0));
        assert!((lab_norm(s) - lab_distance(black, s)).abs() < 1e-3);
    }

    #[test]
    fn test_lut_matches_slow_path() {
        for v in [0u8, 1, 10, 128, 254, 255] {
            assert_eq!(srgb_to_linear(v), srgb_to_linear_slow(v));
        }
    }
}

//! Main pixelator difference computation.
//!
//! Ties the two accumulators and the score combiner together: the
//! wraparound RGB metric, the CIELAB perceptual metric, and the
//! combined per-pixel difference sequence that feeds the structural
//! highlighter.

use imgref::ImgRef;
use rgb::RGB8;

use crate::encode::pack_rgb;
use crate::field::FieldF;
use crate::lab::{lab_distance, lab_norm, srgb_to_lab};
use crate::sobel::gradient_magnitude;
use crate::{BaselineReport, PixelatorError, PixelatorParams, ScoreSet};

/// Internal result type for the diff module (uses FieldF, not ImgVec).
pub(crate) struct InternalResult {
    pub scores: ScoreSet,
    pub heatmap: Option<FieldF>,
}

/// Per-image accumulation of the RGB metric.
///
/// Every pixel is packed into a 24-bit integer; the raw score is the
/// sum of each packed value reduced modulo 255.
fn rgb_pass(img: ImgRef<'_, RGB8>) -> (Vec<u32>, u64) {
    let mut packed = Vec::with_capacity(img.width() * img.height());
    let mut raw_score = 0u64;
    for px in img.pixels() {
        let val = pack_rgb(px);
        raw_score += u64::from(val % 255);
        packed.push(val);
    }
    (packed, raw_score)
}

/// Per-pixel wraparound difference between two packed sequences.
///
/// Each element is `(packed2 - packed1) mod 255` as a true
/// mathematical modulo: the result is always in `[0, 255)` even when
/// the subtraction goes negative. The metric is directional on
/// purpose; it is not an absolute difference.
fn rgb_diff_sequence(packed1: &[u32], packed2: &[u32]) -> Vec<u32> {
    packed1
        .iter()
        .zip(packed2)
        .map(|(&p1, &p2)| (i64::from(p2) - i64::from(p1)).rem_euclid(255) as u32)
        .collect()
}

/// Per-image accumulation of the perceptual metric.
///
/// Converts every pixel to CIELAB and sums the Euclidean magnitude of
/// each sample (distance from the Lab origin, not a difference).
fn lab_pass(img: ImgRef<'_, RGB8>) -> (Vec<crate::lab::LabSample>, f64) {
    let mut samples = Vec::with_capacity(img.width() * img.height());
    let mut raw_score = 0.0f64;
    for px in img.pixels() {
        let sample = srgb_to_lab(px);
        raw_score += lab_norm(sample);
        samples.push(sample);
    }
    (samples, raw_score)
}

/// Per-pixel Euclidean distance between two Lab sequences.
fn lab_diff_sequence(
    samples1: &[crate::lab::LabSample],
    samples2: &[crate::lab::LabSample],
) -> Vec<f64> {
    samples1
        .iter()
        .zip(samples2)
        .map(|(&s1, &s2)| lab_distance(s1, s2))
        .collect()
}

/// Combines the two normalized scores and derives the baseline report.
///
/// The percentage branch only runs when image-1's raw RGB score is
/// non-zero; an all-black image-1 takes the documented fallback branch
/// instead of dividing by zero. The two branches report different
/// quantities and are kept separate deliberately.
fn combine_scores(
    rgb_score: f64,
    lab_score: f64,
    raw_rgb_1: u64,
    raw_lab_1: f64,
    perimeter: f64,
) -> ScoreSet {
    let combined_score = rgb_score + lab_score;

    let baseline = if raw_rgb_1 != 0 {
        let baseline_rgb = raw_rgb_1 as f64 / perimeter;
        let baseline_lab = raw_lab_1 / perimeter;
        let pct_rgb = (baseline_rgb - rgb_score) / baseline_rgb;
        let pct_lab = (baseline_lab - lab_score) / baseline_lab;
        BaselineReport::Percentage {
            baseline_rgb,
            diff_rgb: 100.0 - pct_rgb * 100.0,
            baseline_lab,
            diff_lab: 100.0 - pct_lab * 100.0,
        }
    } else {
        let raw = raw_rgb_1 as f64;
        BaselineReport::DegenerateBaseline {
            raw_score: raw,
            scaled: raw * 100.0,
        }
    };

    ScoreSet {
        rgb_score,
        lab_score,
        combined_score,
        baseline,
    }
}

/// Computes the full pixelator comparison over two validated images.
///
/// Both inputs are already 3-channel and have identical dimensions;
/// validation happens in [`crate::pixelator`] before any accumulation.
pub(crate) fn compute_pixelator_imgref(
    img1: ImgRef<'_, RGB8>,
    img2: ImgRef<'_, RGB8>,
    params: &PixelatorParams,
) -> Result<InternalResult, PixelatorError> {
    let width = img1.width();
    let height = img1.height();
    let perimeter = (width + height) as f64;

    // RGB metric: packed values, per-image raw scores, wraparound diff.
    let (packed1, raw_rgb_1) = rgb_pass(img1);
    let (packed2, _raw_rgb_2) = rgb_pass(img2);
    let rgb_diff = rgb_diff_sequence(&packed1, &packed2);
    let rgb_added: u64 = rgb_diff.iter().map(|&d| u64::from(d)).sum();
    let rgb_score = rgb_added as f64 / perimeter;

    // Perceptual metric: Lab samples, magnitude totals, vector distances.
    let (lab1, raw_lab_1) = lab_pass(img1);
    let (lab2, _raw_lab_2) = lab_pass(img2);
    let lab_diff = lab_diff_sequence(&lab1, &lab2);
    let lab_added: f64 = lab_diff.iter().sum();
    let lab_score = lab_added / perimeter;

    let scores = combine_scores(rgb_score, lab_score, raw_rgb_1, raw_lab_1, perimeter);

    if !scores.is_finite() {
        return Err(PixelatorError::NonFiniteResult);
    }

    let heatmap = if params.compute_heatmap() {
        // Element-wise sum of the two difference sequences, reshaped to
        // image-1's dimensions, then gradient magnitude.
        let combined: Vec<f32> = rgb_diff
            .iter()
            .zip(&lab_diff)
            .map(|(&r, &l)| r as f32 + l as f32)
            .collect();
        let field = FieldF::from_vec(combined, width, height);
        let map = gradient_magnitude(&field, params.gradient_ksize());
        if map.data().iter().any(|v| !v.is_finite()) {
            return Err(PixelatorError::NonFiniteResult);
        }
        Some(map)
    } else {
        None
    };

    Ok(InternalResult { scores, heatmap })
}

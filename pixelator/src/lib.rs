//! # Pixelator
//!
//! A dual-metric image difference engine. Pixelator compares two
//! images and produces:
//!
//! - an integer wraparound difference score in packed-RGB space,
//! - a perceptual difference score in CIELAB space,
//! - their sum, the combined "pixelator value", and
//! - an optional Sobel gradient-magnitude heat map that highlights
//!   *structural* change in the combined per-pixel difference field.
//!
//! The intended use is comparing two renderings of near-identical
//! content (screenshot regression testing, graphics pipelines) where
//! both a single number and a spatial map of divergence are wanted.
//!
//! The RGB metric is intentionally directional: each per-pixel value
//! is `(packed2 - packed1) mod 255`, a signed wraparound reduced into
//! non-negative residue space, so swapping the inputs changes the
//! score. The CIELAB metric is a true vector distance and symmetric.
//! Both scores are normalized by `width1 + height1`, a perimeter-style
//! convention kept for numeric compatibility with earlier versions of
//! the metric.
//!
//! ## Example
//!
//! ```rust
//! use pixelator::{pixelator, PixelatorParams};
//! use imgref::Img;
//! use rgb::RGB8;
//!
//! let pixels: Vec<RGB8> = vec![RGB8::new(10, 10, 10); 4];
//! let img1 = Img::new(pixels.clone(), 2, 2);
//! let img2 = Img::new(pixels, 2, 2);
//!
//! let result = pixelator(img1.as_ref(), img2.as_ref(), &PixelatorParams::default()).unwrap();
//! assert_eq!(result.scores.combined_score, 0.0);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::excessive_precision)]

mod diff;
mod encode;
mod field;
mod lab;
mod sobel;

pub use encode::pack_rgb;
pub use lab::{lab_distance, lab_norm, srgb_to_lab, srgb_to_linear, LabSample};

use field::FieldF;

// Re-export imgref and rgb types for convenience.
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::{RGB, RGB8};

/// Error type for pixelator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PixelatorError {
    /// Image dimensions don't match. Both metrics zip the two pixel
    /// sequences index-aligned, so mismatched sizes are rejected
    /// outright rather than truncated.
    DimensionMismatch {
        /// First image width.
        w1: usize,
        /// First image height.
        h1: usize,
        /// Second image width.
        w2: usize,
        /// Second image height.
        h2: usize,
    },
    /// An input image has zero pixels.
    EmptyImage {
        /// Image width.
        width: usize,
        /// Image height.
        height: usize,
    },
    /// The color transform or a norm produced NaN or infinity.
    NonFiniteResult,
}

impl std::fmt::Display for PixelatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { w1, h1, w2, h2 } => {
                write!(f, "image dimensions don't match: {w1}x{h1} vs {w2}x{h2}")
            }
            Self::EmptyImage { width, height } => {
                write!(f, "image is empty: {width}x{height}")
            }
            Self::NonFiniteResult => {
                write!(f, "comparison produced a non-finite value")
            }
        }
    }
}

impl std::error::Error for PixelatorError {}

/// Kernel size for the structural highlighter's Sobel operator.
///
/// The exact size is a tunable, not a correctness requirement; 5 taps
/// is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientKsize {
    /// 3-tap derivative kernel.
    Three,
    /// 5-tap derivative kernel.
    #[default]
    Five,
}

/// Pixelator comparison parameters.
///
/// Use the builder pattern to construct:
/// ```rust
/// use pixelator::{GradientKsize, PixelatorParams};
///
/// let params = PixelatorParams::new()
///     .with_compute_heatmap(true)
///     .with_gradient_ksize(GradientKsize::Three);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PixelatorParams {
    compute_heatmap: bool,
    gradient_ksize: GradientKsize,
}

impl PixelatorParams {
    /// Creates a new `PixelatorParams` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to compute the gradient-magnitude heat map.
    ///
    /// When `true`, the result includes an `ImgVec<f32>` map the same
    /// shape as image 1. When `false` (default), the heatmap field is
    /// `None`, which is faster.
    #[must_use]
    pub fn with_compute_heatmap(mut self, compute_heatmap: bool) -> Self {
        self.compute_heatmap = compute_heatmap;
        self
    }

    /// Sets the Sobel kernel size used by the structural highlighter.
    #[must_use]
    pub fn with_gradient_ksize(mut self, ksize: GradientKsize) -> Self {
        self.gradient_ksize = ksize;
        self
    }

    /// Returns whether the heat map will be computed.
    #[must_use]
    pub fn compute_heatmap(&self) -> bool {
        self.compute_heatmap
    }

    /// Returns the Sobel kernel size.
    #[must_use]
    pub fn gradient_ksize(&self) -> GradientKsize {
        self.gradient_ksize
    }
}

/// Baseline-relative difference figures.
///
/// The percentage branch divides by image-1's own raw scores, so a
/// degenerate all-black image 1 takes a separate fallback branch
/// instead of dividing by zero. The two branches report different
/// quantities on purpose; they are documented behavior, not a bug to
/// unify.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaselineReport {
    /// Similarity-complement percentages relative to image-1's own
    /// magnitude. Values may leave `[0, 100]`.
    Percentage {
        /// Image-1 raw RGB score over the perimeter normalization.
        baseline_rgb: f64,
        /// `100 - pct_rgb * 100`.
        diff_rgb: f64,
        /// Image-1 raw Lab score over the perimeter normalization.
        baseline_lab: f64,
        /// `100 - pct_lab * 100`.
        diff_lab: f64,
    },
    /// Fallback when image-1's raw RGB score is exactly zero.
    DegenerateBaseline {
        /// The raw RGB score itself (zero).
        raw_score: f64,
        /// The raw score scaled by 100, reported in place of a
        /// percentage.
        scaled: f64,
    },
}

/// The scalar results of one comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSet {
    /// Normalized wraparound RGB difference.
    pub rgb_score: f64,
    /// Normalized CIELAB difference.
    pub lab_score: f64,
    /// The pixelator value: `rgb_score + lab_score`.
    pub combined_score: f64,
    /// Baseline-relative difference figures.
    pub baseline: BaselineReport,
}

impl ScoreSet {
    /// True when every scalar in the set is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        let baseline_finite = match self.baseline {
            BaselineReport::Percentage {
                baseline_rgb,
                diff_rgb,
                baseline_lab,
                diff_lab,
            } => {
                baseline_rgb.is_finite()
                    && diff_rgb.is_finite()
                    && baseline_lab.is_finite()
                    && diff_lab.is_finite()
            }
            BaselineReport::DegenerateBaseline { raw_score, scaled } => {
                raw_score.is_finite() && scaled.is_finite()
            }
        };
        self.rgb_score.is_finite()
            && self.lab_score.is_finite()
            && self.combined_score.is_finite()
            && baseline_finite
    }
}

/// Pixelator comparison result.
#[derive(Debug, Clone)]
pub struct PixelatorResult {
    /// The scalar scores.
    pub scores: ScoreSet,
    /// Gradient-magnitude map, same shape as image 1 (only present if
    /// `compute_heatmap` was set).
    pub heatmap: Option<ImgVec<f32>>,
}

/// Compares two sRGB images.
///
/// Inputs must already be 3-channel 8-bit RGB; channel normalization
/// (grayscale, RGBA, palette expansion) is the loader's concern. The
/// two images must have identical dimensions.
///
/// # Errors
/// Returns an error if:
/// - either image has zero pixels,
/// - the image dimensions don't match,
/// - any score or map value comes out non-finite.
///
/// # Example
/// ```rust
/// use pixelator::{pixelator, PixelatorParams, Img, RGB8};
///
/// let img1 = Img::new(vec![RGB8::new(0, 0, 0); 4], 2, 2);
/// let img2 = Img::new(vec![RGB8::new(40, 0, 0); 4], 2, 2);
///
/// let params = PixelatorParams::new().with_compute_heatmap(true);
/// let result = pixelator(img1.as_ref(), img2.as_ref(), &params)?;
/// println!("pixelator value: {:.10}", result.scores.combined_score);
/// # Ok::<(), pixelator::PixelatorError>(())
/// ```
pub fn pixelator(
    img1: ImgRef<RGB8>,
    img2: ImgRef<RGB8>,
    params: &PixelatorParams,
) -> Result<PixelatorResult, PixelatorError> {
    let (w1, h1) = (img1.width(), img1.height());
    let (w2, h2) = (img2.width(), img2.height());

    if w1 == 0 || h1 == 0 {
        return Err(PixelatorError::EmptyImage {
            width: w1,
            height: h1,
        });
    }
    if w2 == 0 || h2 == 0 {
        return Err(PixelatorError::EmptyImage {
            width: w2,
            height: h2,
        });
    }
    if w1 != w2 || h1 != h2 {
        return Err(PixelatorError::DimensionMismatch { w1, h1, w2, h2 });
    }

    let result = diff::compute_pixelator_imgref(img1, img2, params)?;

    Ok(PixelatorResult {
        scores: result.scores,
        heatmap: result.heatmap.map(FieldF::into_imgvec),
    })
}

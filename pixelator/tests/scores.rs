//! End-to-end scoring tests over synthesized images.

use imgref::Img;
use pixelator::{pixelator, BaselineReport, GradientKsize, PixelatorParams, RGB8};

/// Horizontal gradient image, useful as a non-trivial baseline.
fn gradient_img(width: usize, height: usize) -> Img<Vec<RGB8>> {
    let pixels: Vec<RGB8> = (0..width * height)
        .map(|i| {
            let x = i % width;
            let v = (x * 255 / width.max(1)) as u8;
            RGB8::new(v, v / 2, 255 - v)
        })
        .collect();
    Img::new(pixels, width, height)
}

#[test]
fn identical_gradients_are_zero_everywhere() {
    let img = gradient_img(24, 16);
    let params = PixelatorParams::new().with_compute_heatmap(true);
    let result = pixelator(img.as_ref(), img.as_ref(), &params).expect("valid input");

    assert_eq!(result.scores.rgb_score, 0.0);
    assert_eq!(result.scores.lab_score, 0.0);
    assert_eq!(result.scores.combined_score, 0.0);
    assert!(result
        .heatmap
        .expect("heatmap requested")
        .as_ref()
        .pixels()
        .all(|v| v.abs() < 1e-3));
}

#[test]
fn perimeter_normalization_is_exact() {
    // One pixel changed by a known packed delta: the RGB score must be
    // exactly delta / (w + h).
    let width = 10;
    let height = 6;
    let img1 = Img::new(vec![RGB8::new(50, 50, 50); width * height], width, height);
    let mut pixels2 = vec![RGB8::new(50, 50, 50); width * height];
    pixels2[17] = RGB8::new(50, 50, 53); // packed delta = 3
    let img2 = Img::new(pixels2, width, height);

    let result = pixelator(img1.as_ref(), img2.as_ref(), &PixelatorParams::default())
        .expect("valid input");
    let expected = 3.0 / (width + height) as f64;
    assert!(
        (result.scores.rgb_score - expected).abs() < 1e-12,
        "rgb_score = {}, expected {}",
        result.scores.rgb_score,
        expected
    );
}

#[test]
fn localized_change_lights_up_the_heatmap_there() {
    let width = 32;
    let height = 32;
    let img1 = gradient_img(width, height);

    // Same gradient, with a small block perturbed around (8, 8).
    let mut pixels2: Vec<RGB8> = img1.as_ref().pixels().collect();
    for y in 6..=10 {
        for x in 6..=10 {
            pixels2[y * width + x] = RGB8::new(255, 0, 255);
        }
    }
    let img2 = Img::new(pixels2, width, height);

    let params = PixelatorParams::new().with_compute_heatmap(true);
    let result = pixelator(img1.as_ref(), img2.as_ref(), &params).expect("valid input");
    let heatmap = result.heatmap.expect("heatmap requested");
    let map: Vec<f32> = heatmap.as_ref().pixels().collect();

    // The perturbed block's rim carries far more gradient energy than
    // the untouched far corner.
    let near = map[6 * width + 6].abs() + map[10 * width + 10].abs();
    let far = map[28 * width + 28].abs();
    assert!(
        near > far * 10.0,
        "expected localized response, near = {near}, far = {far}"
    );
    assert!(result.scores.combined_score > 0.0);
}

#[test]
fn both_kernel_sizes_produce_finite_maps() {
    let img1 = gradient_img(15, 9);
    let img2 = gradient_img(15, 9);

    for ksize in [GradientKsize::Three, GradientKsize::Five] {
        let params = PixelatorParams::new()
            .with_compute_heatmap(true)
            .with_gradient_ksize(ksize);
        let result = pixelator(img1.as_ref(), img2.as_ref(), &params).expect("valid input");
        let heatmap = result.heatmap.expect("heatmap requested");
        assert_eq!(heatmap.width(), 15);
        assert_eq!(heatmap.height(), 9);
        assert!(heatmap.as_ref().pixels().all(f32::is_finite));
    }
}

#[test]
fn percentage_branch_reports_both_metrics() {
    let img1 = gradient_img(12, 8);
    let img2 = Img::new(vec![RGB8::new(200, 100, 50); 12 * 8], 12, 8);

    let result = pixelator(img1.as_ref(), img2.as_ref(), &PixelatorParams::default())
        .expect("valid input");

    match result.scores.baseline {
        BaselineReport::Percentage {
            baseline_rgb,
            baseline_lab,
            diff_rgb,
            diff_lab,
        } => {
            assert!(baseline_rgb > 0.0);
            assert!(baseline_lab > 0.0);
            assert!(diff_rgb.is_finite());
            assert!(diff_lab.is_finite());
        }
        BaselineReport::DegenerateBaseline { .. } => {
            panic!("gradient image 1 has a non-zero raw RGB score")
        }
    }
}

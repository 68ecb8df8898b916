//! pixelator CLI - dual-metric image difference
//!
//! Compare two images, print the pixelator scores, and render the
//! structural difference heat map to a PNG.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ColorChoice, Parser, ValueEnum};
use colored::Colorize;
use image::DynamicImage;
use pixelator::{
    pixelator, BaselineReport, GradientKsize, Img, PixelatorParams, PixelatorResult, RGB8,
};
use serde::Serialize;

/// Pixelator image difference metric
///
/// Computes a combined difference score between two images: a
/// wraparound RGB score plus a perceptual CIELAB score, both
/// normalized by the first image's width + height. Identical images
/// score 0. A Sobel-highlighted heat map of the difference field is
/// written alongside the scores.
#[derive(Parser, Debug)]
#[command(name = "pixelator")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    Compare two renderings:
        pixelator expected.png actual.png

    CI mode - fail if the combined score exceeds a threshold:
        pixelator --max-score 5.0 expected.png actual.png

    Output JSON for scripting:
        pixelator --json expected.png actual.png

    Write the heat map somewhere specific:
        pixelator --heatmap diff.png expected.png actual.png

    Skip the heat map entirely:
        pixelator --no-heatmap expected.png actual.png

EXIT CODES:
    0 - Success (score within threshold if --max-score specified)
    1 - Score exceeded threshold (--max-score)
    2 - Error (file not found, invalid image, dimension mismatch)")]
struct Cli {
    /// First image (the baseline the scores are normalized against)
    #[arg(value_name = "IMAGE1")]
    image1: PathBuf,

    /// Second image
    #[arg(value_name = "IMAGE2")]
    image2: PathBuf,

    /// Output JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Quiet mode - only output the combined score
    #[arg(long, short = 's')]
    quiet: bool,

    /// Maximum acceptable combined score (exit code 1 if exceeded)
    #[arg(long, value_name = "SCORE")]
    max_score: Option<f64>,

    /// Heat map output file
    #[arg(long, value_name = "FILE", default_value = "pixelator_view_v2.png")]
    heatmap: PathBuf,

    /// Don't render the heat map
    #[arg(long)]
    no_heatmap: bool,

    /// Sobel kernel size for the structural highlighter
    #[arg(long, value_enum, default_value = "5")]
    ksize: KsizeArg,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum KsizeArg {
    #[value(name = "3")]
    Three,
    #[value(name = "5")]
    Five,
}

impl From<KsizeArg> for GradientKsize {
    fn from(k: KsizeArg) -> Self {
        match k {
            KsizeArg::Three => GradientKsize::Three,
            KsizeArg::Five => GradientKsize::Five,
        }
    }
}

#[derive(Serialize)]
struct JsonOutput {
    rgb_score: f64,
    lab_score: f64,
    combined_score: f64,
    baseline: JsonBaseline,
    image1: String,
    image2: String,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold_exceeded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    heatmap: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonBaseline {
    Percentage {
        baseline_rgb: f64,
        diff_rgb: f64,
        baseline_lab: f64,
        diff_lab: f64,
    },
    DegenerateBaseline {
        raw_score: f64,
        scaled: f64,
    },
}

impl From<BaselineReport> for JsonBaseline {
    fn from(b: BaselineReport) -> Self {
        match b {
            BaselineReport::Percentage {
                baseline_rgb,
                diff_rgb,
                baseline_lab,
                diff_lab,
            } => Self::Percentage {
                baseline_rgb,
                diff_rgb,
                baseline_lab,
                diff_lab,
            },
            BaselineReport::DegenerateBaseline { raw_score, scaled } => {
                Self::DegenerateBaseline { raw_score, scaled }
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_colors(&cli);

    match run(&cli) {
        Ok(exceeded) => {
            if exceeded {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn setup_colors(cli: &Cli) {
    match cli.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            if !io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

fn run(cli: &Cli) -> Result<bool, String> {
    let (img1, w, h) = load_rgb(&cli.image1, cli.quiet || cli.json)?;
    let (img2, _, _) = load_rgb(&cli.image2, cli.quiet || cli.json)?;

    let params = PixelatorParams::new()
        .with_compute_heatmap(!cli.no_heatmap)
        .with_gradient_ksize(cli.ksize.into());

    let result = pixelator(img1.as_ref(), img2.as_ref(), &params)
        .map_err(|e| format!("comparison failed: {e}"))?;

    let heatmap_path = if let Some(heatmap) = &result.heatmap {
        save_heatmap(heatmap.buf(), heatmap.width(), heatmap.height(), &cli.heatmap)?;
        if !cli.quiet && !cli.json {
            eprintln!("Heat map saved to: {}", cli.heatmap.display());
        }
        Some(cli.heatmap.display().to_string())
    } else {
        None
    };

    let exceeded = cli
        .max_score
        .map(|max| result.scores.combined_score > max);

    output_result(cli, &result, w, h, exceeded, heatmap_path)?;

    Ok(exceeded == Some(true))
}

/// Loads an image and normalizes it to 3-channel 8-bit RGB.
///
/// Any supported channel mode (grayscale, RGBA, palette) converts via
/// the standard conversion for that mode; a notice is printed when a
/// conversion actually happens.
fn load_rgb(path: &Path, silent: bool) -> Result<(Img<Vec<RGB8>>, u32, u32), String> {
    let dyn_img: DynamicImage =
        image::open(path).map_err(|e| format!("failed to load '{}': {}", path.display(), e))?;

    if dyn_img.color() != image::ColorType::Rgb8 && !silent {
        eprintln!(
            "Converting image from {:?} to RGB: {}",
            dyn_img.color(),
            path.display()
        );
    }

    let rgb = dyn_img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels: Vec<RGB8> = rgb
        .as_raw()
        .chunks_exact(3)
        .map(|c| RGB8::new(c[0], c[1], c[2]))
        .collect();

    Ok((
        Img::new(pixels, width as usize, height as usize),
        width,
        height,
    ))
}

/// Renders the gradient magnitude map through a diverging (coolwarm)
/// colormap, normalized to the map's maximum, and saves it as PNG.
fn save_heatmap(values: &[f32], width: usize, height: usize, path: &Path) -> Result<(), String> {
    let max_val = values.iter().copied().fold(0.0f32, f32::max).max(1.0);

    let mut rgb_data = Vec::with_capacity(width * height * 3);
    for &val in values {
        let (r, g, b) = coolwarm_color((val / max_val).clamp(0.0, 1.0));
        rgb_data.push(r);
        rgb_data.push(g);
        rgb_data.push(b);
    }

    image::save_buffer(
        path,
        &rgb_data,
        width as u32,
        height as u32,
        image::ExtendedColorType::Rgb8,
    )
    .map_err(|e| format!("failed to save heat map: {e}"))
}

/// Diverging coolwarm ramp: cool blue through neutral to warm red.
fn coolwarm_color(val: f32) -> (u8, u8, u8) {
    const COOL: (f32, f32, f32) = (59.0, 76.0, 192.0);
    const NEUTRAL: (f32, f32, f32) = (221.0, 221.0, 221.0);
    const WARM: (f32, f32, f32) = (180.0, 4.0, 38.0);

    let lerp = |a: (f32, f32, f32), b: (f32, f32, f32), t: f32| {
        (
            (a.0 + (b.0 - a.0) * t) as u8,
            (a.1 + (b.1 - a.1) * t) as u8,
            (a.2 + (b.2 - a.2) * t) as u8,
        )
    };

    let v = val.clamp(0.0, 1.0);
    if v < 0.5 {
        lerp(COOL, NEUTRAL, v * 2.0)
    } else {
        lerp(NEUTRAL, WARM, (v - 0.5) * 2.0)
    }
}

fn output_result(
    cli: &Cli,
    result: &PixelatorResult,
    width: u32,
    height: u32,
    exceeded: Option<bool>,
    heatmap_path: Option<String>,
) -> Result<(), String> {
    let scores = &result.scores;

    if cli.quiet {
        println!("{:.10}", scores.combined_score);
    } else if cli.json {
        let output = JsonOutput {
            rgb_score: scores.rgb_score,
            lab_score: scores.lab_score,
            combined_score: scores.combined_score,
            baseline: scores.baseline.into(),
            image1: cli.image1.display().to_string(),
            image2: cli.image2.display().to_string(),
            width,
            height,
            threshold_exceeded: exceeded,
            heatmap: heatmap_path,
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("failed to serialize JSON: {e}"))?;
        println!("{json}");
    } else {
        println!("Pixelator RGB value: {}", scores.rgb_score);
        println!("Pixelator LAB value: {}", scores.lab_score);

        let combined = format!("{:.10}", scores.combined_score);
        match cli.max_score {
            Some(max) if scores.combined_score > max => {
                println!(
                    "Pixelator value: {} (exceeds threshold {})",
                    combined.red().bold(),
                    max
                );
            }
            Some(_) => println!("Pixelator value: {}", combined.green()),
            None => println!("Pixelator value: {combined}"),
        }

        match scores.baseline {
            BaselineReport::Percentage {
                baseline_rgb,
                diff_rgb,
                baseline_lab,
                diff_lab,
            } => {
                println!("Total RGB Image Score: {baseline_rgb}");
                println!("RGB Image Difference: {diff_rgb}");
                println!("Total LAB Image Score: {baseline_lab}");
                println!("LAB Image Difference: {diff_lab}");
            }
            BaselineReport::DegenerateBaseline { raw_score, scaled } => {
                println!("Total Image Score: {raw_score}");
                println!("Image Difference: {scaled}");
            }
        }
    }

    let _ = io::stdout().flush();
    Ok(())
}

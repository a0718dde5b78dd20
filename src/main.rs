use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use contour_gesture::{
    Frame, FrameOutcome, GestureSmoother, Hsv, PipelineConfig, RecognizerBackend, SkinRange,
    process_frame, start_recognizer,
};
use crossbeam_channel::bounded;
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Count fingers in hand images by contour geometry", long_about = None)]
struct Args {
    /// Images to classify (defaults to every png/jpg/jpeg under ./demo)
    images: Vec<PathBuf>,

    /// Flip each image horizontally before classifying
    #[arg(long)]
    mirror: bool,

    /// Lower HSV skin bound as H,S,V (hue 0-180)
    #[arg(long, value_parser = parse_hsv)]
    skin_lower: Option<Hsv>,

    /// Upper HSV skin bound as H,S,V (hue 0-180)
    #[arg(long, value_parser = parse_hsv)]
    skin_upper: Option<Hsv>,

    /// Smallest contour area in px² accepted as a hand
    #[arg(long)]
    min_area: Option<f64>,

    /// Circularity above which a shape without valleys is a fist
    #[arg(long)]
    min_circularity: Option<f64>,

    /// Valley angle cutoff in degrees
    #[arg(long)]
    max_angle: Option<f64>,

    /// Treat the images as consecutive frames and also print the smoothed label
    #[arg(long)]
    sequence: bool,

    /// Number of frames the smoothed label votes over
    #[arg(long, default_value_t = 5)]
    smooth_window: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = build_config(&args)?;

    let images = if args.images.is_empty() {
        demo_images()?
    } else {
        args.images.clone()
    };
    if images.is_empty() {
        anyhow::bail!("未找到可用的测试图片");
    }

    log::info!("classifying {} images", images.len());
    if args.sequence {
        run_sequence(&images, config, args.mirror, args.smooth_window)
    } else {
        run_batch(&images, &config, args.mirror)
    }
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();

    if args.skin_lower.is_some() || args.skin_upper.is_some() {
        let defaults = SkinRange::default();
        let range = SkinRange::new(
            args.skin_lower.unwrap_or(defaults.lower()),
            args.skin_upper.unwrap_or(defaults.upper()),
        )
        .context("invalid skin range")?;
        config = config.with_skin_range(range);
    }
    if let Some(area) = args.min_area {
        config = config.with_min_contour_area(area);
    }
    if let Some(circularity) = args.min_circularity {
        config = config.with_min_fist_circularity(circularity);
    }
    if let Some(angle) = args.max_angle {
        config = config.with_max_valley_angle(angle);
    }

    config.validate().context("invalid pipeline configuration")?;
    Ok(config)
}

fn run_batch(images: &[PathBuf], config: &PipelineConfig, mirror: bool) -> Result<()> {
    let outcomes = images
        .par_iter()
        .map(|path| {
            let frame = load_frame(path, mirror)?;
            Ok(process_frame(&frame, config))
        })
        .collect::<Result<Vec<_>>>()?;

    for (path, outcome) in images.iter().zip(outcomes.iter()) {
        println!("{} -> {}", path.display(), describe(outcome));
    }
    Ok(())
}

fn run_sequence(
    images: &[PathBuf],
    config: PipelineConfig,
    mirror: bool,
    smooth_window: usize,
) -> Result<()> {
    let mut smoother = GestureSmoother::new(smooth_window).context("invalid smoothing window")?;

    let (frame_tx, frame_rx) = bounded(1);
    let (result_tx, result_rx) = bounded(1);
    let worker = start_recognizer(RecognizerBackend::Contour(config), frame_rx, result_tx)
        .context("failed to start recognizer")?;

    // One frame in flight at a time, so the worker never has to drop any.
    for path in images {
        let frame = load_frame(path, mirror)?;
        frame_tx
            .send(frame)
            .context("recognizer stopped unexpectedly")?;
        let recognized = result_rx
            .recv()
            .context("recognizer stopped unexpectedly")?;

        let smoothed = smoother.push(recognized.outcome.kind());
        println!(
            "{} -> {} | smoothed: {}",
            path.display(),
            describe(&recognized.outcome),
            smoothed.map_or("none", |kind| kind.label())
        );
    }

    drop(frame_tx);
    if worker.join().is_err() {
        anyhow::bail!("recognizer thread panicked");
    }
    Ok(())
}

fn describe(outcome: &FrameOutcome) -> String {
    match outcome {
        FrameOutcome::NoHand => "no hand detected".to_string(),
        FrameOutcome::Hand(hand) => format!(
            "{} | {:.0}% | fingers: {} | valleys: {}",
            hand.gesture.label(),
            hand.gesture.confidence * 100.0,
            hand.fingers.fingers,
            hand.fingers.valleys
        ),
    }
}

fn parse_hsv(value: &str) -> Result<Hsv, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [h, s, v] = parts.as_slice() else {
        return Err(format!("expected H,S,V, got `{value}`"));
    };
    let channel = |name: &str, raw: &str| {
        raw.parse::<u8>()
            .map_err(|err| format!("invalid {name} `{raw}`: {err}"))
    };
    Ok(Hsv::new(
        channel("hue", *h)?,
        channel("saturation", *s)?,
        channel("value", *v)?,
    ))
}

fn load_frame(path: &Path, mirror: bool) -> Result<Frame> {
    let image = image::open(path).with_context(|| format!("无法打开图片 {}", path.display()))?;
    let frame = Frame::from_image(&image)
        .with_context(|| format!("无法读取图片 {}", path.display()))?;
    Ok(if mirror { frame.mirrored() } else { frame })
}

fn demo_images() -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir("demo").context("读取 demo 目录失败")? {
        let entry = entry?;
        let path = entry.path();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if ["png", "jpg", "jpeg"]
                .iter()
                .any(|v| ext.eq_ignore_ascii_case(v))
            {
                images.push(path);
            }
        }
    }
    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hsv() {
        assert_eq!(parse_hsv("0,20,70"), Ok(Hsv::new(0, 20, 70)));
        assert_eq!(parse_hsv(" 20, 255 ,255"), Ok(Hsv::new(20, 255, 255)));
        assert!(parse_hsv("0,20").is_err());
        assert!(parse_hsv("0,20,300").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "contour-gesture",
            "--skin-upper",
            "25,255,255",
            "--max-angle",
            "80",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.skin_range.upper(), Hsv::new(25, 255, 255));
        assert_eq!(config.skin_range.lower(), SkinRange::default().lower());
        assert_eq!(config.max_valley_angle_deg, 80.0);
        assert_eq!(config.min_contour_area, 1000.0);
    }

    #[test]
    fn test_inverted_skin_range_rejected() {
        let args = Args::parse_from(["contour-gesture", "--skin-lower", "30,20,70"]);
        assert!(build_config(&args).is_err());
    }
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use yolodet_core::{
    ClassTable, OnnxSession, Yolo, YoloConfig, YoloSession,
    consts::{CONFIDENCE_THRESHOLD, DEFAULT_INPUT_SIZE, NMS_IOU_THRESHOLD},
    session_builder,
};

/// Runs a YOLO detector over a single image and prints the detections as JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the ONNX model file
    #[arg(long)]
    model: PathBuf,

    /// Input image
    #[arg(long)]
    image: PathBuf,

    /// JSON class table (array of {"label", "color"}); defaults to COCO
    #[arg(long)]
    classes: Option<PathBuf>,

    /// Confidence threshold for accepting detections
    #[arg(long, default_value_t = CONFIDENCE_THRESHOLD)]
    confidence: f32,

    /// IoU threshold for Non-Maximum Suppression
    #[arg(long, default_value_t = NMS_IOU_THRESHOLD)]
    iou: f32,

    /// Side length of the square model input
    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    input_size: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let classes = match &args.classes {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading class table {}", path.display()))?;
            let entries = serde_json::from_str(&raw)
                .with_context(|| format!("parsing class table {}", path.display()))?;
            ClassTable::new(entries)?
        }
        None => ClassTable::coco(),
    };
    info!("Class table loaded with {} classes", classes.len());

    info!("Loading image from: {}", args.image.display());
    let image = image::open(&args.image)
        .with_context(|| format!("opening image {}", args.image.display()))?;

    info!("Initializing ONNX Runtime session...");
    let model = Yolo::new(YoloConfig {
        input_size: args.input_size,
        confidence_threshold: args.confidence,
        iou_threshold: args.iou,
        ..YoloConfig::default()
    });
    let mut session = YoloSession::from_file(session_builder()?, model, classes, &args.model)?;

    info!("Running detection...");
    let output = session.run(&image)?;

    info!(
        raw = output.summary.raw_candidates,
        kept = output.summary.kept,
        rejected = output.summary.rejected_non_finite,
        elapsed_ms = output.summary.elapsed.as_millis() as u64,
        "detection finished"
    );

    for detection in &output.detections {
        info!(
            "  - {} {:.2} at ({:.0},{:.0})-({:.0},{:.0})",
            session.classes().label(detection.class_id),
            detection.score,
            detection.bbox.min.x,
            detection.bbox.min.y,
            detection.bbox.max.x,
            detection.bbox.max.y,
        );
    }

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

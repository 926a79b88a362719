use ndarray::{Array4, ArrayD};

use crate::{
    consts::{BATCH_SIZE, CONFIDENCE_THRESHOLD, DEFAULT_INPUT_SIZE, INPUT_CHANNELS, NMS_IOU_THRESHOLD},
    inference::model::Model,
};

/// A single-output YOLO-family detector whose raw output is a `[1, A, P]`
/// tensor: 4 geometry channels followed by per-class scores.
pub struct Yolo {
    config: YoloConfig,
}

pub type YoloInput = Array4<f32>;

/// Kept dynamic-rank so the decoder owns shape validation.
pub type YoloOutput = ArrayD<f32>;

#[derive(Clone, Debug)]
pub struct YoloConfig {
    /// Side length of the square model input.
    pub input_size: u32,
    pub batch_size: usize,
    pub input_channels: usize,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            batch_size: BATCH_SIZE,
            input_channels: INPUT_CHANNELS,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            iou_threshold: NMS_IOU_THRESHOLD,
        }
    }
}

impl Yolo {
    pub fn new(config: YoloConfig) -> Self {
        Self { config }
    }
}

impl Default for Yolo {
    fn default() -> Self {
        Self::new(YoloConfig::default())
    }
}

impl Model for Yolo {
    type Input = YoloInput;
    type Output = YoloOutput;
    type Config = YoloConfig;

    const INPUT_NAME: &'static str = "images";

    const OUTPUT_NAME: &'static str = "output0";

    const MODEL_NAME: &'static str = "yolo";

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

/// The number of values representing bounding box coordinates in YOLO format.
///
/// YOLO format uses 4 values: [center_x, center_y, width, height]
/// This constant defines the offset where class score data begins
/// in the model output tensor.
pub const CXYWH_OFFSET: usize = 4;

/// Number of color channels in the input image tensor (RGB).
pub const INPUT_CHANNELS: usize = 3;

/// Batch size for model inference. The pipeline processes one image
/// per invocation; independent invocations may run concurrently.
pub const BATCH_SIZE: usize = 1;

/// Default side length of the square model input, in pixels.
///
/// 640 is the canonical input size for the YOLO detector family.
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Minimum confidence score for accepting a detection.
///
/// Predictions whose best class score falls below this threshold never
/// become candidates. Lower values admit more (and noisier) detections.
pub const CONFIDENCE_THRESHOLD: f32 = 0.25;

/// IoU threshold for Non-Maximum Suppression (NMS).
///
/// When two boxes overlap with IoU at or above this threshold, the one
/// with the lower confidence is suppressed.
pub const NMS_IOU_THRESHOLD: f32 = 0.45;

/// Guards the IoU division against degenerate zero-area boxes.
pub const IOU_EPSILON: f32 = 1e-6;

/// Label reported for class ids beyond the class table's bounds.
pub const FALLBACK_LABEL: &str = "object";

/// Display color reported for class ids beyond the class table's bounds.
pub const FALLBACK_COLOR: [u8; 3] = [255, 0, 0];

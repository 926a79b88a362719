use std::time::Duration;

use glam::Vec2;
use serde::Serialize;

use crate::analysis::bbox::Bbox;

/// A raw prediction that survived confidence filtering, still in
/// input-tensor pixel space (center x, center y, width, height).
///
/// Candidates are ephemeral: the remapper consumes them immediately.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    pub score: f32,
    pub class_id: usize,
}

/// A final detection in original-image pixel space.
#[derive(Clone, Debug, Serialize)]
pub struct Detection {
    pub bbox: Bbox,
    pub score: f32,
    pub class_id: usize,
}

/// Summary statistics for one pipeline run. Observability side value,
/// not part of the detection contract.
#[derive(Clone, Debug, Serialize)]
pub struct DetectSummary {
    /// Candidates that passed the confidence threshold.
    pub raw_candidates: usize,
    /// Candidates dropped for non-finite geometry or score.
    pub rejected_non_finite: usize,
    /// Detections remaining after suppression.
    pub kept: usize,
    /// Original image dimensions in pixels.
    pub image_size: Vec2,
    /// Wall-clock time for the run.
    pub elapsed: Duration,
}

/// The pipeline's output: detections ordered by descending score, plus
/// run statistics.
#[derive(Clone, Debug, Serialize)]
pub struct DetectOutput {
    pub detections: Vec<Detection>,
    pub summary: DetectSummary,
}

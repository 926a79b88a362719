use std::{cmp::Ordering, collections::VecDeque};

use crate::detection::Detection;

/// Greedy Non-Maximum Suppression.
///
/// Sorts detections by descending score (stable, so ties keep their original
/// order), then repeatedly keeps the best remaining detection and drops every
/// remaining one whose IoU with it reaches `iou_threshold`. Suppression is
/// class-agnostic: boxes of different classes compete with each other.
///
/// The result is ordered by descending score, is always a subset of the
/// input, and never mutates box geometry. O(n²) in the candidate count,
/// which is small after confidence filtering.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    if detections.len() <= 1 {
        return detections;
    }

    detections.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut remaining: VecDeque<Detection> = detections.into();
    let mut keep = Vec::new();
    while let Some(best) = remaining.pop_front() {
        remaining.retain(|other| best.bbox.iou(&other.bbox) < iou_threshold);
        keep.push(best);
    }

    keep
}

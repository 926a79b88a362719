pub mod decode;
pub mod letterbox;
pub mod nms;
pub mod remap;

use std::time::Instant;

use glam::Vec2;
use ndarray::ArrayViewD;
use tracing::debug;

use crate::{
    consts::{CONFIDENCE_THRESHOLD, NMS_IOU_THRESHOLD},
    detection::{DetectOutput, DetectSummary},
    error::DetectError,
    pipeline::letterbox::LetterboxParams,
};

/// Thresholds applied during postprocessing.
#[derive(Clone, Copy, Debug)]
pub struct PostprocessOpts {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl Default for PostprocessOpts {
    fn default() -> Self {
        Self {
            confidence_threshold: CONFIDENCE_THRESHOLD,
            iou_threshold: NMS_IOU_THRESHOLD,
        }
    }
}

/// Runs the full postprocessing pipeline over a raw `[1, A, P]` output
/// tensor: decode → remap to image space → suppress duplicates.
///
/// `params` and `image_size` must be the ones used to build the model input
/// for this image. The returned detections are ordered by descending score;
/// zero detections above threshold is a successful empty result, while a
/// malformed tensor is a reported error.
pub fn postprocess(
    output: ArrayViewD<'_, f32>,
    params: &LetterboxParams,
    image_size: Vec2,
    num_classes: usize,
    opts: PostprocessOpts,
) -> Result<DetectOutput, DetectError> {
    let started = Instant::now();

    let decoded = decode::decode(output, opts.confidence_threshold, num_classes)?;
    let raw_candidates = decoded.candidates.len();

    let detections: Vec<_> = decoded
        .candidates
        .iter()
        .map(|candidate| remap::remap(candidate, params, image_size))
        .collect();
    let detections = nms::non_max_suppression(detections, opts.iou_threshold);

    debug!(
        raw = raw_candidates,
        kept = detections.len(),
        rejected = decoded.rejected_non_finite,
        "postprocess finished"
    );

    let summary = DetectSummary {
        raw_candidates,
        rejected_non_finite: decoded.rejected_non_finite,
        kept: detections.len(),
        image_size,
        elapsed: started.elapsed(),
    };

    Ok(DetectOutput {
        detections,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CXYWH_OFFSET;
    use ndarray::Array3;

    fn output_tensor(classes: usize, predictions: usize) -> Array3<f32> {
        Array3::zeros([1, CXYWH_OFFSET + classes, predictions])
    }

    fn set_prediction(output: &mut Array3<f32>, i: usize, cxywh: [f32; 4], scores: &[f32]) {
        for (a, v) in cxywh.iter().enumerate() {
            output[[0, a, i]] = *v;
        }
        for (c, v) in scores.iter().enumerate() {
            output[[0, CXYWH_OFFSET + c, i]] = *v;
        }
    }

    #[test]
    fn test_end_to_end_two_overlapping_boxes() {
        // Square image, identity letterbox. Two heavily overlapping boxes:
        // the 0.9 one survives, the 0.6 one is suppressed.
        let params = LetterboxParams::new(640.0, 640.0, 640).unwrap();
        let image_size = Vec2::new(640.0, 640.0);

        let mut output = output_tensor(2, 3);
        set_prediction(&mut output, 0, [100.0, 100.0, 100.0, 100.0], &[0.9, 0.1]);
        set_prediction(&mut output, 1, [105.0, 100.0, 100.0, 100.0], &[0.6, 0.2]);
        // Disjoint third box, different class
        set_prediction(&mut output, 2, [500.0, 500.0, 50.0, 50.0], &[0.1, 0.7]);

        let out = postprocess(
            output.view().into_dyn(),
            &params,
            image_size,
            2,
            PostprocessOpts::default(),
        )
        .unwrap();

        assert_eq!(out.detections.len(), 2);
        assert_eq!(out.detections[0].score, 0.9);
        assert_eq!(out.detections[0].class_id, 0);
        assert_eq!(out.detections[1].score, 0.7);
        assert_eq!(out.detections[1].class_id, 1);

        assert_eq!(out.summary.raw_candidates, 3);
        assert_eq!(out.summary.kept, 2);
        assert_eq!(out.summary.rejected_non_finite, 0);
    }

    #[test]
    fn test_detections_land_in_image_space() {
        // 1920x1080 source: tensor coordinates must be unletterboxed.
        let params = LetterboxParams::new(1920.0, 1080.0, 640).unwrap();
        let image_size = Vec2::new(1920.0, 1080.0);

        let mut output = output_tensor(1, 1);
        // Center of the letterboxed area maps back to the image center
        set_prediction(&mut output, 0, [320.0, 320.0, 60.0, 30.0], &[0.9]);

        let out = postprocess(
            output.view().into_dyn(),
            &params,
            image_size,
            1,
            PostprocessOpts::default(),
        )
        .unwrap();

        let center = out.detections[0].bbox.center();
        assert!((center.x - 960.0).abs() < 1e-3);
        assert!((center.y - 540.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_result_is_ok() {
        let params = LetterboxParams::new(640.0, 640.0, 640).unwrap();
        let output = output_tensor(2, 100);

        let out = postprocess(
            output.view().into_dyn(),
            &params,
            Vec2::new(640.0, 640.0),
            2,
            PostprocessOpts::default(),
        )
        .unwrap();

        assert!(out.detections.is_empty());
        assert_eq!(out.summary.kept, 0);
    }

    #[test]
    fn test_bad_shape_propagates() {
        let params = LetterboxParams::new(640.0, 640.0, 640).unwrap();
        let output = Array3::<f32>::zeros([1, 4, 100]);

        let err = postprocess(
            output.view().into_dyn(),
            &params,
            Vec2::new(640.0, 640.0),
            2,
            PostprocessOpts::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DetectError::TensorShape { .. }));
    }
}

use glam::Vec2;

use crate::{
    analysis::bbox::Bbox,
    detection::{Candidate, Detection},
    pipeline::letterbox::LetterboxParams,
};

/// Converts a candidate from input-tensor space into a [`Detection`] in
/// original-image pixel space.
///
/// Center/size become corners, the letterbox mapping is inverted, and the
/// corners are clamped to `[0, imgW] × [0, imgH]`. Score and class id pass
/// through unchanged. Pure function.
pub fn remap(candidate: &Candidate, params: &LetterboxParams, image_size: Vec2) -> Detection {
    let tensor_box = Bbox::from_center_size(
        Vec2::new(candidate.cx, candidate.cy),
        Vec2::new(candidate.w, candidate.h),
    );

    let bbox = Bbox::new(
        params.to_image(tensor_box.min),
        params.to_image(tensor_box.max),
    )
    .clamp(Vec2::ZERO, image_size);

    Detection {
        bbox,
        score: candidate.score,
        class_id: candidate.class_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(cx: f32, cy: f32, w: f32, h: f32) -> Candidate {
        Candidate {
            cx,
            cy,
            w,
            h,
            score: 0.9,
            class_id: 3,
        }
    }

    #[test]
    fn test_inverts_letterbox() {
        // 1920x1080 into 640: scale 1/3, pad_y 140. A box centered at
        // (320, 320) in tensor space sits at (960, 540) in image space.
        let params = LetterboxParams::new(1920.0, 1080.0, 640).unwrap();
        let image_size = Vec2::new(1920.0, 1080.0);

        let det = remap(&candidate(320.0, 320.0, 60.0, 30.0), &params, image_size);
        let center = det.bbox.center();
        assert!((center.x - 960.0).abs() < 1e-3);
        assert!((center.y - 540.0).abs() < 1e-3);

        // Sizes scale by 1/scale = 3
        assert!((det.bbox.max.x - det.bbox.min.x - 180.0).abs() < 1e-3);
        assert!((det.bbox.max.y - det.bbox.min.y - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_score_and_class_unchanged() {
        let params = LetterboxParams::new(640.0, 640.0, 640).unwrap();
        let det = remap(
            &candidate(100.0, 100.0, 10.0, 10.0),
            &params,
            Vec2::new(640.0, 640.0),
        );
        assert_eq!(det.score, 0.9);
        assert_eq!(det.class_id, 3);
    }

    #[test]
    fn test_output_clamped_to_image() {
        let params = LetterboxParams::new(1920.0, 1080.0, 640).unwrap();
        let image_size = Vec2::new(1920.0, 1080.0);

        // A box hanging off the top-left of the padded region
        let det = remap(&candidate(2.0, 138.0, 40.0, 40.0), &params, image_size);
        assert!(det.bbox.min.x >= 0.0 && det.bbox.min.y >= 0.0);
        assert!(det.bbox.max.x <= image_size.x && det.bbox.max.y <= image_size.y);

        // And one hanging off the bottom-right
        let det = remap(&candidate(639.0, 499.0, 80.0, 80.0), &params, image_size);
        assert!(det.bbox.max.x <= image_size.x && det.bbox.max.y <= image_size.y);
    }
}

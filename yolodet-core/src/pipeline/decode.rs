use ndarray::{ArrayViewD, Axis, Ix3, s};
use snafu::{ResultExt, ensure};
use tracing::warn;

use crate::{
    consts::CXYWH_OFFSET,
    detection::Candidate,
    error::{ConfigSnafu, DetectError, ShapeSnafu, TensorShapeSnafu},
};

/// Decoded candidate list plus the counters the run summary reports.
#[derive(Debug, Default)]
pub struct DecodeResult {
    pub candidates: Vec<Candidate>,
    /// Predictions dropped for non-finite geometry or score.
    pub rejected_non_finite: usize,
}

/// Walks a raw `[1, A, P]` output tensor and collects one [`Candidate`] per
/// prediction whose best class score reaches `confidence_threshold`.
///
/// The first 4 attribute channels are box geometry (cx, cy, w, h) in
/// input-tensor pixels; the remaining `A - 4` channels are per-class scores.
/// The best class is picked by strict `>` comparison, so ties keep the lowest
/// class index.
///
/// A tensor whose rank is not 3, whose batch axis is not 1, or whose
/// attribute count is 4 or less is a structural error and aborts the run;
/// it is never reported as an empty result. Per-prediction non-finite values
/// only reject that prediction and are counted in the result.
pub fn decode(
    output: ArrayViewD<'_, f32>,
    confidence_threshold: f32,
    num_classes: usize,
) -> Result<DecodeResult, DetectError> {
    ensure!(
        num_classes > 0,
        ConfigSnafu {
            message: "number of recognized classes must be positive",
        }
    );

    let dims = output.shape().to_vec();
    ensure!(
        dims.len() == 3 && dims[0] == 1 && dims[1] > CXYWH_OFFSET,
        TensorShapeSnafu { dims }
    );
    let output = output
        .into_dimensionality::<Ix3>()
        .context(ShapeSnafu { stage: "decode" })?;

    let class_channels = dims[1] - CXYWH_OFFSET;
    let scanned = class_channels.min(num_classes);
    if class_channels != num_classes {
        warn!(
            tensor_classes = class_channels,
            table_classes = num_classes,
            scanned,
            "class channel count does not match the class table, truncating the scan"
        );
    }

    let view = output.slice(s![0, .., ..]);
    let mut result = DecodeResult::default();

    for prediction in view.axis_iter(Axis(1)) {
        let geometry = prediction.slice(s![0..CXYWH_OFFSET]);
        let scores = prediction.slice(s![CXYWH_OFFSET..CXYWH_OFFSET + scanned]);

        // Strict `>` keeps the lowest class index on ties.
        let mut class_id = 0usize;
        let mut score = scores[0_usize];
        for (idx, &s) in scores.iter().enumerate().skip(1) {
            if s > score {
                class_id = idx;
                score = s;
            }
        }

        // NaN scores fail this comparison and fall through to the finite
        // check below.
        if score < confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (
            geometry[0_usize],
            geometry[1_usize],
            geometry[2_usize],
            geometry[3_usize],
        );
        if ![cx, cy, w, h, score].iter().all(|v| v.is_finite()) {
            result.rejected_non_finite += 1;
            warn!(cx, cy, w, h, score, "rejecting prediction with non-finite values");
            continue;
        }

        result.candidates.push(Candidate {
            cx,
            cy,
            w,
            h,
            score,
            class_id,
        });
    }

    Ok(result)
}

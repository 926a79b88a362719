use std::{path::Path, time::Instant};

use glam::Vec2;
use image::{DynamicImage, GenericImageView};
use ort::{
    session::{Session, builder::SessionBuilder},
    value::TensorRef,
};
use snafu::{OptionExt, ResultExt};
use tracing::debug;

use crate::{
    analysis::classes::ClassTable,
    detection::DetectOutput,
    error::*,
    inference::model::{Model, OnnxSession},
    pipeline::{self, PostprocessOpts, letterbox, letterbox::LetterboxParams},
};

use super::model::Yolo;

/// ONNX Runtime session wrapper running the full detection pipeline for
/// one YOLO model.
///
/// The session is an explicit handle passed around by the caller; there is
/// no shared global state, so separate sessions can process images in
/// parallel.
pub struct YoloSession<M: Model> {
    session: Session,
    model: M,
    classes: ClassTable,
}

/// Per-image state threaded from preprocessing into postprocessing.
pub struct FrameMeta {
    /// Original image dimensions in pixels.
    pub image_size: Vec2,
    /// Letterbox transform used to build the input tensor.
    pub letterbox: LetterboxParams,
    /// Start of the run, for the summary's elapsed time.
    pub started: Instant,
}

impl YoloSession<Yolo> {
    /// Commits an ONNX Runtime session for a model file on disk.
    ///
    /// An unreadable or invalid model surfaces as an init error; the
    /// pipeline never substitutes default output for it.
    pub fn from_file<P: AsRef<Path>>(
        builder: SessionBuilder,
        model: Yolo,
        classes: ClassTable,
        path: P,
    ) -> Result<Self, DetectError> {
        let session = builder
            .commit_from_file(path)
            .context(OrtInitSnafu { stage: "commit" })?;

        Ok(Self {
            session,
            model,
            classes,
        })
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn config(&self) -> &<Yolo as Model>::Config {
        self.model.config()
    }
}

impl OnnxSession<Yolo> for YoloSession<Yolo> {
    type Output = DetectOutput;
    type Meta = FrameMeta;

    fn preprocess(
        &self,
        image: &DynamicImage,
    ) -> Result<(<Yolo as Model>::Input, FrameMeta), DetectError> {
        let started = Instant::now();
        let (w0, h0) = image.dimensions();

        let (input, params) = letterbox::preprocess(image, self.model.config().input_size)?;

        Ok((
            input,
            FrameMeta {
                image_size: Vec2::new(w0 as f32, h0 as f32),
                letterbox: params,
                started,
            },
        ))
    }

    fn infer(
        &mut self,
        input: <Yolo as Model>::Input,
        input_name: &str,
        output_name: &str,
    ) -> Result<<Yolo as Model>::Output, DetectError> {
        let output = self
            .session
            .run(ort::inputs![
                input_name => TensorRef::from_array_view(&input).context(TensorSnafu { stage: "input" })?
            ])
            .context(InferenceSnafu {})?;

        // Extract the named output tensor; the decoder validates its shape.
        let tensor = output
            .get(output_name)
            .context(NotFoundOutputSnafu { output_name })?
            .try_extract_array::<f32>()
            .context(TensorSnafu { stage: "extract" })?;

        Ok(tensor.to_owned())
    }

    fn postprocess(
        &self,
        output: <Yolo as Model>::Output,
        meta: FrameMeta,
    ) -> Result<DetectOutput, DetectError> {
        let config = self.model.config();
        let opts = PostprocessOpts {
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
        };

        let mut out = pipeline::postprocess(
            output.view(),
            &meta.letterbox,
            meta.image_size,
            self.classes.len(),
            opts,
        )?;

        // Report elapsed time for the whole run, not just postprocessing.
        out.summary.elapsed = meta.started.elapsed();

        debug!(
            kept = out.summary.kept,
            elapsed_ms = out.summary.elapsed.as_millis() as u64,
            model = Yolo::MODEL_NAME,
            "pipeline run finished"
        );

        Ok(out)
    }
}

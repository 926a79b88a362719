use image::DynamicImage;
use ort::{
    execution_providers::CPUExecutionProvider,
    session::{
        Session,
        builder::{GraphOptimizationLevel, SessionBuilder},
    },
};
use snafu::ResultExt;

use crate::error::{DetectError, OrtInitSnafu};

/// Static description of an ONNX detection model: tensor types and the
/// input/output names baked into the graph.
pub trait Model {
    type Input;
    type Output;
    type Config;

    const INPUT_NAME: &'static str;
    const OUTPUT_NAME: &'static str;
    const MODEL_NAME: &'static str;

    fn config(&self) -> &Self::Config;
}

/// A session that can run one image through preprocess → infer → postprocess.
///
/// `Meta` carries the per-image state (letterbox parameters, original size)
/// the postprocessing stage needs; no state is retained across invocations,
/// so independent sessions may run concurrently.
pub trait OnnxSession<M: Model> {
    type Output;
    type Meta;

    fn preprocess(&self, image: &DynamicImage) -> Result<(M::Input, Self::Meta), DetectError>;

    fn postprocess(&self, output: M::Output, meta: Self::Meta)
    -> Result<Self::Output, DetectError>;

    fn infer(
        &mut self,
        input: M::Input,
        input_name: &str,
        output_name: &str,
    ) -> Result<M::Output, DetectError>;

    fn run(&mut self, image: &DynamicImage) -> Result<Self::Output, DetectError> {
        let (input, meta) = self.preprocess(image)?;

        let output = self.infer(input, M::INPUT_NAME, M::OUTPUT_NAME)?;

        self.postprocess(output, meta)
    }
}

/// common session builder
pub fn session_builder() -> Result<SessionBuilder, DetectError> {
    let session_builder = Session::builder()
        .context(OrtInitSnafu { stage: "builder" })?
        .with_execution_providers(vec![
            #[cfg(all(feature = "coreml", target_os = "macos"))]
            {
                use ort::execution_providers::CoreMLExecutionProvider;
                use ort::execution_providers::coreml::*;
                CoreMLExecutionProvider::default()
                    .with_model_format(CoreMLModelFormat::MLProgram)
                    .build()
            },
            #[cfg(feature = "cuda")]
            {
                use ort::execution_providers::CUDAExecutionProvider;
                CUDAExecutionProvider::default().build()
            },
            CPUExecutionProvider::default().build(),
        ])
        .context(OrtInitSnafu { stage: "provider" })?
        .with_optimization_level(GraphOptimizationLevel::Level1)
        .context(OrtInitSnafu {
            stage: "optimization",
        })?
        .with_intra_threads(4)
        .context(OrtInitSnafu {
            stage: "intra-threads",
        })?;

    Ok(session_builder)
}

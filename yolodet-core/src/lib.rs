pub mod analysis;
pub mod consts;
pub mod detection;
pub mod error;
pub mod inference;
pub mod pipeline;

// Re-export commonly used types
pub use analysis::{
    bbox::Bbox,
    classes::{ClassInfo, ClassTable},
};
pub use detection::{Candidate, DetectOutput, DetectSummary, Detection};
pub use error::DetectError;
pub use inference::{
    model::{Model, OnnxSession, session_builder},
    yolo::{
        model::{Yolo, YoloConfig},
        session::YoloSession,
    },
};

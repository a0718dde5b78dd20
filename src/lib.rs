pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod pipeline;
pub mod smoothing;
pub mod types;

pub use config::{Hsv, MorphologyConfig, PipelineConfig, SkinRange};
pub use error::{ConfigError, FrameError};
pub use geometry::{Contour, Point};
pub use gesture::GestureClassifier;
pub use pipeline::{
    ContourRecognizer, GestureRecognizer, RecognizerBackend, analyze_mask, process_frame,
    start_recognizer,
};
pub use smoothing::GestureSmoother;
pub use types::{
    Frame, FrameOutcome, GestureKind, GestureResult, HandAnalysis, Mask, RecognizedFrame,
};

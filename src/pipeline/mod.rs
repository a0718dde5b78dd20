pub mod contour;
pub mod convexity;
pub mod fingers;
pub mod recognizer;
pub mod segment;

use crate::{
    config::PipelineConfig,
    gesture::GestureClassifier,
    types::{Frame, FrameOutcome, HandAnalysis, Mask},
};

// Re-exports for convenience
pub use convexity::{ConvexHull, ConvexityDefect};
pub use fingers::{FingerCount, FingerCounter};
pub use recognizer::{ContourRecognizer, GestureRecognizer, RecognizerBackend, start_recognizer};

/// Run every stage on one frame. Frames share no state, so callers may process them in
/// parallel.
pub fn process_frame(frame: &Frame, config: &PipelineConfig) -> FrameOutcome {
    let mask = segment::segment(frame, config);
    analyze_mask(&mask, config)
}

/// Stages after segmentation, for callers that build their own mask.
pub fn analyze_mask(mask: &Mask, config: &PipelineConfig) -> FrameOutcome {
    let Some(contour) = contour::extract(mask, config.min_contour_area) else {
        return FrameOutcome::NoHand;
    };

    let (hull, defects) = convexity::analyze(&contour);
    let fingers = FingerCounter::from_config(config).count(&contour, &defects);
    let gesture = GestureClassifier::from_config(config).classify(fingers.fingers, &contour);
    log::debug!(
        "{} fingers -> {} ({:.2})",
        fingers.fingers,
        gesture.label(),
        gesture.confidence
    );

    FrameOutcome::Hand(HandAnalysis {
        contour,
        hull,
        defects,
        fingers,
        gesture,
    })
}

use crate::{
    config::{DEFAULT_MIN_FIST_CIRCULARITY, PipelineConfig},
    geometry::Contour,
    types::{GestureKind, GestureResult},
};

const FIST_CONFIDENCE: f32 = 0.90;
const PALM_CONFIDENCE: f32 = 0.85;

/// Maps a finger count and the hand outline to a label.
#[derive(Clone, Copy, Debug)]
pub struct GestureClassifier {
    min_fist_circularity: f64,
}

impl GestureClassifier {
    pub fn new(min_fist_circularity: f64) -> Self {
        Self {
            min_fist_circularity,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.min_fist_circularity)
    }

    /// Two fingers always read as `two`; `scissors` is never produced from a silhouette.
    pub fn classify(&self, fingers: usize, contour: &Contour) -> GestureResult {
        let (kind, confidence) = match fingers {
            0 => return self.closed_or_open(contour),
            1 => (GestureKind::One, 0.95),
            2 => (GestureKind::Two, 0.90),
            3 => (GestureKind::Three, 0.85),
            4 => (GestureKind::Four, 0.85),
            5 => (GestureKind::Five, 0.90),
            _ => (GestureKind::Palm, PALM_CONFIDENCE),
        };
        GestureResult::new(kind, confidence)
    }

    fn closed_or_open(&self, contour: &Contour) -> GestureResult {
        match contour.circularity() {
            Some(c) if c > self.min_fist_circularity => {
                GestureResult::new(GestureKind::Fist, FIST_CONFIDENCE)
            }
            // Fingers held together, or nothing measurable.
            _ => GestureResult::new(GestureKind::Palm, PALM_CONFIDENCE),
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FIST_CIRCULARITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn contour(points: &[(i32, i32)]) -> Contour {
        Contour::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn octagon() -> Contour {
        contour(&[
            (30, 0),
            (70, 0),
            (100, 30),
            (100, 70),
            (70, 100),
            (30, 100),
            (0, 70),
            (0, 30),
        ])
    }

    #[test]
    fn test_finger_count_table() {
        let classifier = GestureClassifier::default();
        let hand = octagon();
        let expected = [
            (1, GestureKind::One, 0.95),
            (2, GestureKind::Two, 0.90),
            (3, GestureKind::Three, 0.85),
            (4, GestureKind::Four, 0.85),
            (5, GestureKind::Five, 0.90),
            (6, GestureKind::Palm, 0.85),
            (9, GestureKind::Palm, 0.85),
        ];
        for (fingers, kind, confidence) in expected {
            assert_eq!(
                classifier.classify(fingers, &hand),
                GestureResult::new(kind, confidence),
                "{fingers} fingers"
            );
        }
    }

    #[test]
    fn test_round_closed_hand_is_fist() {
        let hand = octagon();
        assert!(hand.circularity().unwrap() > 0.7);
        let result = GestureClassifier::default().classify(0, &hand);
        assert_eq!(result.kind, GestureKind::Fist);
        assert_eq!(result.confidence, 0.90);
    }

    #[test]
    fn test_elongated_closed_hand_is_palm() {
        let hand = contour(&[(0, 0), (200, 0), (200, 20), (0, 20)]);
        assert!(hand.circularity().unwrap() <= 0.7);
        let result = GestureClassifier::default().classify(0, &hand);
        assert_eq!(result.kind, GestureKind::Palm);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_unmeasurable_outline_is_palm() {
        let dot = contour(&[(5, 5)]);
        assert_eq!(dot.circularity(), None);
        let result = GestureClassifier::default().classify(0, &dot);
        assert_eq!(result.kind, GestureKind::Palm);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let square = contour(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let circularity = square.circularity().unwrap();
        assert_eq!(
            GestureClassifier::new(circularity).classify(0, &square).kind,
            GestureKind::Palm
        );
        assert_eq!(
            GestureClassifier::new(circularity - 0.01)
                .classify(0, &square)
                .kind,
            GestureKind::Fist
        );
    }

    #[test]
    fn test_two_fingers_never_scissors() {
        let result = GestureClassifier::default().classify(2, &octagon());
        assert_ne!(result.kind, GestureKind::Scissors);
        assert_eq!(result.label(), "two");
    }
}

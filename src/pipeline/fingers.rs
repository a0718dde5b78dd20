use crate::{
    config::{DEFAULT_MAX_VALLEY_ANGLE_DEG, PipelineConfig},
    geometry::{Contour, Point},
    pipeline::convexity::ConvexityDefect,
};

#[derive(Clone, Debug, PartialEq)]
pub struct FingerCount {
    pub fingers: usize,
    /// Defects accepted as gaps between raised fingers.
    pub valleys: usize,
    /// End point of every accepted valley, for drawing.
    pub fingertips: Vec<Point>,
    /// Only measured when no valley was found.
    pub circularity: Option<f64>,
}

/// Interior angle at `farthest` in degrees, by the law of cosines. `None` when `farthest`
/// coincides with either chord end.
pub fn valley_angle(defect: &ConvexityDefect) -> Option<f64> {
    let a2 = defect.start.distance_squared(&defect.end);
    let b2 = defect.farthest.distance_squared(&defect.start);
    let c2 = defect.farthest.distance_squared(&defect.end);
    if b2 == 0.0 || c2 == 0.0 {
        return None;
    }

    let cos = ((b2 + c2 - a2) / (2.0 * b2.sqrt() * c2.sqrt())).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

#[derive(Clone, Copy, Debug)]
pub struct FingerCounter {
    max_valley_angle_deg: f64,
}

impl FingerCounter {
    pub fn new(max_valley_angle_deg: f64) -> Self {
        Self {
            max_valley_angle_deg,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_valley_angle_deg)
    }

    /// Narrow gaps between extended fingers; wrist and palm dips are wider. The cutoff is
    /// exclusive.
    pub fn is_valley(&self, defect: &ConvexityDefect) -> bool {
        valley_angle(defect).is_some_and(|angle| angle < self.max_valley_angle_deg)
    }

    pub fn count(&self, contour: &Contour, defects: &[ConvexityDefect]) -> FingerCount {
        let fingertips: Vec<Point> = defects
            .iter()
            .filter(|defect| self.is_valley(defect))
            .map(|defect| defect.end)
            .collect();
        let valleys = fingertips.len();

        if valleys == 0 {
            // Fist or fused open hand; the classifier tells them apart by roundness.
            let circularity = contour.circularity();
            log::debug!("no finger valleys, circularity {circularity:?}");
            return FingerCount {
                fingers: 0,
                valleys,
                fingertips,
                circularity,
            };
        }

        log::debug!("{valleys} finger valleys");
        FingerCount {
            fingers: valleys + 1,
            valleys,
            fingertips,
            circularity: None,
        }
    }
}

impl Default for FingerCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VALLEY_ANGLE_DEG)
    }
}

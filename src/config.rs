use std::fmt;

use crate::error::ConfigError;

pub const DEFAULT_MIN_CONTOUR_AREA: f64 = 1000.0;
pub const DEFAULT_MIN_FIST_CIRCULARITY: f64 = 0.7;
pub const DEFAULT_MAX_VALLEY_ANGLE_DEG: f64 = 90.0;

/// Hue in half-degrees (0..=180), saturation and value in 0..=255.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

impl fmt::Display for Hsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.h, self.s, self.v)
    }
}

/// Inclusive HSV box accepted as skin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkinRange {
    lower: Hsv,
    upper: Hsv,
}

impl SkinRange {
    pub fn new(lower: Hsv, upper: Hsv) -> Result<Self, ConfigError> {
        let range = Self { lower, upper };
        range.validate()?;
        Ok(range)
    }

    pub fn lower(&self) -> Hsv {
        self.lower
    }

    pub fn upper(&self) -> Hsv {
        self.upper
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let channels = [
            ("hue", self.lower.h, self.upper.h),
            ("saturation", self.lower.s, self.upper.s),
            ("value", self.lower.v, self.upper.v),
        ];
        for (channel, lower, upper) in channels {
            if lower > upper {
                return Err(ConfigError::InvertedSkinRange {
                    channel,
                    lower,
                    upper,
                });
            }
        }
        if self.upper.h > 180 {
            return Err(ConfigError::HueOutOfRange {
                value: self.upper.h,
            });
        }
        Ok(())
    }
}

impl Default for SkinRange {
    /// Narrow reddish band tuned for indoor lighting.
    fn default() -> Self {
        Self {
            lower: Hsv::new(0, 20, 70),
            upper: Hsv::new(20, 255, 255),
        }
    }
}

/// Mask cleanup applied after thresholding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphologyConfig {
    /// Side of the square structuring element.
    pub kernel_size: u8,
    pub erode_iterations: u32,
    pub dilate_iterations: u32,
    /// Side of the Gaussian smoothing window; 1 disables smoothing.
    pub blur_kernel_size: u8,
}

impl MorphologyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, size) in [
            ("morphology kernel", self.kernel_size),
            ("blur kernel", self.blur_kernel_size),
        ] {
            if size == 0 || size % 2 == 0 {
                return Err(ConfigError::InvalidKernel { name, size });
            }
        }
        Ok(())
    }

    /// Chebyshev radius of the structuring element.
    pub fn kernel_radius(&self) -> u8 {
        self.kernel_size / 2
    }

    /// Sigma matching a `blur_kernel_size` window when no sigma is given.
    pub fn blur_sigma(&self) -> f32 {
        let k = self.blur_kernel_size as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            erode_iterations: 2,
            dilate_iterations: 2,
            blur_kernel_size: 5,
        }
    }
}

/// Every tunable of the geometric pipeline. Validate once, then share read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub skin_range: SkinRange,
    pub morphology: MorphologyConfig,
    /// Contours enclosing this many px² or fewer are treated as noise.
    pub min_contour_area: f64,
    /// Zero-valley silhouettes rounder than this are fists.
    pub min_fist_circularity: f64,
    /// Defects with a strictly smaller angle count as finger valleys.
    pub max_valley_angle_deg: f64,
}

impl PipelineConfig {
    pub fn with_skin_range(mut self, skin_range: SkinRange) -> Self {
        self.skin_range = skin_range;
        self
    }

    pub fn with_morphology(mut self, morphology: MorphologyConfig) -> Self {
        self.morphology = morphology;
        self
    }

    pub fn with_min_contour_area(mut self, area: f64) -> Self {
        self.min_contour_area = area;
        self
    }

    pub fn with_min_fist_circularity(mut self, circularity: f64) -> Self {
        self.min_fist_circularity = circularity;
        self
    }

    pub fn with_max_valley_angle(mut self, degrees: f64) -> Self {
        self.max_valley_angle_deg = degrees;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.skin_range.validate()?;
        self.morphology.validate()?;

        for (name, value) in [
            ("minimum contour area", self.min_contour_area),
            ("minimum fist circularity", self.min_fist_circularity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        let angle = self.max_valley_angle_deg;
        if !angle.is_finite() || angle <= 0.0 || angle > 180.0 {
            return Err(ConfigError::InvalidAngle { value: angle });
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            skin_range: SkinRange::default(),
            morphology: MorphologyConfig::default(),
            min_contour_area: DEFAULT_MIN_CONTOUR_AREA,
            min_fist_circularity: DEFAULT_MIN_FIST_CIRCULARITY,
            max_valley_angle_deg: DEFAULT_MAX_VALLEY_ANGLE_DEG,
        }
    }
}

use thiserror::Error;

/// Setup mistakes caught once, before any frame is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("skin range {channel} bound inverted: lower {lower} > upper {upper}")]
    InvertedSkinRange {
        channel: &'static str,
        lower: u8,
        upper: u8,
    },
    #[error("skin range hue {value} exceeds 180")]
    HueOutOfRange { value: u8 },
    #[error("{name} must be a finite non-negative number, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("valley angle cutoff must lie in (0, 180] degrees, got {value}")]
    InvalidAngle { value: f64 },
    #[error("{name} must be an odd size of at least 1, got {size}")]
    InvalidKernel { name: &'static str, size: u8 },
    #[error("smoothing window must hold at least one frame")]
    EmptySmoothingWindow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has zero extent ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("frame buffer size mismatch: got {got}, expected {expected}")]
    BufferSize { got: usize, expected: usize },
}

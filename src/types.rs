use std::{fmt, time::Instant};

use image::{DynamicImage, GrayImage};
use rayon::prelude::*;

use crate::{
    error::FrameError,
    geometry::{Contour, Point},
    pipeline::{
        convexity::{ConvexHull, ConvexityDefect},
        fingers::FingerCount,
    },
};

/// Packed RGBA pixels as delivered by the frame source. Alpha is ignored.
#[derive(Clone, Debug)]
pub struct Frame {
    rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl Frame {
    pub fn from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = checked_len(width, height, 4)?;
        if rgba.len() != expected {
            return Err(FrameError::BufferSize {
                got: rgba.len(),
                expected,
            });
        }
        Ok(Self {
            rgba,
            width,
            height,
            timestamp: Instant::now(),
        })
    }

    pub fn from_rgb(rgb: &[u8], width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = checked_len(width, height, 3)?;
        if rgb.len() != expected {
            return Err(FrameError::BufferSize {
                got: rgb.len(),
                expected,
            });
        }

        let mut rgba = vec![0u8; expected / 3 * 4];
        rgba.par_chunks_mut(4)
            .zip(rgb.par_chunks_exact(3))
            .for_each(|(dst, src)| {
                dst[..3].copy_from_slice(src);
                dst[3] = 255;
            });

        Self::from_rgba(rgba, width, height)
    }

    pub fn from_image(image: &DynamicImage) -> Result<Self, FrameError> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(rgba.into_raw(), width, height)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [self.rgba[idx], self.rgba[idx + 1], self.rgba[idx + 2]]
    }

    /// Horizontally flipped copy, for sources shown to the user as a mirror.
    pub fn mirrored(&self) -> Frame {
        let stride = self.width as usize * 4;
        let mut rgba = vec![0u8; self.rgba.len()];
        rgba.par_chunks_mut(stride)
            .zip(self.rgba.par_chunks(stride))
            .for_each(|(dst, src)| {
                for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4).rev()) {
                    d.copy_from_slice(s);
                }
            });

        Frame {
            rgba,
            width: self.width,
            height: self.height,
            timestamp: self.timestamp,
        }
    }
}

fn checked_len(width: u32, height: u32, channels: usize) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::Empty { width, height });
    }
    Ok((width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(channels))
}

/// Binary skin mask: every pixel is either 0 or 255.
#[derive(Clone, Debug)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    /// Any non-zero pixel becomes foreground.
    pub fn from_image(mut image: GrayImage) -> Self {
        for px in image.pixels_mut() {
            if px.0[0] != 0 {
                px.0[0] = 255;
            }
        }
        Self { image }
    }

    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn foreground_pixels(&self) -> usize {
        self.image.pixels().filter(|px| px.0[0] != 0).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    One,
    Two,
    Three,
    Four,
    Five,
    /// Part of the label set, but a silhouette cannot tell it apart from `Two`.
    Scissors,
    Fist,
    Palm,
}

impl GestureKind {
    pub fn label(&self) -> &'static str {
        match self {
            GestureKind::One => "one",
            GestureKind::Two => "two",
            GestureKind::Three => "three",
            GestureKind::Four => "four",
            GestureKind::Five => "five",
            GestureKind::Scissors => "scissors",
            GestureKind::Fist => "fist",
            GestureKind::Palm => "palm",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GestureKind::One => "一",
            GestureKind::Two => "二",
            GestureKind::Three => "三",
            GestureKind::Four => "四",
            GestureKind::Five => "五",
            GestureKind::Scissors => "剪刀手",
            GestureKind::Fist => "握拳",
            GestureKind::Palm => "手掌",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            GestureKind::One => "☝️ ",
            GestureKind::Two => "✌️ ",
            GestureKind::Three => "🤟 ",
            GestureKind::Four => "🖖 ",
            GestureKind::Five => "🖐 ",
            GestureKind::Scissors => "✂️ ",
            GestureKind::Fist => "✊ ",
            GestureKind::Palm => "✋ ",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureResult {
    pub kind: GestureKind,
    pub confidence: f32,
}

impl GestureResult {
    pub fn new(kind: GestureKind, confidence: f32) -> Self {
        Self {
            kind,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn display_text(&self) -> String {
        format!(
            "{}{} ({:.0}%)",
            self.kind.emoji(),
            self.kind.display_name(),
            self.confidence * 100.0
        )
    }
}

/// Everything a renderer needs to draw one recognized hand.
#[derive(Clone, Debug)]
pub struct HandAnalysis {
    pub contour: Contour,
    pub hull: ConvexHull,
    pub defects: Vec<ConvexityDefect>,
    pub fingers: FingerCount,
    pub gesture: GestureResult,
}

impl HandAnalysis {
    pub fn fingertips(&self) -> &[Point] {
        &self.fingers.fingertips
    }
}

#[derive(Clone, Debug)]
pub enum FrameOutcome {
    NoHand,
    Hand(HandAnalysis),
}

impl FrameOutcome {
    pub fn gesture(&self) -> Option<&GestureResult> {
        match self {
            FrameOutcome::NoHand => None,
            FrameOutcome::Hand(hand) => Some(&hand.gesture),
        }
    }

    pub fn hand(&self) -> Option<&HandAnalysis> {
        match self {
            FrameOutcome::NoHand => None,
            FrameOutcome::Hand(hand) => Some(hand),
        }
    }

    pub fn kind(&self) -> Option<GestureKind> {
        self.gesture().map(|g| g.kind)
    }

    pub fn display_text(&self) -> String {
        match self {
            FrameOutcome::NoHand => "未检测到手".to_string(),
            FrameOutcome::Hand(hand) => hand.gesture.display_text(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecognizedFrame {
    pub frame: Frame,
    pub outcome: FrameOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejects_short_buffer() {
        let err = Frame::from_rgba(vec![0u8; 10], 2, 2).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferSize {
                got: 10,
                expected: 16
            }
        );
    }

    #[test]
    fn test_frame_rejects_zero_extent() {
        let err = Frame::from_rgba(Vec::new(), 0, 4).unwrap_err();
        assert_eq!(
            err,
            FrameError::Empty {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn test_rgb_frame_gets_opaque_alpha() {
        let frame = Frame::from_rgb(&[1, 2, 3, 4, 5, 6], 2, 1).unwrap();
        assert_eq!(frame.rgba(), &[1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(frame.rgb_at(1, 0), [4, 5, 6]);
    }

    #[test]
    fn test_mirrored_reverses_each_row() {
        let rgb = [
            1, 1, 1, 2, 2, 2, 3, 3, 3, //
            4, 4, 4, 5, 5, 5, 6, 6, 6,
        ];
        let frame = Frame::from_rgb(&rgb, 3, 2).unwrap();
        let mirrored = frame.mirrored();
        assert_eq!(mirrored.rgb_at(0, 0), [3, 3, 3]);
        assert_eq!(mirrored.rgb_at(2, 0), [1, 1, 1]);
        assert_eq!(mirrored.rgb_at(0, 1), [6, 6, 6]);
        assert_eq!(mirrored.rgb_at(1, 1), [5, 5, 5]);
    }

    #[test]
    fn test_mask_is_binarized() {
        let image = GrayImage::from_raw(3, 1, vec![0, 1, 200]).unwrap();
        let mask = Mask::from_image(image);
        assert_eq!(mask.as_image().as_raw(), &vec![0, 255, 255]);
        assert_eq!(mask.foreground_pixels(), 2);
    }

    #[test]
    fn test_gesture_labels() {
        assert_eq!(GestureKind::Scissors.label(), "scissors");
        assert_eq!(GestureKind::Fist.to_string(), "fist");
        let result = GestureResult::new(GestureKind::Two, 0.9);
        assert_eq!(result.display_text(), "✌️ 二 (90%)");
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(GestureResult::new(GestureKind::One, 1.5).confidence, 1.0);
    }

    #[test]
    fn test_no_hand_outcome_has_no_gesture() {
        let outcome = FrameOutcome::NoHand;
        assert!(outcome.gesture().is_none());
        assert!(outcome.kind().is_none());
        assert_eq!(outcome.display_text(), "未检测到手");
    }
}

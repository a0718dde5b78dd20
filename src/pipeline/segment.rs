use image::{GrayImage, Luma};
use imageproc::{
    distance_transform::Norm,
    filter::separable_filter_equal,
    morphology::{dilate, erode},
};

use crate::{
    config::{Hsv, PipelineConfig, SkinRange},
    types::{Frame, Mask},
};

/// Convert an RGB triple to 8-bit HSV: hue halved into 0..=180, saturation and value in
/// 0..=255.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let [r, g, b] = rgb.map(f32::from);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let s = if max == 0.0 { 0.0 } else { delta * 255.0 / max };

    Hsv::new((h / 2.0).round() as u8, s.round() as u8, max as u8)
}

/// Raw in-range test, before any cleanup.
pub fn threshold(frame: &Frame, range: &SkinRange) -> GrayImage {
    GrayImage::from_fn(frame.width, frame.height, |x, y| {
        let hsv = rgb_to_hsv(frame.rgb_at(x, y));
        Luma([if range.contains(hsv) { 255 } else { 0 }])
    })
}

/// Frame to binary hand mask: threshold, erode, dilate, smooth.
pub fn segment(frame: &Frame, config: &PipelineConfig) -> Mask {
    let mut mask = threshold(frame, &config.skin_range);

    if mask.pixels().all(|px| px.0[0] == 0) {
        log::debug!("no skin-coloured pixels in {}x{} frame", frame.width, frame.height);
        return Mask::from_image(mask);
    }

    let morphology = &config.morphology;
    let radius = morphology.kernel_radius();
    if radius > 0 {
        for _ in 0..morphology.erode_iterations {
            mask = erode(&mask, Norm::LInf, radius);
        }
        for _ in 0..morphology.dilate_iterations {
            mask = dilate(&mask, Norm::LInf, radius);
        }
    }

    if morphology.blur_kernel_size > 1 {
        let kernel = gaussian_kernel(morphology.blur_kernel_size, morphology.blur_sigma());
        mask = separable_filter_equal(&mask, &kernel);
    }

    Mask::from_image(mask)
}

/// Normalized 1D Gaussian with exactly `size` taps.
fn gaussian_kernel(size: u8, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let taps: Vec<f32> = (-radius..=radius)
        .map(|offset| (-((offset * offset) as f32) / denom).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    taps.into_iter().map(|tap| tap / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIN: [u8; 3] = [200, 120, 90];
    const BACKGROUND: [u8; 3] = [30, 60, 200];

    fn frame_with_rect(width: u32, height: u32, rect: (u32, u32, u32, u32)) -> Frame {
        let (x0, y0, w, h) = rect;
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let inside = x >= x0 && x < x0 + w && y >= y0 && y < y0 + h;
                let px = if inside { SKIN } else { BACKGROUND };
                rgb.extend_from_slice(&px);
            }
        }
        Frame::from_rgb(&rgb, width, height).unwrap()
    }

    #[test]
    fn test_rgb_to_hsv() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), Hsv::new(0, 255, 255));
        assert_eq!(rgb_to_hsv([0, 0, 255]), Hsv::new(120, 255, 255));
        assert_eq!(rgb_to_hsv([128, 128, 128]), Hsv::new(0, 0, 128));
        assert_eq!(rgb_to_hsv([0, 0, 0]), Hsv::new(0, 0, 0));
        assert_eq!(rgb_to_hsv(SKIN), Hsv::new(8, 140, 200));
    }

    #[test]
    fn test_hue_wraps_for_magenta_side() {
        // Red dominant with blue above green lands just below 360 degrees.
        let hsv = rgb_to_hsv([255, 0, 10]);
        assert_eq!(hsv.h, 179);
    }

    #[test]
    fn test_skin_tone_in_default_range() {
        let range = SkinRange::default();
        assert!(range.contains(rgb_to_hsv(SKIN)));
        assert!(!range.contains(rgb_to_hsv(BACKGROUND)));
        assert!(!range.contains(rgb_to_hsv([50, 200, 50])));
    }

    #[test]
    fn test_background_only_frame_gives_empty_mask() {
        let frame = frame_with_rect(64, 48, (0, 0, 0, 0));
        let mask = segment(&frame, &PipelineConfig::default());
        assert_eq!(mask.width(), 64);
        assert_eq!(mask.height(), 48);
        assert_eq!(mask.foreground_pixels(), 0);
    }

    #[test]
    fn test_speckle_is_removed() {
        let frame = frame_with_rect(64, 48, (30, 20, 3, 3));
        assert_eq!(
            threshold(&frame, &SkinRange::default())
                .pixels()
                .filter(|px| px.0[0] == 255)
                .count(),
            9
        );
        let mask = segment(&frame, &PipelineConfig::default());
        assert_eq!(mask.foreground_pixels(), 0);
    }

    #[test]
    fn test_gaussian_kernel_has_requested_taps() {
        let kernel = gaussian_kernel(5, 1.1);
        assert_eq!(kernel.len(), 5);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert_eq!(kernel[0], kernel[4]);
        assert!(kernel[2] > kernel[1] && kernel[1] > kernel[0]);
    }

    #[test]
    fn test_smoothing_grows_outline_by_kernel_radius() {
        let frame = frame_with_rect(120, 100, (30, 25, 50, 40));
        let mask = segment(&frame, &PipelineConfig::default());
        let row: Vec<u8> = (20..40).map(|x| mask.as_image().get_pixel(x, 45).0[0]).collect();
        let first = row.iter().position(|&v| v == 255).map(|i| i + 20);
        assert_eq!(first, Some(28));
    }

    #[test]
    fn test_solid_block_survives_cleanup() {
        let frame = frame_with_rect(120, 100, (30, 25, 50, 40));
        let mask = segment(&frame, &PipelineConfig::default());

        let image = mask.as_image();
        assert!(image.pixels().all(|px| px.0[0] == 0 || px.0[0] == 255));
        // Core of the block is untouched, far background stays empty.
        assert_eq!(image.get_pixel(55, 45).0[0], 255);
        assert_eq!(image.get_pixel(31, 26).0[0], 255);
        assert_eq!(image.get_pixel(5, 5).0[0], 0);
        assert!(mask.foreground_pixels() >= 50 * 40);
    }
}

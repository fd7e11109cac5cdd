use crate::error::GeometryError;
use crate::frame::{Frame, ResizeFrame};
use image::{Rgb, RgbImage};
use log::trace;

/// Letterbox target geometry. The pad color matches the mid-gray the
/// segmentation model was trained against.
#[derive(Debug, Clone)]
pub struct LetterboxConfig {
    pub target: (u32, u32),
    pub allow_upscale: bool,
    pub pad_color: [u8; 3],
}

impl Default for LetterboxConfig {
    fn default() -> Self {
        LetterboxConfig {
            target: (640, 640),
            allow_upscale: false,
            pad_color: [114, 114, 114],
        }
    }
}

/// A frame scaled and centered on the model input canvas.
///
/// Only the vertical padding is carried downstream: the mask resampler
/// strips the letterboxed rows, while padded columns stay part of mask
/// space and are never removed.
#[derive(Debug, Clone)]
pub struct Letterboxed {
    pub frame: Frame,
    pub pad_top: u32,
    pub pad_bottom: u32,
    pub scale: f32,
}

/// Fits `source` into the target canvas with a uniform, aspect-preserving
/// scale and centered placement. The scale never exceeds 1.0 unless
/// `allow_upscale` is set.
pub fn letterbox(source: &Frame, config: &LetterboxConfig) -> Result<Letterboxed, GeometryError> {
    let (target_w, target_h) = config.target;
    if target_w == 0 || target_h == 0 {
        return Err(GeometryError::ZeroTarget(target_w, target_h));
    }

    let (source_w, source_h) = source.get_size();
    let mut scale = (target_w as f32 / source_w as f32).min(target_h as f32 / source_h as f32);
    if !config.allow_upscale {
        scale = scale.min(1.0);
    }

    let content_w = ((source_w as f32 * scale).round() as u32).clamp(1, target_w);
    let content_h = ((source_h as f32 * scale).round() as u32).clamp(1, target_h);
    let content = source.resize_into((content_w, content_h))?;

    let pad_top = ((target_h - content_h) as f32 / 2.0).round() as u32;
    let pad_bottom = target_h - content_h - pad_top;
    let pad_left = ((target_w - content_w) as f32 / 2.0).round() as u32;

    trace!(
        "letterbox {source_w}x{source_h} -> {content_w}x{content_h} on {target_w}x{target_h}, \
         pads {pad_top}/{pad_bottom}"
    );

    let mut canvas = RgbImage::from_pixel(target_w, target_h, Rgb(config.pad_color));
    image::imageops::replace(
        &mut canvas,
        &content.to_rgb_image()?,
        pad_left as i64,
        pad_top as i64,
    );

    Ok(Letterboxed {
        frame: Frame::from_rgb_image(canvas),
        pad_top,
        pad_bottom,
        scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::from_rgb8(vec![value; width as usize * height as usize * 3], width, height).unwrap()
    }

    #[test]
    fn pads_split_the_leftover_rows() {
        let frame = solid_frame(640, 360, 200);
        let boxed = letterbox(&frame, &LetterboxConfig::default()).unwrap();

        assert_eq!(boxed.frame.get_size(), (640, 640));
        assert_eq!(boxed.pad_top, 140);
        assert_eq!(boxed.pad_bottom, 140);
        assert_eq!(boxed.pad_top + 360 + boxed.pad_bottom, 640);
        assert_eq!(boxed.scale, 1.0);
    }

    #[test]
    fn never_upscales_by_default() {
        let frame = solid_frame(320, 180, 200);
        let boxed = letterbox(&frame, &LetterboxConfig::default()).unwrap();

        assert_eq!(boxed.scale, 1.0);
        assert_eq!(boxed.pad_top + 180 + boxed.pad_bottom, 640);

        // content sits centered, surrounded by pad color
        let data = boxed.frame.raw_data();
        assert_eq!(data[0], 114);
        let center = ((320 * 640 + 320) * 3) as usize;
        assert_eq!(data[center], 200);
    }

    #[test]
    fn upscale_allowed_when_requested() {
        let frame = solid_frame(320, 320, 10);
        let config = LetterboxConfig {
            allow_upscale: true,
            ..LetterboxConfig::default()
        };
        let boxed = letterbox(&frame, &config).unwrap();
        assert_eq!(boxed.scale, 2.0);
        assert_eq!(boxed.pad_top, 0);
        assert_eq!(boxed.pad_bottom, 0);
    }

    #[test]
    fn odd_leftover_rows_still_sum_to_target() {
        // 640x361 scaled by r = 640/640 = 1.0 leaves 279 rows of padding
        let frame = solid_frame(640, 361, 50);
        let boxed = letterbox(&frame, &LetterboxConfig::default()).unwrap();
        assert_eq!(boxed.pad_top + 361 + boxed.pad_bottom, 640);
    }

    #[test]
    fn zero_target_is_rejected() {
        let frame = solid_frame(8, 8, 0);
        let config = LetterboxConfig {
            target: (0, 640),
            ..LetterboxConfig::default()
        };
        assert!(matches!(
            letterbox(&frame, &config),
            Err(GeometryError::ZeroTarget(0, 640))
        ));
    }
}

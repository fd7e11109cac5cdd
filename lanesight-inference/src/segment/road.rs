use crate::engine::inference_engine::{ExecutionProvider, OnnxSession};
use crate::segment::SegTensor;
use anyhow::Result;
use lanesight_media::Letterboxed;
use log::info;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::path::Path;

/// The segmentation boundary. Implementations take one letterboxed frame
/// and return the model's raw head tensors; any failure means the caller
/// skips the tick.
pub trait RoadSegmentInference {
    fn segment_road(&self, input: &Letterboxed) -> Result<Vec<SegTensor>>;
}

pub struct RoadSegmentationSession {
    session: Mutex<OnnxSession>,
}

impl RoadSegmentationSession {
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self> {
        let session = OnnxSession::new(model_path, ExecutionProvider::CPU)?;
        info!("road segmentation session created");
        Ok(RoadSegmentationSession {
            session: Mutex::new(session),
        })
    }
}

impl RoadSegmentInference for RoadSegmentationSession {
    fn segment_road(&self, input: &Letterboxed) -> Result<Vec<SegTensor>> {
        let (width, height) = input.frame.get_size();
        let tensor = normalize_nchw(input.frame.raw_data(), width as usize, height as usize);
        self.session
            .lock()
            .run_raw([1, 3, height as usize, width as usize], tensor)
    }
}

/// Packed RGB24 to planar NCHW float, scaled into `[0, 1]`.
fn normalize_nchw(rgb: &[u8], width: usize, height: usize) -> Vec<f32> {
    let plane = width * height;
    let mut tensor = vec![0f32; 3 * plane];
    tensor
        .par_chunks_mut(plane)
        .enumerate()
        .for_each(|(channel, dst)| {
            for (i, pixel) in rgb.chunks_exact(3).enumerate() {
                dst[i] = pixel[channel] as f32 / 255.0;
            }
        });
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_planar_and_scaled() {
        // two pixels: (255, 0, 51) and (0, 255, 102)
        let rgb = [255u8, 0, 51, 0, 255, 102];
        let tensor = normalize_nchw(&rgb, 2, 1);
        assert_eq!(tensor.len(), 6);
        assert_eq!(&tensor[0..2], &[1.0, 0.0]); // R plane
        assert_eq!(&tensor[2..4], &[0.0, 1.0]); // G plane
        assert_eq!(tensor[4], 51.0 / 255.0);
        assert_eq!(tensor[5], 102.0 / 255.0);
    }
}

pub mod decode;
pub mod error;
pub mod mask;
pub mod resample;
pub mod road;

use ndarray::ArrayD;

/// One raw segmentation head: `[1, C, H, W]` class scores.
pub type SegTensor = ArrayD<f32>;

pub use decode::decode_heads;
pub use error::{CropError, HeadSelectionError, ShapeMismatchError};
pub use mask::Mask2D;
pub use resample::resample;
pub use road::{RoadSegmentInference, RoadSegmentationSession};

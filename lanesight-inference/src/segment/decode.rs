use crate::segment::error::{HeadSelectionError, ShapeMismatchError};
use crate::segment::mask::Mask2D;
use crate::segment::SegTensor;
use anyhow::Result;
use bitvec::prelude::BitVec;
use log::debug;
use ndarray::s;

/// Converts the raw head tensors into (drivable area, lane line) masks at
/// model output resolution.
///
/// Head identity is resolved by channel count: the two-channel head scores
/// drivable area, the one-channel head scores lane markings. When neither
/// head matches that pattern the heads are ordered by channel count and the
/// wider one is treated as drivable area.
pub fn decode_heads(tensors: &[SegTensor]) -> Result<(Mask2D, Mask2D)> {
    let mut candidates: Vec<&SegTensor> = tensors
        .iter()
        .filter(|t| t.ndim() == 4 && t.shape()[0] == 1 && t.shape()[1] >= 1)
        .collect();
    if candidates.len() < 2 {
        return Err(HeadSelectionError {
            found: candidates.len(),
        }
        .into());
    }

    let drivable = candidates.iter().copied().find(|t| t.shape()[1] == 2);
    let lane_line = candidates.iter().copied().find(|t| t.shape()[1] == 1);
    let (drivable, lane_line) = match (drivable, lane_line) {
        (Some(d), Some(l)) => (d, l),
        _ => {
            debug!("head channel counts are ambiguous, ordering by channel count");
            candidates.sort_by_key(|t| t.shape()[1]);
            (candidates[candidates.len() - 1], candidates[0])
        }
    };

    let drivable_dims = (drivable.shape()[2], drivable.shape()[3]);
    let lane_dims = (lane_line.shape()[2], lane_line.shape()[3]);
    if drivable_dims != lane_dims {
        return Err(ShapeMismatchError {
            drivable: drivable_dims,
            lane_line: lane_dims,
        }
        .into());
    }

    Ok((decode_head(drivable), decode_head(lane_line)))
}

/// Per-pixel decode rule. A single-channel head is thresholded at 1.0
/// (values below one are background); a multi-channel head takes the
/// foreground channel only on a strict win over background.
fn decode_head(head: &SegTensor) -> Mask2D {
    let shape = head.shape();
    let (channels, height, width) = (shape[1], shape[2], shape[3]);

    let bits = if channels == 1 {
        head.slice(s![0, 0, .., ..])
            .iter()
            .map(|&v| v >= 1.0)
            .collect::<BitVec>()
    } else {
        let background = head.slice(s![0, 0, .., ..]);
        let foreground = head.slice(s![0, 1, .., ..]);
        foreground
            .iter()
            .zip(background.iter())
            .map(|(&fg, &bg)| fg > bg)
            .collect::<BitVec>()
    };

    Mask2D::from_parts(bits, width, height)
}

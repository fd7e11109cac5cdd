use crate::segment::error::CropError;
use crate::segment::mask::Mask2D;
use bitvec::prelude::BitVec;

/// Fixed upsample factor between model output resolution and mask space.
/// The segmentation heads run coarser than the model input; doubling keeps
/// overlay drawing and lane-width estimates visually proportionate.
pub const UPSAMPLE_FACTOR: usize = 2;

/// Strips the letterboxed rows recorded by the geometry transform and
/// nearest-neighbor upsamples what remains. Output resolution is
/// `(UPSAMPLE_FACTOR * (H - pad_top - pad_bottom), UPSAMPLE_FACTOR * W)`.
///
/// Width is never cropped: horizontal letterbox padding stays part of mask
/// space and downstream consumers compensate for it.
pub fn resample(mask: &Mask2D, pad_top: u32, pad_bottom: u32) -> Result<Mask2D, CropError> {
    let height = mask.height();
    let pad = pad_top as usize + pad_bottom as usize;
    if height <= pad {
        return Err(CropError {
            height,
            pad_top,
            pad_bottom,
        });
    }

    let cropped_h = height - pad;
    let out_w = mask.width() * UPSAMPLE_FACTOR;
    let out_h = cropped_h * UPSAMPLE_FACTOR;

    let bits = (0..out_w * out_h)
        .map(|index| {
            let x = index % out_w;
            let y = index / out_w;
            mask.get(x / UPSAMPLE_FACTOR, pad_top as usize + y / UPSAMPLE_FACTOR)
        })
        .collect::<BitVec>();

    Ok(Mask2D::from_parts(bits, out_w, out_h))
}

use thiserror::Error;

/// The segmentation output did not contain two resolvable head tensors.
#[derive(Debug, Error)]
#[error("segmentation output holds {found} usable head tensor(s), two are required")]
pub struct HeadSelectionError {
    pub found: usize,
}

/// The two head tensors disagree on resolution.
#[derive(Debug, Error)]
#[error("head resolutions disagree: drivable {drivable:?} vs lane line {lane_line:?}")]
pub struct ShapeMismatchError {
    pub drivable: (usize, usize),
    pub lane_line: (usize, usize),
}

/// The recorded letterbox padding leaves no mask rows to keep.
#[derive(Debug, Error)]
#[error("padding {pad_top}+{pad_bottom} consumes all {height} mask rows")]
pub struct CropError {
    pub height: usize,
    pub pad_top: u32,
    pub pad_bottom: u32,
}

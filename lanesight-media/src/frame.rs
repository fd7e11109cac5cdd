use crate::error::GeometryError;
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::RgbImage;
use std::path::Path;

/// An owned working frame: packed RGB24, row major, 3 bytes per pixel.
///
/// Frames are tick-scoped values. A raw camera frame of arbitrary native
/// resolution is resized down to the working canvas once and then consumed
/// by the letterbox stage; nothing derived from it outlives the tick.
#[derive(Debug, Clone)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn from_rgb8(data: Vec<u8>, width: u32, height: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::EmptyFrame { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(GeometryError::BufferMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Frame {
            data,
            width,
            height,
        })
    }

    /// Decodes an image file into a frame.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let image = ImageReader::open(path.as_ref())
            .map_err(|e| GeometryError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| GeometryError::Decode(e.to_string()))?
            .into_rgb8();
        let (width, height) = image.dimensions();
        Frame::from_rgb8(image.into_raw(), width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn to_rgb_image(&self) -> Result<RgbImage, GeometryError> {
        RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or(
            GeometryError::BufferMismatch {
                expected: self.width as usize * self.height as usize * 3,
                actual: self.data.len(),
            },
        )
    }

    pub(crate) fn from_rgb_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Frame {
            data: image.into_raw(),
            width,
            height,
        }
    }
}

pub trait ResizeFrame {
    fn resize_to(&mut self, size: (u32, u32)) -> Result<(), GeometryError>;
    fn resize_into(&self, size: (u32, u32)) -> Result<Self, GeometryError>
    where
        Self: Sized;
}

impl ResizeFrame for Frame {
    fn resize_to(&mut self, size: (u32, u32)) -> Result<(), GeometryError> {
        *self = self.resize_into(size)?;
        Ok(())
    }

    fn resize_into(&self, size: (u32, u32)) -> Result<Frame, GeometryError> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return Err(GeometryError::ZeroTarget(width, height));
        }
        if (width, height) == self.get_size() {
            return Ok(self.clone());
        }
        let resized = image::imageops::resize(
            &self.to_rgb_image()?,
            width,
            height,
            FilterType::Triangle,
        );
        Ok(Frame::from_rgb_image(resized))
    }
}

pub mod error;
pub mod frame;
pub mod letterbox;

pub use error::GeometryError;
pub use frame::{Frame, ResizeFrame};
pub use letterbox::{letterbox, Letterboxed, LetterboxConfig};

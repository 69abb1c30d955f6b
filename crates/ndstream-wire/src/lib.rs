#![warn(clippy::pedantic)]

pub mod error;
pub mod line_frame;

pub use error::WireError;
pub use line_frame::{Frame, LineFramer, is_blank};

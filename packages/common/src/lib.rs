pub mod images;
pub mod storage;

pub use images::{HostedImage, ImageRef};

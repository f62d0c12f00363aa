//! Data types exchanged between the preview engine and its host: light
//! descriptions, input and output images, and the request / reply messages
//! that travel over the channels.

mod bitmap;
mod image;
mod light;
mod message;

pub use self::bitmap::*;
pub use self::image::*;
pub use self::light::*;
pub use self::message::*;

pub mod reply_publisher;
pub mod transform;

pub use reply_publisher::*;
pub use transform::*;

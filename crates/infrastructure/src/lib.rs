pub mod delivery;
pub mod message_queue;
pub mod observability;
pub mod process_transform;
pub mod transform_source;

pub use delivery::inbound_request;
pub use message_queue::{reply_properties, RabbitMQConnection, RabbitMQReplyPublisher};
pub use observability::{init_logging, init_metrics, DispatchMetrics};
pub use process_transform::{ProcessTransform, ProcessTransformCompiler};
pub use transform_source::FsTransformSource;

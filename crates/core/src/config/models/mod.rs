pub mod app_config;
pub mod message_queue;
pub mod transforms;
pub mod worker_observability;

// Re-export main types for easier imports
pub use app_config::AppConfig;
pub use message_queue::MessageQueueConfig;
pub use transforms::{ProcessorConfig, TransformConfig};
pub use worker_observability::{ObservabilityConfig, WorkerConfig};

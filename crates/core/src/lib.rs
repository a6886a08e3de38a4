pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use errors::{Result, XaasError};
pub use models::{InboundRequest, Reply, ReplyStatus, ReplyTarget, TransformId};
pub use traits::{
    ReplyPublisher, Transform, TransformCompiler, TransformDefinition, TransformError,
    TransformSource,
};

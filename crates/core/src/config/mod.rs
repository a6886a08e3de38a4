//! 配置管理
//!
//! 配置按以下顺序合并，后者覆盖前者：
//!
//! 1. 内置默认值
//! 2. TOML配置文件
//! 3. `XAAS_` 前缀的环境变量，嵌套字段使用 `__` 分隔，
//!    例如 `XAAS_MESSAGE_QUEUE__HOST`
//! 4. 兼容旧部署的环境变量（`AMQP_HOST`、`AMQP_QUEUE`、`XSLT_ROOT` 等）
//!
//! ```rust,no_run
//! use xaas_core::config::AppConfig;
//!
//! let config = AppConfig::load(Some("config/xaas.toml")).unwrap();
//! println!("监听队列: {}", config.message_queue.queue);
//! ```

pub mod models;

#[cfg(test)]
mod tests;

pub use models::{
    AppConfig, MessageQueueConfig, ObservabilityConfig, ProcessorConfig, TransformConfig,
    WorkerConfig,
};

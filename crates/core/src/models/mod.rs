//! # 数据模型
//!
//! 定义转换RPC服务的核心数据结构。
//!
//! ## 核心模型
//!
//! ### TransformId - 转换标识
//! 由转换定义文件相对于根目录的路径推导而来，去掉固定扩展名，
//! 例如 `reports/invoice.xsl` 对应 `reports/invoice`。
//!
//! ### InboundRequest - 入站请求
//! 从一次消息投递中提取的请求：转换标识、关联ID、回复地址以及待转换的负载。
//!
//! ### Reply - 回复
//! 对每个可回复请求恰好产生一个回复，携带状态码并原样带回关联ID。
//! 内容类型固定为 `text/plain`，编码固定为 `utf8`。

pub mod reply;
pub mod request;
pub mod transform_id;

pub use reply::{Reply, ReplyStatus, CONTENT_ENCODING, CONTENT_TYPE, STATUS_HEADER};
pub use request::{InboundRequest, ReplyTarget, ID_HEADER};
pub use transform_id::TransformId;

use async_trait::async_trait;

use crate::{models::Reply, Result};

/// 回复发布接口
#[async_trait]
pub trait ReplyPublisher: Send + Sync {
    /// 将回复发送到 `reply_to`，关联ID取自 `reply.correlation_id`
    async fn publish(&self, reply_to: &str, reply: &Reply) -> Result<()>;
}

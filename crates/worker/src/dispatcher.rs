//! 请求调度
//!
//! 每个可回复的请求恰好产生一个回复：
//!
//! | 情况 | 状态码 |
//! |---|---|
//! | 缺少回复地址或关联ID | 不回复，直接丢弃 |
//! | 缺少转换标识 | 400 |
//! | 转换标识未注册 | 404 |
//! | 转换执行成功 | 200 |
//! | 转换执行失败 | 500 |
//!
//! 调度内部不重试，重试由调用方负责。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tracing::{debug, error, info, warn};
use xaas_core::{InboundRequest, Reply, ReplyPublisher, ReplyStatus, Result};
use xaas_infrastructure::DispatchMetrics;

use crate::registry::TransformRegistry;

/// 执行失败且没有诊断信息时的回复内容
pub const UNEXPECTED_ERROR: &str = "Unexpected error on server";

/// 单个请求的处理结果，由它构造回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Transformed(Vec<u8>),
    MissingId,
    UnknownId(String),
    ExecutionFailed(String),
}

impl DispatchOutcome {
    pub fn status(&self) -> ReplyStatus {
        match self {
            DispatchOutcome::Transformed(_) => ReplyStatus::Ok,
            DispatchOutcome::MissingId => ReplyStatus::BadRequest,
            DispatchOutcome::UnknownId(_) => ReplyStatus::NotFound,
            DispatchOutcome::ExecutionFailed(_) => ReplyStatus::InternalError,
        }
    }

    pub fn into_reply(self, correlation_id: &str) -> Reply {
        match self {
            DispatchOutcome::Transformed(body) => Reply::ok(correlation_id, body),
            DispatchOutcome::MissingId => {
                Reply::bad_request(correlation_id, "Received request without id")
            }
            DispatchOutcome::UnknownId(id) => {
                Reply::not_found(correlation_id, format!("No such transform '{id}'"))
            }
            DispatchOutcome::ExecutionFailed(message) => {
                let message = if message.trim().is_empty() {
                    UNEXPECTED_ERROR.to_string()
                } else {
                    message
                };
                Reply::internal_error(correlation_id, message)
            }
        }
    }
}

/// 带回复地址的回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedReply {
    pub reply_to: String,
    pub reply: Reply,
}

/// 请求调度器
///
/// 除只读的注册表外没有状态，可被任意多个任务并发调用。
pub struct RequestDispatcher {
    registry: Arc<TransformRegistry>,
    metrics: Arc<DispatchMetrics>,
}

impl RequestDispatcher {
    pub fn new(registry: Arc<TransformRegistry>) -> Self {
        Self {
            registry,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// 处理一个请求并生成回复
    ///
    /// 请求缺少回复地址或关联ID时无处回复，返回 `None`。
    pub async fn dispatch(&self, request: &InboundRequest) -> Option<AddressedReply> {
        let Some(target) = request.reply_target() else {
            warn!(
                transform_id = request.transform_id().unwrap_or("-"),
                "请求缺少回复地址或关联ID，无法回复，丢弃"
            );
            self.metrics.record_dropped();
            return None;
        };

        debug!(
            transform_id = request.transform_id().unwrap_or("-"),
            correlation_id = %target.correlation_id,
            payload_bytes = request.payload.len(),
            "收到转换请求"
        );

        let started = Instant::now();
        let outcome = self.execute(request).await;
        let reply = outcome.into_reply(&target.correlation_id);
        self.metrics
            .record_reply(reply.status, started.elapsed().as_secs_f64());

        info!(
            transform_id = request.transform_id().unwrap_or("-"),
            correlation_id = %target.correlation_id,
            status = reply.status.code(),
            "转换请求已处理"
        );

        Some(AddressedReply {
            reply_to: target.reply_to,
            reply,
        })
    }

    /// 处理请求并通过发布器发送回复
    ///
    /// 返回已发送回复的状态；请求被丢弃时返回 `None`。
    pub async fn handle(
        &self,
        request: &InboundRequest,
        publisher: &dyn ReplyPublisher,
    ) -> Result<Option<ReplyStatus>> {
        let Some(addressed) = self.dispatch(request).await else {
            return Ok(None);
        };

        if let Err(e) = publisher
            .publish(&addressed.reply_to, &addressed.reply)
            .await
        {
            self.metrics.record_publish_failure();
            return Err(e);
        }

        Ok(Some(addressed.reply.status))
    }

    async fn execute(&self, request: &InboundRequest) -> DispatchOutcome {
        let Some(id) = request.transform_id() else {
            return DispatchOutcome::MissingId;
        };

        let transform = match self.registry.get(id) {
            Ok(transform) => transform,
            Err(_) => {
                warn!(transform_id = id, "请求的转换不存在");
                return DispatchOutcome::UnknownId(id.to_string());
            }
        };

        match AssertUnwindSafe(transform.execute(&request.payload))
            .catch_unwind()
            .await
        {
            Ok(Ok(output)) => DispatchOutcome::Transformed(output),
            Ok(Err(e)) => {
                warn!(transform_id = id, "转换执行失败: {e}");
                DispatchOutcome::ExecutionFailed(e.to_string())
            }
            Err(_) => {
                error!(transform_id = id, "转换执行时发生panic");
                DispatchOutcome::ExecutionFailed(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_statuses() {
        assert_eq!(
            DispatchOutcome::Transformed(vec![]).status(),
            ReplyStatus::Ok
        );
        assert_eq!(DispatchOutcome::MissingId.status(), ReplyStatus::BadRequest);
        assert_eq!(
            DispatchOutcome::UnknownId("x".into()).status(),
            ReplyStatus::NotFound
        );
        assert_eq!(
            DispatchOutcome::ExecutionFailed("x".into()).status(),
            ReplyStatus::InternalError
        );
    }

    #[test]
    fn test_outcome_reply_bodies() {
        let reply = DispatchOutcome::MissingId.into_reply("c");
        assert_eq!(reply.body_text(), "Received request without id");

        let reply = DispatchOutcome::UnknownId("receipt".into()).into_reply("c");
        assert_eq!(reply.body_text(), "No such transform 'receipt'");

        let reply = DispatchOutcome::ExecutionFailed("  ".into()).into_reply("c");
        assert_eq!(reply.body_text(), UNEXPECTED_ERROR);

        let reply = DispatchOutcome::ExecutionFailed("bad xml".into()).into_reply("c");
        assert_eq!(reply.body_text(), "bad xml");
    }
}

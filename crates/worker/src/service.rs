use std::sync::Arc;

use futures::{Stream, StreamExt};
use lapin::{
    message::Delivery,
    options::{BasicAckOptions, BasicNackOptions},
};
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use xaas_core::{ReplyPublisher, Result, XaasError};
use xaas_infrastructure::inbound_request;

use crate::dispatcher::RequestDispatcher;

/// 转换Worker
///
/// 从消费者读取投递，每个投递在独立任务中调度，
/// 并发数量受 `max_concurrent_requests` 限制。
pub struct TransformWorker {
    dispatcher: Arc<RequestDispatcher>,
    publisher: Arc<dyn ReplyPublisher>,
    max_concurrent_requests: usize,
}

impl TransformWorker {
    pub fn new(
        dispatcher: Arc<RequestDispatcher>,
        publisher: Arc<dyn ReplyPublisher>,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            dispatcher,
            publisher,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// 消费直到收到关闭信号或消费者结束，返回前等待进行中的请求完成
    ///
    /// `deliveries` 通常是 `lapin::Consumer`。
    pub async fn run<S>(
        &self,
        mut deliveries: S,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()>
    where
        S: Stream<Item = lapin::Result<Delivery>> + Unpin,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));
        let mut in_flight = JoinSet::new();

        info!(
            max_concurrent_requests = self.max_concurrent_requests,
            "转换Worker开始消费"
        );

        let result = loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("转换Worker收到关闭信号，停止消费");
                    break Ok(());
                }
                delivery = deliveries.next() => {
                    let delivery = match delivery {
                        Some(Ok(delivery)) => delivery,
                        Some(Err(e)) => {
                            error!("接收消息失败: {e}");
                            break Err(XaasError::MessageQueue(format!("接收消息失败: {e}")));
                        }
                        None => {
                            warn!("消费者已关闭");
                            break Ok(());
                        }
                    };

                    // 许可全部被占用时仍需响应关闭信号，未处理的投递由通道关闭后重新入队
                    let permit = tokio::select! {
                        _ = shutdown_rx.recv() => {
                            info!("转换Worker收到关闭信号，停止消费");
                            break Ok(());
                        }
                        permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(e) => break Err(XaasError::Internal(format!("获取并发许可失败: {e}"))),
                        },
                    };

                    let dispatcher = Arc::clone(&self.dispatcher);
                    let publisher = Arc::clone(&self.publisher);
                    in_flight.spawn(async move {
                        let _permit = permit;
                        process_delivery(&dispatcher, publisher.as_ref(), delivery).await;
                    });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("请求处理任务异常退出: {e}");
                    }
                }
            }
        };

        if !in_flight.is_empty() {
            info!("等待 {} 个进行中的请求完成", in_flight.len());
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("请求处理任务异常退出: {e}");
            }
        }

        info!("转换Worker已停止");
        result
    }
}

/// 调度一次投递并在回复发出后确认
///
/// 无法回复的投递同样确认；回复发布失败时拒绝且不重新入队。
async fn process_delivery(
    dispatcher: &RequestDispatcher,
    publisher: &dyn ReplyPublisher,
    delivery: Delivery,
) {
    let request = inbound_request(&delivery.properties, &delivery.data);

    let settled = match dispatcher.handle(&request, publisher).await {
        Ok(status) => {
            debug!(
                delivery_tag = delivery.delivery_tag,
                status = ?status.map(|s| s.code()),
                "确认消息"
            );
            delivery.acker.ack(BasicAckOptions::default()).await
        }
        Err(e) => {
            error!(delivery_tag = delivery.delivery_tag, "发布回复失败: {e}");
            delivery
                .acker
                .nack(BasicNackOptions {
                    requeue: false,
                    ..Default::default()
                })
                .await
        }
    };

    if let Err(e) = settled {
        error!(delivery_tag = delivery.delivery_tag, "确认消息失败: {e}");
    }
}

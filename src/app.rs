use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{info, warn};
use xaas_core::{config::TransformConfig, AppConfig};
use xaas_infrastructure::{
    DispatchMetrics, FsTransformSource, ProcessTransformCompiler, RabbitMQConnection,
};
use xaas_worker::{RequestDispatcher, TransformRegistry, TransformWorker};

/// 主应用程序
pub struct Application {
    connection: RabbitMQConnection,
    worker: TransformWorker,
}

impl Application {
    /// 加载并编译全部转换后连接消息队列
    ///
    /// 转换加载失败时不会建立任何连接。
    pub async fn new(config: AppConfig) -> Result<Self> {
        let registry = load_registry(&config.transforms).await?;
        if registry.is_empty() {
            warn!(
                "目录 {} 下没有找到任何转换定义，所有请求都将返回404",
                config.transforms.root.display()
            );
        }

        let dispatcher = Arc::new(
            RequestDispatcher::new(Arc::new(registry))
                .with_metrics(Arc::new(DispatchMetrics::new())),
        );

        let connection = RabbitMQConnection::new(config.message_queue.clone())
            .await
            .with_context(|| {
                format!(
                    "连接消息队列失败: {}",
                    config.message_queue.display_target()
                )
            })?;

        let worker = TransformWorker::new(
            dispatcher,
            Arc::new(connection.reply_publisher()),
            config.worker.max_concurrent_requests,
        );

        Ok(Self { connection, worker })
    }

    /// 消费请求直到收到关闭信号
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let consumer = self.connection.create_consumer().await?;
        info!("开始监听队列: {}", self.connection.queue_name());

        self.worker.run(consumer, shutdown_rx).await?;
        Ok(())
    }

    /// 关闭消息队列连接
    pub async fn close(&self) -> Result<()> {
        if self.connection.is_connected() {
            self.connection.close().await?;
        }
        Ok(())
    }
}

/// 扫描转换目录并编译所有定义
pub async fn load_registry(config: &TransformConfig) -> Result<TransformRegistry> {
    info!(
        root = %config.root.display(),
        extension = %config.extension,
        processor = %config.processor.program,
        "加载转换定义"
    );

    let source = FsTransformSource::new(config.root.clone(), config.extension.clone());
    let compiler = ProcessTransformCompiler::new(config.processor.clone());

    TransformRegistry::load(&source, &compiler)
        .await
        .with_context(|| format!("加载转换定义失败: {}", config.root.display()))
}

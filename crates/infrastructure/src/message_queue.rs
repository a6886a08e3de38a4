use async_trait::async_trait;
use lapin::{
    options::*,
    types::{AMQPValue, FieldTable},
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer, Queue,
};
use tracing::{debug, info};
use xaas_core::{
    config::MessageQueueConfig,
    models::{Reply, CONTENT_ENCODING, CONTENT_TYPE, STATUS_HEADER},
    ReplyPublisher, Result, XaasError,
};

/// RabbitMQ连接
///
/// 负责连接、通道、预取设置和请求队列声明。
pub struct RabbitMQConnection {
    connection: Connection,
    channel: Channel,
    config: MessageQueueConfig,
}

impl RabbitMQConnection {
    /// 连接RabbitMQ并声明请求队列
    pub async fn new(config: MessageQueueConfig) -> Result<Self> {
        let connection = Connection::connect(&config.build_url(), ConnectionProperties::default())
            .await
            .map_err(|e| XaasError::MessageQueue(format!("连接RabbitMQ失败: {e}")))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| XaasError::MessageQueue(format!("创建通道失败: {e}")))?;

        info!("成功连接到RabbitMQ: {}", config.display_target());

        channel
            .basic_qos(config.prefetch_count, BasicQosOptions::default())
            .await
            .map_err(|e| XaasError::MessageQueue(format!("设置预取数量失败: {e}")))?;

        let mq = Self {
            connection,
            channel,
            config,
        };

        mq.declare_queue().await?;

        Ok(mq)
    }

    /// 按配置声明请求队列
    async fn declare_queue(&self) -> Result<Queue> {
        let queue_name = &self.config.queue;
        let queue = self
            .channel
            .queue_declare(
                queue_name,
                QueueDeclareOptions {
                    durable: self.config.durable,
                    exclusive: self.config.exclusive,
                    auto_delete: self.config.auto_delete,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| XaasError::MessageQueue(format!("声明队列 {queue_name} 失败: {e}")))?;

        info!(
            queue = %queue_name,
            durable = self.config.durable,
            exclusive = self.config.exclusive,
            auto_delete = self.config.auto_delete,
            "队列声明成功"
        );
        Ok(queue)
    }

    /// 创建请求队列的消费者（手动确认）
    pub async fn create_consumer(&self) -> Result<Consumer> {
        let consumer = self
            .channel
            .basic_consume(
                &self.config.queue,
                &self.config.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| XaasError::MessageQueue(format!("创建消费者失败: {e}")))?;

        debug!(
            "为队列 {} 创建消费者: {}",
            self.config.queue, self.config.consumer_tag
        );
        Ok(consumer)
    }

    /// 基于当前通道的回复发布器
    pub fn reply_publisher(&self) -> RabbitMQReplyPublisher {
        RabbitMQReplyPublisher::new(self.channel.clone())
    }

    pub fn queue_name(&self) -> &str {
        &self.config.queue
    }

    /// 获取连接状态
    pub fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }

    /// 关闭连接
    pub async fn close(&self) -> Result<()> {
        self.connection
            .close(200, "正常关闭")
            .await
            .map_err(|e| XaasError::MessageQueue(format!("关闭连接失败: {e}")))?;

        info!("RabbitMQ连接已关闭");
        Ok(())
    }
}

/// 通过默认交换机把回复发送到调用方指定的回复队列
#[derive(Clone)]
pub struct RabbitMQReplyPublisher {
    channel: Channel,
}

impl RabbitMQReplyPublisher {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

/// 构造回复消息属性：状态头、固定的内容类型与编码以及关联ID
pub fn reply_properties(reply: &Reply) -> BasicProperties {
    let mut headers = FieldTable::default();
    headers.insert(
        STATUS_HEADER.into(),
        AMQPValue::LongInt(i32::from(reply.status.code())),
    );

    BasicProperties::default()
        .with_content_type(CONTENT_TYPE.into())
        .with_content_encoding(CONTENT_ENCODING.into())
        .with_correlation_id(reply.correlation_id.as_str().into())
        .with_headers(headers)
}

#[async_trait]
impl ReplyPublisher for RabbitMQReplyPublisher {
    async fn publish(&self, reply_to: &str, reply: &Reply) -> Result<()> {
        let confirm = self
            .channel
            .basic_publish(
                "",
                reply_to,
                BasicPublishOptions::default(),
                &reply.body,
                reply_properties(reply),
            )
            .await
            .map_err(|e| XaasError::MessageQueue(format!("发布回复到 {reply_to} 失败: {e}")))?;

        // 等待确认
        confirm
            .await
            .map_err(|e| XaasError::MessageQueue(format!("回复发布确认失败: {e}")))?;

        debug!(
            reply_to = reply_to,
            correlation_id = %reply.correlation_id,
            status = reply.status.code(),
            "回复已发布"
        );
        Ok(())
    }
}

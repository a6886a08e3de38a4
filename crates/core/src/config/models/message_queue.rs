use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// RabbitMQ connection and queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageQueueConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub virtual_host: String,
    /// Full AMQP URL; takes precedence over the individual connection fields
    pub url: Option<String>,
    pub queue: String,
    pub durable: bool,
    pub exclusive: bool,
    pub auto_delete: bool,
    pub prefetch_count: u16,
    pub consumer_tag: String,
}

impl Default for MessageQueueConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5672,
            username: "guest".to_string(),
            password: "guest".to_string(),
            virtual_host: "/".to_string(),
            url: None,
            queue: "xaas.transform".to_string(),
            durable: false,
            exclusive: false,
            auto_delete: true,
            prefetch_count: 16,
            consumer_tag: "xaas-worker".to_string(),
        }
    }
}

impl MessageQueueConfig {
    /// Validate message queue configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.queue.is_empty() {
            return Err(anyhow::anyhow!("队列名称不能为空"));
        }

        if self.prefetch_count == 0 {
            return Err(anyhow::anyhow!("预取数量必须大于0"));
        }

        if let Some(url) = self.explicit_url() {
            if !url.starts_with("amqp://") && !url.starts_with("amqps://") {
                return Err(anyhow::anyhow!("RabbitMQ URL必须是AMQP格式"));
            }
            return Ok(());
        }

        if self.host.is_empty() {
            return Err(anyhow::anyhow!("RabbitMQ主机地址不能为空"));
        }

        if self.port == 0 {
            return Err(anyhow::anyhow!("RabbitMQ端口必须大于0"));
        }

        Ok(())
    }

    /// Build the AMQP connection URL
    ///
    /// Credentials and vhost are percent-encoded so any broker password works.
    pub fn build_url(&self) -> String {
        if let Some(url) = self.explicit_url() {
            return url.to_string();
        }
        format!(
            "amqp://{}:{}@{}:{}/{}",
            encode_component(&self.username),
            encode_component(&self.password),
            self.host,
            self.port,
            encode_component(&self.virtual_host)
        )
    }

    /// Connection target safe for logging (no credentials)
    pub fn display_target(&self) -> String {
        match self.explicit_url() {
            Some(url) => match url.rsplit_once('@') {
                Some((_, host)) => format!("amqp://***@{host}"),
                None => url.to_string(),
            },
            None => format!(
                "{}:{}{} as user '{}'",
                self.host, self.port, self.virtual_host, self.username
            ),
        }
    }

    fn explicit_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// URI unreserved characters stay literal
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_component(component: &str) -> String {
    utf8_percent_encode(component, URI_COMPONENT).to_string()
}

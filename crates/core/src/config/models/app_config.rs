use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    message_queue::MessageQueueConfig,
    transforms::TransformConfig,
    worker_observability::{ObservabilityConfig, WorkerConfig},
};

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub message_queue: MessageQueueConfig,
    pub transforms: TransformConfig,
    pub worker: WorkerConfig,
    pub observability: ObservabilityConfig,
}

/// Default config file locations, checked in order when no path is given
const DEFAULT_CONFIG_PATHS: [&str; 3] = ["config/xaas.toml", "xaas.toml", "/etc/xaas/config.toml"];

impl AppConfig {
    /// Load configuration from config file and the process environment
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: XAAS_, nesting: `__`)
    /// 4. Legacy variables (AMQP_*, XSLT_ROOT) - highest priority
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let env: Map<String, String> = std::env::vars().collect();
        Self::load_with_env(config_path, &env)
    }

    /// Load configuration against an explicit environment snapshot
    pub fn load_with_env(config_path: Option<&str>, env: &Map<String, String>) -> Result<Self> {
        let defaults =
            ConfigBuilder::try_from(&AppConfig::default()).context("构建默认配置失败")?;
        let mut builder = ConfigBuilder::builder().add_source(defaults);

        // 1. Config file if provided, else the first default location that exists
        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        // 2. XAAS_ environment variables
        builder = builder.add_source(
            Environment::with_prefix("XAAS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        );

        // 3. Legacy variables
        let port = env
            .get("AMQP_PORT")
            .map(|port| port.parse::<i64>())
            .transpose()
            .context("AMQP_PORT不是有效的端口号")?;

        builder = builder
            .set_override_option("message_queue.host", env.get("AMQP_HOST").cloned())?
            .set_override_option("message_queue.port", port)?
            .set_override_option("message_queue.username", env.get("AMQP_USER").cloned())?
            .set_override_option("message_queue.password", env.get("AMQP_PASSWORD").cloned())?
            .set_override_option("message_queue.virtual_host", env.get("AMQP_VHOST").cloned())?
            .set_override_option("message_queue.url", env.get("AMQP_URL").cloned())?
            .set_override_option("message_queue.queue", env.get("AMQP_QUEUE").cloned())?
            .set_override_option(
                "message_queue.durable",
                parse_legacy_flag(env.get("AMQP_DURABLE")),
            )?
            .set_override_option(
                "message_queue.exclusive",
                parse_legacy_flag(env.get("AMQP_EXCLUSIVE")),
            )?
            .set_override_option(
                "message_queue.auto_delete",
                parse_legacy_flag(env.get("AMQP_AUTODELETE")),
            )?
            .set_override_option("transforms.root", env.get("XSLT_ROOT").cloned())?;

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// Validate configuration effectiveness
    pub fn validate(&self) -> Result<()> {
        self.message_queue
            .validate()
            .context("消息队列配置验证失败")?;

        self.transforms.validate().context("转换配置验证失败")?;

        self.worker.validate().context("Worker配置验证失败")?;

        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }
}

/// Legacy boolean flags: unset keeps the default, `0`/`false` disable,
/// any other value enables
pub fn parse_legacy_flag(value: Option<&String>) -> Option<bool> {
    value.map(|value| !matches!(value.as_str(), "0" | "false"))
}

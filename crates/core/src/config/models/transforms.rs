use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the stylesheet path in processor arguments
pub const STYLESHEET_PLACEHOLDER: &str = "{stylesheet}";
/// Placeholder replaced with the input document path in processor arguments
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Transform definitions configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Root directory scanned for transform definitions
    pub root: PathBuf,
    /// File extension of transform definitions (without the dot)
    pub extension: String,
    pub processor: ProcessorConfig,
}

/// External transformation processor invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extension: "xsl".to_string(),
            processor: ProcessorConfig::default(),
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            program: "xsltproc".to_string(),
            args: vec![
                STYLESHEET_PLACEHOLDER.to_string(),
                INPUT_PLACEHOLDER.to_string(),
            ],
        }
    }
}

impl TransformConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("转换定义根目录不能为空"));
        }

        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(anyhow::anyhow!(
                "转换定义扩展名无效: '{}'（不应为空或以.开头）",
                self.extension
            ));
        }

        self.processor.validate()
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.program.is_empty() {
            return Err(anyhow::anyhow!("转换处理器程序不能为空"));
        }

        if !self.args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER)) {
            return Err(anyhow::anyhow!(
                "转换处理器参数必须包含 {INPUT_PLACEHOLDER} 占位符"
            ));
        }

        Ok(())
    }
}

fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".xaas")
}

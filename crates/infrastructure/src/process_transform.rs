//! 基于外部处理器进程的转换引擎
//!
//! 编译阶段只检查定义文件可读且为非空文本；执行阶段把负载写入临时文件，
//! 以配置的程序和参数启动处理器（如 `xsltproc`），标准输出即为转换结果。

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use xaas_core::{
    config::{
        models::transforms::{INPUT_PLACEHOLDER, STYLESHEET_PLACEHOLDER},
        ProcessorConfig,
    },
    Result, Transform, TransformCompiler, TransformDefinition, TransformError, XaasError,
};

/// 进程转换编译器
#[derive(Debug, Clone)]
pub struct ProcessTransformCompiler {
    processor: ProcessorConfig,
}

impl ProcessTransformCompiler {
    pub fn new(processor: ProcessorConfig) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl TransformCompiler for ProcessTransformCompiler {
    async fn compile(&self, definition: &TransformDefinition) -> Result<Arc<dyn Transform>> {
        let compile_error = |message: String| XaasError::TransformCompile {
            id: definition.id.to_string(),
            message,
        };

        let content = tokio::fs::read(&definition.path)
            .await
            .map_err(|e| compile_error(format!("读取 {} 失败: {e}", definition.path.display())))?;

        let text = std::str::from_utf8(&content)
            .map_err(|e| compile_error(format!("不是有效的UTF-8文本: {e}")))?;

        if text.trim().is_empty() {
            return Err(compile_error("转换定义为空".to_string()));
        }

        Ok(Arc::new(ProcessTransform::new(
            definition.path.clone(),
            self.processor.clone(),
        )))
    }
}

/// 通过外部处理器执行的转换
#[derive(Debug, Clone)]
pub struct ProcessTransform {
    stylesheet: PathBuf,
    processor: ProcessorConfig,
}

impl ProcessTransform {
    pub fn new(stylesheet: PathBuf, processor: ProcessorConfig) -> Self {
        Self {
            stylesheet,
            processor,
        }
    }

    fn command_args(&self, input: &Path) -> Vec<String> {
        let stylesheet = self.stylesheet.to_string_lossy();
        let input = input.to_string_lossy();
        self.processor
            .args
            .iter()
            .map(|arg| {
                arg.replace(STYLESHEET_PLACEHOLDER, &stylesheet)
                    .replace(INPUT_PLACEHOLDER, &input)
            })
            .collect()
    }
}

#[async_trait]
impl Transform for ProcessTransform {
    async fn execute(&self, input: &[u8]) -> std::result::Result<Vec<u8>, TransformError> {
        let input_file = tempfile::NamedTempFile::new()?;
        tokio::fs::write(input_file.path(), input).await?;

        let args = self.command_args(input_file.path());
        debug!(program = %self.processor.program, ?args, "启动转换处理器");

        let output = Command::new(&self.processor.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                TransformError::Execution(format!(
                    "failed to start processor '{}': {e}",
                    self.processor.program
                ))
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            Err(TransformError::Execution(format!(
                "processor exited with {}",
                output.status
            )))
        } else {
            Err(TransformError::Execution(stderr))
        }
    }
}

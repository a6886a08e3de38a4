//! 转换能力接口定义
//!
//! 此模块定义了转换引擎对调度核心暴露的抽象接口：
//! - 已编译转换的执行接口
//! - 转换定义的来源
//! - 将定义编译为可执行转换的编译器
//!
//! 调度核心只依赖这些接口，具体的引擎（例如调用外部XSLT处理器）
//! 在基础设施层实现，测试中可以用桩实现替换。
//!
//! ## 使用示例
//!
//! ```rust
//! use async_trait::async_trait;
//! use xaas_core::traits::{Transform, TransformError};
//!
//! struct Uppercase;
//!
//! #[async_trait]
//! impl Transform for Uppercase {
//!     async fn execute(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
//!         let text = std::str::from_utf8(input)
//!             .map_err(|e| TransformError::MalformedInput(e.to_string()))?;
//!         Ok(text.to_uppercase().into_bytes())
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{models::TransformId, Result};

/// 转换执行失败
///
/// 错误的显示文本会作为诊断信息回传给调用方。
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{0}")]
    MalformedInput(String),

    #[error("{0}")]
    Execution(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 已编译的转换
///
/// 实现必须支持并发调用。
#[async_trait]
pub trait Transform: Send + Sync {
    async fn execute(&self, input: &[u8]) -> std::result::Result<Vec<u8>, TransformError>;
}

/// 单个转换定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformDefinition {
    pub id: TransformId,
    pub path: PathBuf,
}

/// 转换定义来源
pub trait TransformSource: Send + Sync {
    /// 列出所有可用的转换定义
    fn definitions(&self) -> Result<Vec<TransformDefinition>>;
}

/// 转换编译器
#[async_trait]
pub trait TransformCompiler: Send + Sync {
    /// 将定义编译为可执行的转换
    async fn compile(&self, definition: &TransformDefinition) -> Result<Arc<dyn Transform>>;
}

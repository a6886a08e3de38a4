use thiserror::Error;

/// 转换服务错误类型定义
#[derive(Debug, Error)]
pub enum XaasError {
    #[error("消息队列错误: {0}")]
    MessageQueue(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("转换未找到: {id}")]
    TransformNotFound { id: String },

    #[error("编译转换 {id} 失败: {message}")]
    TransformCompile { id: String, message: String },

    #[error("转换执行错误: {0}")]
    TransformExecution(String),

    #[error("扫描转换定义失败: {0}")]
    DefinitionScan(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type Result<T> = std::result::Result<T, XaasError>;

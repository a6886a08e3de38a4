#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};
use xaas_core::{
    models::TransformId, Reply, ReplyPublisher, Result, Transform, TransformCompiler,
    TransformDefinition, TransformError, TransformSource, XaasError,
};

/// 把输入包裹在固定前缀中返回，便于断言输出来自哪个转换
pub struct TaggingTransform {
    pub tag: String,
    pub calls: AtomicUsize,
}

impl TaggingTransform {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn expected_output(tag: &str, input: &[u8]) -> Vec<u8> {
        let mut output = format!("<{tag}>").into_bytes();
        output.extend_from_slice(input);
        output
    }
}

#[async_trait]
impl Transform for TaggingTransform {
    async fn execute(&self, input: &[u8]) -> std::result::Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::expected_output(&self.tag, input))
    }
}

/// 总是失败的转换
pub struct FailingTransform {
    pub message: String,
}

#[async_trait]
impl Transform for FailingTransform {
    async fn execute(&self, _input: &[u8]) -> std::result::Result<Vec<u8>, TransformError> {
        Err(TransformError::Execution(self.message.clone()))
    }
}

/// 执行时panic的转换
pub struct PanickingTransform;

#[async_trait]
impl Transform for PanickingTransform {
    async fn execute(&self, _input: &[u8]) -> std::result::Result<Vec<u8>, TransformError> {
        panic!("stylesheet engine crashed");
    }
}

/// 在放行之前一直阻塞的转换，输出原样返回输入
pub struct GatedTransform {
    pub calls: AtomicUsize,
    gate: Semaphore,
}

impl GatedTransform {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: Semaphore::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[async_trait]
impl Transform for GatedTransform {
    async fn execute(&self, input: &[u8]) -> std::result::Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _open = self
            .gate
            .acquire()
            .await
            .map_err(|e| TransformError::Execution(e.to_string()))?;
        Ok(input.to_vec())
    }
}

/// 记录所有发布的回复
#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Mutex<Vec<(String, Reply)>>,
}

impl RecordingPublisher {
    pub async fn published(&self) -> Vec<(String, Reply)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl ReplyPublisher for RecordingPublisher {
    async fn publish(&self, reply_to: &str, reply: &Reply) -> Result<()> {
        self.published
            .lock()
            .await
            .push((reply_to.to_string(), reply.clone()));
        Ok(())
    }
}

/// 发布总是失败的发布器
pub struct BrokenPublisher;

#[async_trait]
impl ReplyPublisher for BrokenPublisher {
    async fn publish(&self, reply_to: &str, _reply: &Reply) -> Result<()> {
        Err(XaasError::MessageQueue(format!("channel closed for {reply_to}")))
    }
}

/// 固定定义列表的来源
pub struct StaticSource {
    pub definitions: Vec<TransformDefinition>,
}

impl StaticSource {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            definitions: ids
                .iter()
                .map(|id| TransformDefinition {
                    id: TransformId::new(*id),
                    path: PathBuf::from(format!("/defs/{id}.xsl")),
                })
                .collect(),
        }
    }
}

impl TransformSource for StaticSource {
    fn definitions(&self) -> Result<Vec<TransformDefinition>> {
        Ok(self.definitions.clone())
    }
}

/// 扫描失败的来源
pub struct UnreadableSource;

impl TransformSource for UnreadableSource {
    fn definitions(&self) -> Result<Vec<TransformDefinition>> {
        Err(XaasError::DefinitionScan("permission denied".to_string()))
    }
}

/// 编译为 TaggingTransform，标签取自定义路径，指定的标识编译失败
#[derive(Default)]
pub struct StubCompiler {
    pub broken: HashSet<String>,
    pub compiled: AtomicUsize,
}

impl StubCompiler {
    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            broken: ids.iter().map(|id| id.to_string()).collect(),
            compiled: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TransformCompiler for StubCompiler {
    async fn compile(&self, definition: &TransformDefinition) -> Result<Arc<dyn Transform>> {
        if self.broken.contains(definition.id.as_str()) {
            return Err(XaasError::TransformCompile {
                id: definition.id.to_string(),
                message: "XTSE0010: unknown element".to_string(),
            });
        }
        self.compiled.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(TaggingTransform::new(
            &definition.path.to_string_lossy(),
        )))
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};
use xaas_core::{
    models::TransformId, Result, Transform, TransformCompiler, TransformSource, XaasError,
};

/// 转换注册表
///
/// 启动时一次性构建，之后只读，可在多个并发调度之间直接共享。
pub struct TransformRegistry {
    transforms: HashMap<TransformId, Arc<dyn Transform>>,
}

impl TransformRegistry {
    /// 扫描定义来源并逐个编译
    ///
    /// 任何一个定义编译失败都会使整个加载失败，不返回部分注册表。
    pub async fn load(
        source: &dyn TransformSource,
        compiler: &dyn TransformCompiler,
    ) -> Result<Self> {
        let definitions = source.definitions()?;
        let mut transforms = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            let transform = compiler.compile(&definition).await?;
            info!(
                transform_id = %definition.id,
                path = %definition.path.display(),
                "已编译转换"
            );

            if transforms.insert(definition.id.clone(), transform).is_some() {
                warn!("转换 {} 重复定义，使用最后加载的定义", definition.id);
            }
        }

        info!("共编译 {} 个转换", transforms.len());
        Ok(Self { transforms })
    }

    /// 由已编译的转换直接构建，重复的标识以后者为准
    pub fn from_transforms<I>(transforms: I) -> Self
    where
        I: IntoIterator<Item = (TransformId, Arc<dyn Transform>)>,
    {
        Self {
            transforms: transforms.into_iter().collect(),
        }
    }

    /// 按标识查找转换
    pub fn get(&self, id: &str) -> Result<Arc<dyn Transform>> {
        self.transforms
            .get(id)
            .cloned()
            .ok_or_else(|| XaasError::TransformNotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.transforms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// 已注册的标识，按字典序排列
    pub fn ids(&self) -> Vec<&TransformId> {
        let mut ids: Vec<&TransformId> = self.transforms.keys().collect();
        ids.sort();
        ids
    }
}

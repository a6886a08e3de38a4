use std::path::PathBuf;

use walkdir::WalkDir;
use xaas_core::{
    models::TransformId, Result, TransformDefinition, TransformSource, XaasError,
};

/// 文件系统转换定义来源
///
/// 递归扫描根目录，每个带有指定扩展名的文件都是一个转换定义。
#[derive(Debug, Clone)]
pub struct FsTransformSource {
    root: PathBuf,
    extension: String,
}

impl FsTransformSource {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }
}

impl TransformSource for FsTransformSource {
    fn definitions(&self) -> Result<Vec<TransformDefinition>> {
        if !self.root.is_dir() {
            return Err(XaasError::DefinitionScan(format!(
                "转换定义根目录不存在: {}",
                self.root.display()
            )));
        }

        let mut definitions = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| XaasError::DefinitionScan(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(id) = TransformId::from_path(&self.root, entry.path(), &self.extension) {
                definitions.push(TransformDefinition {
                    id,
                    path: entry.into_path(),
                });
            }
        }

        Ok(definitions)
    }
}

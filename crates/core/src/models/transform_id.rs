use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// 转换标识
///
/// 注册表中的键。文件系统中的定义按相对路径命名，
/// 多级目录之间使用 `/` 连接。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformId(String);

impl TransformId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 根据定义文件路径推导转换标识
    ///
    /// 路径不在 `root` 之下或扩展名不匹配时返回 `None`。
    pub fn from_path(root: &Path, path: &Path, extension: &str) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        if relative.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            return None;
        }

        let stem = relative.with_extension("");
        let parts: Vec<String> = stem
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            return None;
        }

        Some(Self(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TransformId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransformId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TransformId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

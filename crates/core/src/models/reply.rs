use std::borrow::Cow;
use std::fmt;

/// 回复的内容类型
pub const CONTENT_TYPE: &str = "text/plain";
/// 回复的内容编码
pub const CONTENT_ENCODING: &str = "utf8";
/// 回复头中携带状态码的字段名
pub const STATUS_HEADER: &str = "status";

/// 回复状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyStatus {
    /// 转换成功
    Ok,
    /// 请求缺少转换标识
    BadRequest,
    /// 转换标识未注册
    NotFound,
    /// 转换执行失败
    InternalError,
}

impl ReplyStatus {
    pub fn code(self) -> u16 {
        match self {
            ReplyStatus::Ok => 200,
            ReplyStatus::BadRequest => 400,
            ReplyStatus::NotFound => 404,
            ReplyStatus::InternalError => 500,
        }
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 发往回复地址的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub correlation_id: String,
    pub status: ReplyStatus,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(correlation_id: impl Into<String>, status: ReplyStatus, body: Vec<u8>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            status,
            body,
        }
    }

    pub fn ok(correlation_id: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(correlation_id, ReplyStatus::Ok, body)
    }

    pub fn bad_request(correlation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            correlation_id,
            ReplyStatus::BadRequest,
            message.into().into_bytes(),
        )
    }

    pub fn not_found(correlation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            correlation_id,
            ReplyStatus::NotFound,
            message.into().into_bytes(),
        )
    }

    pub fn internal_error(correlation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            correlation_id,
            ReplyStatus::InternalError,
            message.into().into_bytes(),
        )
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    pub fn content_encoding(&self) -> &'static str {
        CONTENT_ENCODING
    }

    /// 以文本形式查看回复内容（非UTF-8字节会被替换）
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

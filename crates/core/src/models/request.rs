/// 请求头中携带转换标识的字段名
pub const ID_HEADER: &str = "id";

/// 入站转换请求
///
/// 由一次消息投递构造，被调度器消费一次后丢弃。
/// 元数据字段均为可选，缺失时由调度器决定如何处理。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    pub id: Option<String>,
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
    pub payload: Vec<u8>,
}

/// 回复目的地：回复地址加关联ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub reply_to: String,
    pub correlation_id: String,
}

impl InboundRequest {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// 获取回复目的地
    ///
    /// 回复地址或关联ID缺失（或为空）时无法回复，返回 `None`。
    pub fn reply_target(&self) -> Option<ReplyTarget> {
        let reply_to = self.reply_to.as_deref().filter(|s| !s.is_empty())?;
        let correlation_id = self.correlation_id.as_deref().filter(|s| !s.is_empty())?;
        Some(ReplyTarget {
            reply_to: reply_to.to_string(),
            correlation_id: correlation_id.to_string(),
        })
    }

    /// 请求的转换标识，原样返回；空白字符串视为缺失
    pub fn transform_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_target_requires_both_fields() {
        let request = InboundRequest::new("<a/>").with_reply_to("amq.rabbitmq.reply-to");
        assert!(request.reply_target().is_none());

        let request = InboundRequest::new("<a/>").with_correlation_id("c-1");
        assert!(request.reply_target().is_none());

        let request = InboundRequest::new("<a/>")
            .with_reply_to("replies")
            .with_correlation_id("c-1");
        assert_eq!(
            request.reply_target(),
            Some(ReplyTarget {
                reply_to: "replies".to_string(),
                correlation_id: "c-1".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_reply_to_is_unanswerable() {
        let request = InboundRequest::new("<a/>")
            .with_reply_to("")
            .with_correlation_id("c-1");
        assert!(request.reply_target().is_none());
    }

    #[test]
    fn test_blank_id_counts_as_missing() {
        assert_eq!(InboundRequest::new("").with_id("  ").transform_id(), None);
        assert_eq!(InboundRequest::new("").transform_id(), None);
        assert_eq!(
            InboundRequest::new("").with_id("invoice").transform_id(),
            Some("invoice")
        );
    }

    #[test]
    fn test_padded_id_is_kept_verbatim() {
        assert_eq!(
            InboundRequest::new("").with_id(" invoice\n").transform_id(),
            Some(" invoice\n")
        );
    }
}

use lapin::{types::AMQPValue, BasicProperties};
use xaas_core::models::{InboundRequest, ID_HEADER};

/// 把一次投递的属性和内容转换为入站请求
pub fn inbound_request(properties: &BasicProperties, data: &[u8]) -> InboundRequest {
    let id = properties.headers().as_ref().and_then(|headers| {
        headers
            .inner()
            .iter()
            .find(|(key, _)| key.as_str() == ID_HEADER)
            .and_then(|(_, value)| header_text(value))
    });

    InboundRequest {
        id,
        correlation_id: properties
            .correlation_id()
            .as_ref()
            .map(|value| value.as_str().to_string()),
        reply_to: properties
            .reply_to()
            .as_ref()
            .map(|value| value.as_str().to_string()),
        payload: data.to_vec(),
    }
}

/// 头字段的文本形式
///
/// 字符串原样使用，其他类型转换为文本后参与查找；只有空值视为缺失。
fn header_text(value: &AMQPValue) -> Option<String> {
    match value {
        AMQPValue::ShortString(s) => Some(s.as_str().to_string()),
        AMQPValue::LongString(s) => Some(String::from_utf8_lossy(s.as_bytes()).into_owned()),
        AMQPValue::ByteArray(bytes) => Some(String::from_utf8_lossy(bytes.as_slice()).into_owned()),
        AMQPValue::Boolean(b) => Some(b.to_string()),
        AMQPValue::ShortShortInt(n) => Some(n.to_string()),
        AMQPValue::ShortShortUInt(n) => Some(n.to_string()),
        AMQPValue::ShortInt(n) => Some(n.to_string()),
        AMQPValue::ShortUInt(n) => Some(n.to_string()),
        AMQPValue::LongInt(n) => Some(n.to_string()),
        AMQPValue::LongUInt(n) => Some(n.to_string()),
        AMQPValue::LongLongInt(n) => Some(n.to_string()),
        AMQPValue::Timestamp(n) => Some(n.to_string()),
        AMQPValue::Float(n) => Some(n.to_string()),
        AMQPValue::Double(n) => Some(n.to_string()),
        AMQPValue::Void => None,
        other => Some(format!("{other:?}")),
    }
}

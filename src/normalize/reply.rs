//! 回复文本提取

use serde_json::Value;

/// 英文兜底回复
pub const DEFAULT_FALLBACK_REPLY: &str = "Got it — how would you like to continue?";

const HEBREW_FALLBACK_REPLY: &str = "הבנתי. איך תרצה להמשיך?";

/// 按语言码选择兜底回复
pub fn fallback_reply_for(language_code: &str) -> &'static str {
    let primary = language_code
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match primary.as_str() {
        "he" | "iw" => HEBREW_FALLBACK_REPLY,
        _ => DEFAULT_FALLBACK_REPLY,
    }
}

/// 单条 responseMessage 的 text.text：字符串或字符串数组
#[derive(Debug, Clone, PartialEq)]
pub enum TextPayload {
    Absent,
    Text(String),
    TextList(Vec<String>),
}

impl TextPayload {
    /// 数组中的非字符串元素被丢弃
    pub fn decode(message: &Value) -> Self {
        match message.get("text").and_then(|t| t.get("text")) {
            Some(Value::String(s)) => TextPayload::Text(s.clone()),
            Some(Value::Array(items)) => TextPayload::TextList(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => TextPayload::Absent,
        }
    }

    fn fragments(self) -> Vec<String> {
        match self {
            TextPayload::Absent => Vec::new(),
            TextPayload::Text(s) => vec![s],
            TextPayload::TextList(list) => list,
        }
    }
}

/// 拼接 queryResult.responseMessages 中的全部文本片段（按出现顺序，换行分隔，首尾去空白）；
/// 没有任何文本时返回 fallback
pub fn extract_reply(agent_response: &Value, fallback: &str) -> String {
    let fragments: Vec<String> = agent_response
        .pointer("/queryResult/responseMessages")
        .and_then(Value::as_array)
        .map(|messages| {
            messages
                .iter()
                .flat_map(|m| TextPayload::decode(m).fragments())
                .collect()
        })
        .unwrap_or_default();

    let reply = fragments.join("\n").trim().to_string();
    if reply.is_empty() {
        fallback.to_string()
    } else {
        reply
    }
}

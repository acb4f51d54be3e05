//! 会话标识
//!
//! 会话 ID 只对下游对话 Agent 有意义，网关自身不保存任何会话状态。

/// 会话 ID 最大长度（字符数）
pub const MAX_SESSION_ID_LEN: usize = 36;

/// 解析会话 ID：有候选值则截断到 36 个字符后原样返回（不做其它校验）；
/// 缺省或为空时生成新的 UUID v4
pub fn resolve(candidate: Option<&str>) -> String {
    match candidate.filter(|c| !c.is_empty()) {
        Some(id) => truncate_chars(id, MAX_SESSION_ID_LEN),
        None => truncate_chars(&uuid::Uuid::new_v4().to_string(), MAX_SESSION_ID_LEN),
    }
}

/// 按字符截断（不会切开多字节字符）
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

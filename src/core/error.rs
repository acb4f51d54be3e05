//! 网关错误类型
//!
//! 三类错误的传播策略不同：
//! - AuthError / GatewayError：致命，直接返回给调用方
//! - VisionError：软失败，只记入 VisionResult，绝不中断本轮对话

use thiserror::Error;

/// 凭证获取失败（元数据服务器不可达、gcloud 未登录、响应缺字段等）
///
/// 消息中不包含任何 token 内容。
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Credential source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    #[error("Credential refresh timed out")]
    Timeout,
}

/// 视觉分析失败的各种情形（均为软失败）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisionError {
    #[error("{0}")]
    Transport(String),

    /// body 已截断到前 500 个字符
    #[error("Vision HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Vision payload missing vision_data")]
    MissingVisionData,

    #[error("Vision tool not configured")]
    NotConfigured,
}

/// 一次 /chat 请求中可能终止请求的错误
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// 下游 Agent 返回 >=400：状态码与响应体原样透传
    #[error("Agent HTTP {status}")]
    AgentHttp { status: u16, body: String },

    #[error("Agent request timed out")]
    AgentTimeout,

    #[error("Agent transport error: {0}")]
    AgentTransport(String),

    #[error("Config error: {0}")]
    Config(String),
}

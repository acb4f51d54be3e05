//! 对话 Agent：请求构造与 detectIntent 调用
//!
//! 目前没有重试：5xx / 超时直接失败并透传给调用方。

mod client;
mod request;

pub use client::{AgentClient, DialogueAgent};
pub use request::{AgentQueryParams, AgentRequestBuilder, DetectIntentRequest, QueryInput, TextInput};

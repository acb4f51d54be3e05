//! ComplyFlow - 对话 Agent 网关
//!
//! 模块划分：
//! - **session**: 会话 ID 解析与生成
//! - **auth**: 对话 Agent 平台的 Bearer Token 获取与缓存
//! - **vision**: 可选的视觉分析调用（软失败）
//! - **agent**: detectIntent 请求构造与调用
//! - **normalize**: 回复文本、参数与 UI 画像 / 合规清单的规范化
//! - **gateway**: 单次 /chat 请求的编排
//! - **server**: axum 路由（/chat、/health、CORS）
//! - **config**: 应用配置加载（TOML + 环境变量）

pub mod agent;
pub mod auth;
pub mod config;
pub mod core;
pub mod gateway;
pub mod normalize;
pub mod observability;
pub mod server;
pub mod session;
pub mod vision;

pub use gateway::{ChatGateway, ChatRequest, ChatResponse};

//! 网关编排层
//!
//! 一个 ChatGateway 覆盖「带 / 不带视觉增强」两种部署：视觉分析器是可选依赖，
//! 未配置时带图请求软失败，其余流程不变。

mod message;
mod orchestrator;

pub use message::{ChatRequest, ChatResponse};
pub use orchestrator::ChatGateway;

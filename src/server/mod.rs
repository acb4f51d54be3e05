//! HTTP 接入层：POST /chat、GET /health、CORS

mod error;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::core::GatewayError;
use crate::gateway::{ChatGateway, ChatRequest, ChatResponse};

pub use error::ErrorBody;

/// 创建网关路由
pub fn create_router(gateway: Arc<ChatGateway>) -> Router {
    let cors = cors_layer(&gateway.config().server.allowed_origins);
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .layer(cors)
        .with_state(gateway)
}

/// 白名单含 "*" 时放开所有来源；无法解析的来源跳过
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o.trim()) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(origin)
}

/// POST /chat
async fn chat(
    State(gateway): State<Arc<ChatGateway>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, GatewayError> {
    gateway.handle(req).await.map(Json)
}

/// /health 输出：仅用于诊断
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub agent_path: String,
    pub vision_tool_url: Option<String>,
    pub language_code: String,
    pub playbook: Option<String>,
    pub allowed_origins: Vec<String>,
}

/// GET /health：回显解析后的配置（不含凭证）
async fn health(State(gateway): State<Arc<ChatGateway>>) -> Json<HealthReport> {
    let cfg = gateway.config();
    Json(HealthReport {
        status: "ok",
        agent_path: cfg.agent.agent_path(),
        vision_tool_url: cfg.vision.tool_url.clone(),
        language_code: cfg.agent.language_code.clone(),
        playbook: cfg.agent.playbook_resource(),
        allowed_origins: cfg.server.allowed_origins.clone(),
    })
}

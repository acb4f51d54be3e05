//! GatewayError → HTTP 响应
//!
//! Agent 的 HTTP 错误保留下游状态码，detail 为下游响应体原文；
//! 其余错误映射为网关自身的 5xx，detail 不含凭证信息。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::core::GatewayError;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AgentHttp { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::AgentTimeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::AgentTransport(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Auth(_) | GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            GatewayError::AgentHttp { body, .. } => body,
            GatewayError::Auth(e) => {
                tracing::error!("Credential acquisition failed: {}", e);
                "Failed to obtain credentials for the dialogue agent".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

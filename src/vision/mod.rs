//! 视觉分析编排
//!
//! 仅在请求带图片时调用外部视觉工具。任何失败都只记录在 VisionResult 中，
//! 不会中断本轮对话；下游只拿到派生出的结构化属性（vision_data），不含原图。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::VisionSection;
use crate::core::{GatewayError, VisionError};
use crate::session::truncate_chars;

/// 错误信息中保留的响应体字符数
const ERROR_BODY_PREVIEW_CHARS: usize = 500;

/// 视觉分析器：输入 base64 图片（不带 data URI 前缀），返回 vision_data
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze(&self, image_base64: &str) -> Result<Value, VisionError>;
}

/// 单次视觉调用的结果，用于诊断输出（vision_debug）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VisionResult {
    pub fn from_outcome(outcome: Result<Value, VisionError>) -> Self {
        match outcome {
            Ok(data) => Self {
                success: true,
                vision_data: Some(data),
                error: None,
            },
            Err(e) => Self {
                success: false,
                vision_data: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// 通过 HTTP POST {image_data} 调用视觉工具
pub struct HttpVisionClient {
    http: reqwest::Client,
    tool_url: String,
}

impl HttpVisionClient {
    pub fn new(tool_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("vision http client: {}", e)))?;
        Ok(Self {
            http,
            tool_url: tool_url.into(),
        })
    }

    /// 未配置 tool_url 时返回 None
    pub fn from_config(cfg: &VisionSection) -> Result<Option<Arc<dyn VisionAnalyzer>>, GatewayError> {
        match cfg.tool_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => {
                let client: Arc<dyn VisionAnalyzer> = Arc::new(Self::new(url, cfg.timeout())?);
                Ok(Some(client))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl VisionAnalyzer for HttpVisionClient {
    async fn analyze(&self, image_base64: &str) -> Result<Value, VisionError> {
        let resp = self
            .http
            .post(&self.tool_url)
            .json(&serde_json::json!({ "image_data": image_base64 }))
            .send()
            .await
            .map_err(|e| VisionError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| VisionError::Transport(e.to_string()))?;

        if status.as_u16() >= 400 {
            return Err(VisionError::Http {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_PREVIEW_CHARS),
            });
        }

        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        extract_vision_data(payload)
    }
}

/// 取出 vision_data（必须是对象），并去掉其中可能回显的原图
fn extract_vision_data(payload: Value) -> Result<Value, VisionError> {
    let Value::Object(mut map) = payload else {
        return Err(VisionError::MissingVisionData);
    };
    let Some(Value::Object(mut data)) = map.remove("vision_data") else {
        return Err(VisionError::MissingVisionData);
    };
    data.remove("image_data");
    Ok(Value::Object(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;

    async fn client_for(server: &mockito::ServerGuard) -> HttpVisionClient {
        HttpVisionClient::new(format!("{}/analyze", server.url()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_success_strips_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_body(mockito::Matcher::Json(json!({ "image_data": "aGVsbG8=" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"vision_data":{"sign_text":"Bakery","image_data":"aGVsbG8="},"model":"v1"}"#)
            .create_async()
            .await;

        let data = client_for(&server).await.analyze("aGVsbG8=").await.unwrap();
        assert_eq!(data, json!({ "sign_text": "Bakery" }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_http_error_truncates_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(503)
            .with_body("e".repeat(800))
            .create_async()
            .await;

        let err = client_for(&server).await.analyze("x").await.unwrap_err();
        match &err {
            VisionError::Http { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body.len(), 500);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.to_string().starts_with("Vision HTTP 503: eee"));
    }

    #[tokio::test]
    async fn test_analyze_missing_vision_data() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body(r#"{"labels":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server).await.analyze("x").await.unwrap_err();
        assert_eq!(err, VisionError::MissingVisionData);
        assert_eq!(err.to_string(), "Vision payload missing vision_data");
    }

    #[test]
    fn test_non_object_vision_data_is_missing() {
        for payload in [
            json!({ "vision_data": null }),
            json!({ "vision_data": "bakery" }),
            json!({ "vision_data": ["a"] }),
            json!([]),
        ] {
            assert_eq!(
                extract_vision_data(payload),
                Err(VisionError::MissingVisionData)
            );
        }
        assert_eq!(
            extract_vision_data(json!({ "vision_data": {} })),
            Ok(json!({}))
        );
    }

    #[tokio::test]
    async fn test_analyze_null_vision_data_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body(r#"{"vision_data":null}"#)
            .create_async()
            .await;

        let err = client_for(&server).await.analyze("x").await.unwrap_err();
        assert_eq!(err, VisionError::MissingVisionData);
    }

    #[tokio::test]
    async fn test_analyze_transport_failure() {
        // 端口 1 上没有服务
        let client = HttpVisionClient::new("http://127.0.0.1:1/analyze", Duration::from_secs(2)).unwrap();
        let err = client.analyze("x").await.unwrap_err();
        assert!(matches!(err, VisionError::Transport(_)));
    }

    #[test]
    fn test_vision_result_from_outcome() {
        let ok = VisionResult::from_outcome(Ok(json!({ "a": 1 })));
        assert!(ok.success && ok.error.is_none());

        let err = VisionResult::from_outcome(Err(VisionError::MissingVisionData));
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("Vision payload missing vision_data"));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "success": false, "error": "Vision payload missing vision_data" })
        );
    }

    #[test]
    fn test_from_config_without_url() {
        assert!(HttpVisionClient::from_config(&VisionSection::default())
            .unwrap()
            .is_none());
    }
}

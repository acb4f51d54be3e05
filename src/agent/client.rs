//! 对话 Agent HTTP 客户端
//!
//! POST {api_base}/{agent_path}/sessions/{session_id}:detectIntent。
//! session_id 作为单个路径段编码，其中的 `/`、`?`、`#` 不会改变目标资源。
//! 任何 >=400 响应都是致命错误，状态码与响应体原样交给调用方。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::request::DetectIntentRequest;
use crate::auth::{AccessToken, CredentialProvider};
use crate::config::AgentSection;
use crate::core::GatewayError;

/// 对话 Agent：编排器只依赖这个 trait
#[async_trait]
pub trait DialogueAgent: Send + Sync {
    /// 返回 Agent 的原始 JSON 响应
    async fn detect_intent(
        &self,
        session_id: &str,
        request: &DetectIntentRequest,
    ) -> Result<Value, GatewayError>;
}

/// 基于 reqwest 的 detectIntent 客户端
pub struct AgentClient {
    http: reqwest::Client,
    /// {api_base}/{agent_path}
    agent_url: Url,
    credentials: Arc<CredentialProvider>,
}

impl AgentClient {
    pub fn new(
        api_base: impl Into<String>,
        agent_path: impl Into<String>,
        timeout: Duration,
        credentials: Arc<CredentialProvider>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("agent http client: {}", e)))?;
        let api_base: String = api_base.into();
        let agent_path: String = agent_path.into();
        Ok(Self {
            http,
            agent_url: agent_url(&api_base, &agent_path)?,
            credentials,
        })
    }

    pub fn from_config(
        cfg: &AgentSection,
        credentials: Arc<CredentialProvider>,
    ) -> Result<Self, GatewayError> {
        Self::new(cfg.api_base(), cfg.agent_path(), cfg.timeout(), credentials)
    }

    pub fn session_url(&self, session_id: &str) -> Url {
        let mut url = self.agent_url.clone();
        // agent_url 在构造时已确认可作为 base，这里不会失败
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("sessions")
                .push(&format!("{}:detectIntent", session_id));
        }
        url
    }

    /// 发送已构造好的请求体
    pub async fn send(
        &self,
        token: &AccessToken,
        session_id: &str,
        body: &DetectIntentRequest,
    ) -> Result<Value, GatewayError> {
        let resp = self
            .http
            .post(self.session_url(session_id))
            .bearer_auth(token.secret())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::AgentTimeout
                } else {
                    GatewayError::AgentTransport(e.to_string())
                }
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::AgentTimeout
            } else {
                GatewayError::AgentTransport(e.to_string())
            }
        })?;

        if status.as_u16() >= 400 {
            tracing::error!("Agent returned HTTP {} for session {}", status.as_u16(), session_id);
            return Err(GatewayError::AgentHttp {
                status: status.as_u16(),
                body: text,
            });
        }

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("Agent response is not valid JSON ({}), using defaults", e);
                Ok(Value::Null)
            }
        }
    }
}

fn agent_url(api_base: &str, agent_path: &str) -> Result<Url, GatewayError> {
    let raw = format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        agent_path.trim_matches('/')
    );
    let url = Url::parse(&raw)
        .map_err(|e| GatewayError::Config(format!("agent url {}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(GatewayError::Config(format!("agent url {} has no path", raw)));
    }
    Ok(url)
}

#[async_trait]
impl DialogueAgent for AgentClient {
    async fn detect_intent(
        &self,
        session_id: &str,
        request: &DetectIntentRequest,
    ) -> Result<Value, GatewayError> {
        let token = self.credentials.acquire().await?;
        self.send(&token, session_id, request).await
    }
}

//! 单次 /chat 请求的编排
//!
//! START → VISION_CALL（仅带图时）→ AGENT_CALL → NORMALIZE → RESPOND
//!
//! 视觉调用无论成败都继续；Agent 调用失败直接终止并原样返回错误。
//! 两次下游调用严格串行：Agent 请求参数依赖视觉结果。

use std::sync::Arc;

use crate::agent::{AgentClient, AgentRequestBuilder, DialogueAgent};
use crate::auth::CredentialProvider;
use crate::config::AppConfig;
use crate::core::{GatewayError, VisionError};
use crate::normalize::{
    classify_business_stage, extract_parameters, extract_reply, fallback_reply_for,
    normalize_for_ui, BusinessStage,
};
use crate::session;
use crate::vision::{HttpVisionClient, VisionAnalyzer, VisionResult};

use super::message::{ChatRequest, ChatResponse};

/// 网关：可选的视觉分析器 + 对话 Agent，配置在构造时注入且只读
pub struct ChatGateway {
    config: Arc<AppConfig>,
    agent: Arc<dyn DialogueAgent>,
    vision: Option<Arc<dyn VisionAnalyzer>>,
    request_builder: AgentRequestBuilder,
    fallback_reply: String,
}

impl ChatGateway {
    pub fn new(
        config: Arc<AppConfig>,
        agent: Arc<dyn DialogueAgent>,
        vision: Option<Arc<dyn VisionAnalyzer>>,
    ) -> Self {
        let request_builder = AgentRequestBuilder::from_config(&config.agent);
        let fallback_reply = config
            .agent
            .fallback_reply
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| fallback_reply_for(&config.agent.language_code).to_string());
        Self {
            config,
            agent,
            vision,
            request_builder,
            fallback_reply,
        }
    }

    /// 按配置组装真实的凭证、Agent 客户端与视觉客户端
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, GatewayError> {
        let credentials = Arc::new(CredentialProvider::from_config(&config.auth)?);
        let agent: Arc<dyn DialogueAgent> =
            Arc::new(AgentClient::from_config(&config.agent, credentials)?);
        let vision = HttpVisionClient::from_config(&config.vision)?;
        if vision.is_none() {
            tracing::info!("Vision tool not configured; image uploads will be skipped");
        }
        Ok(Self::new(config, agent, vision))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn handle(&self, req: ChatRequest) -> Result<ChatResponse, GatewayError> {
        let session_id = session::resolve(req.session_id.as_deref());
        tracing::info!(
            "Chat request: session={} message_len={} has_image={}",
            session_id,
            req.message.chars().count(),
            req.image().is_some()
        );

        let vision_result = match req.image() {
            Some(image) => Some(self.run_vision(&session_id, image).await),
            None => None,
        };
        let vision_data = vision_result
            .as_ref()
            .filter(|r| r.success)
            .and_then(|r| r.vision_data.as_ref());

        let body = self.request_builder.build(&req.message, vision_data);
        let raw = self.agent.detect_intent(&session_id, &body).await.map_err(|e| {
            tracing::error!("Agent call failed for session {}: {}", session_id, e);
            e
        })?;

        let reply = extract_reply(&raw, &self.fallback_reply);
        let parameters = extract_parameters(&raw);
        let mut ui = normalize_for_ui(&parameters);

        if self.config.heuristics.keyword_stage_fallback && ui.business_profile.business_stage.is_none() {
            let stage = classify_business_stage(&req.message);
            if stage != BusinessStage::Unknown {
                tracing::debug!("Business stage inferred from keywords: {}", stage.as_str());
                ui.business_profile.business_stage = Some(stage.as_str().to_string());
            }
        }

        tracing::debug!(
            "Chat response: session={} reply_len={} checklist_items={}",
            session_id,
            reply.chars().count(),
            ui.compliance_checklist.len()
        );

        let debug = &self.config.debug;
        Ok(ChatResponse {
            session_id,
            reply,
            business_profile: ui.business_profile,
            compliance_checklist: ui.compliance_checklist,
            vision_debug: vision_result.filter(|_| debug.return_vision_debug),
            raw_agent_response: debug.return_raw_agent_response.then_some(raw),
        })
    }

    /// 视觉调用：从不返回错误
    async fn run_vision(&self, session_id: &str, image: &str) -> VisionResult {
        let outcome = match &self.vision {
            Some(vision) => vision.analyze(image).await,
            None => Err(VisionError::NotConfigured),
        };
        if let Err(e) = &outcome {
            tracing::warn!("Vision analysis failed for session {}: {}", session_id, e);
        }
        VisionResult::from_outcome(outcome)
    }
}

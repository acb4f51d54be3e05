//! /chat 请求与响应

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{BusinessProfile, ComplianceChecklist};
use crate::vision::VisionResult;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    /// base64，不带 data URI 前缀；空串视为未提供
    #[serde(default)]
    pub image_data: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            session_id: None,
            message: message.into(),
            image_data: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.image_data = Some(image_base64.into());
        self
    }

    pub(crate) fn image(&self) -> Option<&str> {
        self.image_data.as_deref().filter(|s| !s.is_empty())
    }
}

/// 调试字段只在对应开关打开时出现，关闭时整个键都不存在
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub business_profile: BusinessProfile,
    pub compliance_checklist: ComplianceChecklist,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_debug: Option<VisionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_agent_response: Option<Value>,
}

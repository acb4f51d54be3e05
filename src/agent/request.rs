//! detectIntent 请求体构造

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::AgentSection;

/// detectIntent 请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentRequest {
    pub query_input: QueryInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_params: Option<AgentQueryParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInput {
    pub language_code: String,
    pub text: TextInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextInput {
    pub text: String,
}

/// queryParams：可选的 Playbook 覆盖与注入参数
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentQueryParams {
    /// 完整资源名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_playbook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

impl AgentQueryParams {
    fn is_empty(&self) -> bool {
        self.current_playbook.is_none() && self.parameters.is_none()
    }
}

/// 按配置构造请求体：语言码、可选 Playbook 在启动时确定
#[derive(Debug, Clone)]
pub struct AgentRequestBuilder {
    language_code: String,
    playbook: Option<String>,
}

impl AgentRequestBuilder {
    pub fn new(language_code: impl Into<String>, playbook: Option<String>) -> Self {
        Self {
            language_code: language_code.into(),
            playbook,
        }
    }

    pub fn from_config(cfg: &AgentSection) -> Self {
        Self::new(cfg.language_code.clone(), cfg.playbook_resource())
    }

    /// 用户消息原样作为文本输入；有视觉结果时注入 vision_data 与 has_image = true
    pub fn build(&self, message: &str, vision_data: Option<&Value>) -> DetectIntentRequest {
        let mut params = AgentQueryParams {
            current_playbook: self.playbook.clone(),
            parameters: None,
        };

        if let Some(data) = vision_data {
            let mut parameters = Map::new();
            parameters.insert("vision_data".to_string(), data.clone());
            parameters.insert("has_image".to_string(), Value::Bool(true));
            params.parameters = Some(parameters);
        }

        DetectIntentRequest {
            query_input: QueryInput {
                language_code: self.language_code.clone(),
                text: TextInput {
                    text: message.to_string(),
                },
            },
            query_params: (!params.is_empty()).then_some(params),
        }
    }
}

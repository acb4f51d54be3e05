//! Agent 参数 → UI 固定结构
//!
//! 参数名（business_stage / license_status / business_tags / compliance_checklist）
//! 由外部 Agent 定义，网关无法校验；改名时只能在这里同步。

use serde::Serialize;
use serde_json::{Map, Value};

pub const PARAM_BUSINESS_STAGE: &str = "business_stage";
pub const PARAM_LICENSE_STATUS: &str = "license_status";
pub const PARAM_BUSINESS_TAGS: &str = "business_tags";
pub const PARAM_COMPLIANCE_CHECKLIST: &str = "compliance_checklist";

/// 业务画像：三个字段相互独立，均可为 null
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BusinessProfile {
    pub business_stage: Option<String>,
    pub license_status: Option<String>,
    pub business_tags: Option<String>,
}

/// 合规清单：保持 Agent 给出的顺序
pub type ComplianceChecklist = Vec<String>;

/// 规范化结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiProjection {
    pub business_profile: BusinessProfile,
    pub compliance_checklist: ComplianceChecklist,
}

/// compliance_checklist 的可能形态
#[derive(Debug, Clone, PartialEq)]
pub enum ChecklistValue<'a> {
    Absent,
    Single(&'a str),
    List(&'a [Value]),
    Other,
}

impl<'a> ChecklistValue<'a> {
    pub fn decode(raw: Option<&'a Value>) -> Self {
        match raw {
            None => ChecklistValue::Absent,
            Some(Value::String(s)) => ChecklistValue::Single(s),
            Some(Value::Array(items)) => ChecklistValue::List(items),
            Some(_) => ChecklistValue::Other,
        }
    }

    pub fn into_items(self) -> ComplianceChecklist {
        match self {
            ChecklistValue::Single(s) => vec![s.to_string()],
            ChecklistValue::List(items) => items.iter().map(coerce_to_string).collect(),
            ChecklistValue::Absent | ChecklistValue::Other => Vec::new(),
        }
    }
}

/// 取 queryResult.parameters；缺失或不是对象时返回空表
pub fn extract_parameters(agent_response: &Value) -> Map<String, Value> {
    agent_response
        .pointer("/queryResult/parameters")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// 纯函数：相同输入总得到相同输出
pub fn normalize_for_ui(parameters: &Map<String, Value>) -> UiProjection {
    UiProjection {
        business_profile: BusinessProfile {
            business_stage: optional_string(parameters.get(PARAM_BUSINESS_STAGE)),
            license_status: optional_string(parameters.get(PARAM_LICENSE_STATUS)),
            business_tags: optional_string(parameters.get(PARAM_BUSINESS_TAGS)),
        },
        compliance_checklist: ChecklistValue::decode(parameters.get(PARAM_COMPLIANCE_CHECKLIST))
            .into_items(),
    }
}

fn optional_string(raw: Option<&Value>) -> Option<String> {
    match raw {
        None | Some(Value::Null) => None,
        Some(v) => Some(coerce_to_string(v)),
    }
}

/// 字符串原样返回，其它值使用 JSON 文本
fn coerce_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

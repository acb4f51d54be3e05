//! Agent 响应规范化：回复文本、参数表、UI 画像与合规清单
//!
//! 所有函数都不会失败：缺失或形态不符的数据一律落到默认值。

mod profile;
mod reply;
mod stage;

pub use profile::{
    extract_parameters, normalize_for_ui, BusinessProfile, ChecklistValue, ComplianceChecklist,
    UiProjection, PARAM_BUSINESS_STAGE, PARAM_BUSINESS_TAGS, PARAM_COMPLIANCE_CHECKLIST,
    PARAM_LICENSE_STATUS,
};
pub use reply::{extract_reply, fallback_reply_for, TextPayload, DEFAULT_FALLBACK_REPLY};
pub use stage::{classify_business_stage, BusinessStage};

//! 关键词业务阶段分类（占位规则）
//!
//! 按固定的希伯来语子串匹配；多类同时命中时按检查顺序取第一类（先 Planned 后 Operating），
//! 这只是占位的判定顺序，不代表真实优先级。

const PLANNED_KEYWORDS: &[&str] = &["לפתוח", "חדש"];
const OPERATING_KEYWORDS: &[&str] = &["פעיל", "קיים"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessStage {
    Planned,
    Operating,
    Unknown,
}

impl BusinessStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessStage::Planned => "planned",
            BusinessStage::Operating => "operating",
            BusinessStage::Unknown => "unknown",
        }
    }
}

pub fn classify_business_stage(message: &str) -> BusinessStage {
    let text = message.to_lowercase();
    if PLANNED_KEYWORDS.iter().any(|k| text.contains(k)) {
        BusinessStage::Planned
    } else if OPERATING_KEYWORDS.iter().any(|k| text.contains(k)) {
        BusinessStage::Operating
    } else {
        BusinessStage::Unknown
    }
}

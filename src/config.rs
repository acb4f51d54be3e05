//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `COMPLYFLOW__*` 覆盖（双下划线表示嵌套，如 `COMPLYFLOW__AGENT__PROJECT_ID=my-proj`）。
//! 启动时构建一次，之后以 `Arc<AppConfig>` 注入各组件，运行期只读。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::core::GatewayError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub agent: AgentSection,
    pub vision: VisionSection,
    pub auth: AuthSection,
    pub debug: DebugSection,
    pub heuristics: HeuristicsSection,
}

/// [server] 段：监听地址与跨域白名单
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_addr: String,
    /// 含 "*" 时允许任意来源
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// [agent] 段：对话 Agent 的资源标识、语言与端点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub project_id: String,
    pub location: String,
    pub agent_id: String,
    pub language_code: String,
    /// 未设置时按 location 推导（global 用无前缀域名）
    pub api_base: Option<String>,
    /// 固定 Playbook：短 id 或完整资源名（projects/...）
    pub playbook_id: Option<String>,
    pub timeout_secs: u64,
    /// 覆盖内置的兜底回复
    pub fallback_reply: Option<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: "global".to_string(),
            agent_id: String::new(),
            language_code: "en".to_string(),
            api_base: None,
            playbook_id: None,
            timeout_secs: 30,
            fallback_reply: None,
        }
    }
}

impl AgentSection {
    /// projects/{project}/locations/{location}/agents/{agent}
    pub fn agent_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/agents/{}",
            self.project_id, self.location, self.agent_id
        )
    }

    pub fn api_base(&self) -> String {
        match self.api_base.as_deref() {
            Some(base) if !base.trim().is_empty() => base.trim_end_matches('/').to_string(),
            _ if self.location == "global" => "https://dialogflow.googleapis.com/v3beta1".to_string(),
            _ => format!("https://{}-dialogflow.googleapis.com/v3beta1", self.location),
        }
    }

    /// Playbook 的完整资源名；未配置时为 None
    pub fn playbook_resource(&self) -> Option<String> {
        let id = self.playbook_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        if id.starts_with("projects/") {
            Some(id.to_string())
        } else {
            Some(format!("{}/playbooks/{}", self.agent_path(), id))
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// [vision] 段：视觉分析工具
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionSection {
    /// 未设置时带图请求直接软失败
    pub tool_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for VisionSection {
    fn default() -> Self {
        Self {
            tool_url: None,
            timeout_secs: 30,
        }
    }
}

impl VisionSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 凭证来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSourceKind {
    /// GCE / Cloud Run 元数据服务器
    #[default]
    Metadata,
    /// 本地开发：gcloud auth print-access-token
    Gcloud,
    /// 直接使用配置中的 token
    Static,
}

/// [auth] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub source: CredentialSourceKind,
    pub metadata_url: String,
    pub static_token: Option<String>,
    pub scope: String,
    /// 距过期不足该秒数即刷新
    pub refresh_margin_secs: u64,
    pub timeout_secs: u64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            source: CredentialSourceKind::Metadata,
            metadata_url: "http://metadata.google.internal".to_string(),
            static_token: None,
            scope: "https://www.googleapis.com/auth/cloud-platform".to_string(),
            refresh_margin_secs: 60,
            timeout_secs: 30,
        }
    }
}

/// [debug] 段：两个开关各自控制一个诊断字段是否出现在 /chat 响应中
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DebugSection {
    pub return_raw_agent_response: bool,
    pub return_vision_debug: bool,
}

/// [heuristics] 段
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HeuristicsSection {
    /// Agent 未给出 business_stage 时，按用户消息关键词补全
    pub keyword_stage_fallback: bool,
}

impl AppConfig {
    /// 启动前校验必填项
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.agent.project_id.trim().is_empty() {
            return Err(GatewayError::Config("agent.project_id is required".to_string()));
        }
        if self.agent.agent_id.trim().is_empty() {
            return Err(GatewayError::Config("agent.agent_id is required".to_string()));
        }
        if self.agent.language_code.trim().is_empty() {
            return Err(GatewayError::Config("agent.language_code must not be empty".to_string()));
        }
        if self.auth.source == CredentialSourceKind::Static
            && self.auth.static_token.as_deref().map_or(true, |t| t.trim().is_empty())
        {
            return Err(GatewayError::Config(
                "auth.static_token is required when auth.source = \"static\"".to_string(),
            ));
        }
        Ok(())
    }
}

/// 从 config 目录加载配置，环境变量 COMPLYFLOW__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 COMPLYFLOW__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("COMPLYFLOW")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("server.allowed_origins")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> AgentSection {
        AgentSection {
            project_id: "proj".to_string(),
            agent_id: "a1".to_string(),
            ..AgentSection::default()
        }
    }

    #[test]
    fn test_agent_path() {
        assert_eq!(agent().agent_path(), "projects/proj/locations/global/agents/a1");
    }

    #[test]
    fn test_api_base_derived_from_location() {
        let mut a = agent();
        assert_eq!(a.api_base(), "https://dialogflow.googleapis.com/v3beta1");
        a.location = "europe-west1".to_string();
        assert_eq!(a.api_base(), "https://europe-west1-dialogflow.googleapis.com/v3beta1");
        a.api_base = Some("http://127.0.0.1:9000/".to_string());
        assert_eq!(a.api_base(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_playbook_resource() {
        let mut a = agent();
        assert_eq!(a.playbook_resource(), None);
        a.playbook_id = Some("pb-7".to_string());
        assert_eq!(
            a.playbook_resource().as_deref(),
            Some("projects/proj/locations/global/agents/a1/playbooks/pb-7")
        );
        a.playbook_id = Some("projects/x/locations/y/agents/z/playbooks/p".to_string());
        assert_eq!(
            a.playbook_resource().as_deref(),
            Some("projects/x/locations/y/agents/z/playbooks/p")
        );
        a.playbook_id = Some("  ".to_string());
        assert_eq!(a.playbook_resource(), None);
    }

    #[test]
    fn test_validate_requires_identifiers() {
        let cfg = AppConfig::default();
        assert!(matches!(cfg.validate(), Err(GatewayError::Config(_))));

        let cfg = AppConfig {
            agent: agent(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_static_source_needs_token() {
        let mut cfg = AppConfig {
            agent: agent(),
            ..AppConfig::default()
        };
        cfg.auth.source = CredentialSourceKind::Static;
        assert!(cfg.validate().is_err());
        cfg.auth.static_token = Some("tok".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_shipped_default_toml_matches_code_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let server = ServerSection::default();
        let agent = AgentSection::default();
        let auth = AuthSection::default();
        assert_eq!(cfg.server.bind_addr, server.bind_addr);
        assert_eq!(cfg.server.allowed_origins, server.allowed_origins);
        assert_eq!(cfg.agent.language_code, agent.language_code);
        assert_eq!(cfg.agent.location, agent.location);
        assert_eq!(cfg.agent.timeout_secs, agent.timeout_secs);
        assert_eq!(cfg.vision.timeout_secs, VisionSection::default().timeout_secs);
        assert_eq!(cfg.auth.source, auth.source);
        assert_eq!(cfg.auth.refresh_margin_secs, auth.refresh_margin_secs);
        assert_eq!(cfg.auth.timeout_secs, auth.timeout_secs);
        assert!(!cfg.debug.return_raw_agent_response);
        assert!(!cfg.heuristics.keyword_stage_fallback);
    }

    #[test]
    fn test_debug_toggles_default_off() {
        let cfg = AppConfig::default();
        assert!(!cfg.debug.return_raw_agent_response);
        assert!(!cfg.debug.return_vision_debug);
        assert!(!cfg.heuristics.keyword_stage_fallback);
    }
}

//! 凭证获取：为调用对话 Agent 平台的管理 API 提供 Bearer Token
//!
//! TokenSource 只负责「换取」，CredentialProvider 在其上加一层按过期时间判断的显式缓存。

mod sources;
mod token;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::{AuthSection, CredentialSourceKind};
use crate::core::{AuthError, GatewayError};

pub use sources::{GcloudCliSource, MetadataServerSource, StaticTokenSource};
pub use token::{AccessToken, TokenSource};

/// 带缓存的凭证提供者：缓存的 token 距过期不足 refresh_margin 时重新获取
pub struct CredentialProvider {
    source: Arc<dyn TokenSource>,
    scope: String,
    refresh_margin: chrono::Duration,
    timeout: Duration,
    cached: Mutex<Option<AccessToken>>,
}

impl CredentialProvider {
    pub fn new(
        source: Arc<dyn TokenSource>,
        scope: impl Into<String>,
        refresh_margin: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            scope: scope.into(),
            refresh_margin: chrono::Duration::from_std(refresh_margin)
                .unwrap_or_else(|_| chrono::Duration::seconds(60)),
            timeout,
            cached: Mutex::new(None),
        }
    }

    /// 按 [auth] 段选择来源
    pub fn from_config(cfg: &AuthSection) -> Result<Self, GatewayError> {
        let timeout = Duration::from_secs(cfg.timeout_secs);
        let source: Arc<dyn TokenSource> = match cfg.source {
            CredentialSourceKind::Metadata => {
                Arc::new(MetadataServerSource::new(&cfg.metadata_url, timeout)?)
            }
            CredentialSourceKind::Gcloud => Arc::new(GcloudCliSource),
            CredentialSourceKind::Static => {
                let token = cfg.static_token.clone().ok_or_else(|| {
                    GatewayError::Config("auth.static_token is not set".to_string())
                })?;
                Arc::new(StaticTokenSource::new(token))
            }
        };
        Ok(Self::new(
            source,
            cfg.scope.clone(),
            Duration::from_secs(cfg.refresh_margin_secs),
            timeout,
        ))
    }

    /// 返回当前可立即使用的 token
    pub async fn acquire(&self) -> Result<AccessToken, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(tok) = cached.as_ref() {
            if tok.is_fresh(chrono::Utc::now(), self.refresh_margin) {
                return Ok(tok.clone());
            }
        }

        tracing::debug!("Refreshing access token via {} source", self.source.name());
        let tok = tokio::time::timeout(self.timeout, self.source.fetch(&self.scope))
            .await
            .map_err(|_| AuthError::Timeout)??;
        tracing::debug!("Access token refreshed, expires at {}", tok.expires_at());

        *cached = Some(tok.clone());
        Ok(tok)
    }
}

//! 具体令牌来源：元数据服务器、gcloud CLI、静态 token

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::token::{AccessToken, TokenSource};
use crate::core::AuthError;

/// gcloud / 静态 token 不带过期时间，按 1 小时计
const ASSUMED_LIFETIME_SECS: i64 = 3600;

/// 元数据服务器返回体
#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

/// GCE / Cloud Run / GKE 元数据服务器（默认服务账号）
pub struct MetadataServerSource {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataServerSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TokenSource for MetadataServerSource {
    async fn fetch(&self, scope: &str) -> Result<AccessToken, AuthError> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.base_url
        );

        let resp = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .query(&[("scopes", scope)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Timeout
                } else {
                    AuthError::Unavailable(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::Unavailable(format!(
                "metadata server HTTP {}",
                status.as_u16()
            )));
        }

        let body: MetadataTokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        if body.access_token.is_empty() {
            return Err(AuthError::InvalidResponse("empty access_token".to_string()));
        }
        Ok(AccessToken::expiring_in(body.access_token, body.expires_in))
    }

    fn name(&self) -> &'static str {
        "metadata"
    }
}

/// 本地开发：调用 `gcloud auth print-access-token`
#[derive(Debug, Default)]
pub struct GcloudCliSource;

#[async_trait]
impl TokenSource for GcloudCliSource {
    async fn fetch(&self, _scope: &str) -> Result<AccessToken, AuthError> {
        let output = tokio::process::Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()
            .await
            .map_err(|e| AuthError::Unavailable(format!("failed to run gcloud: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AuthError::Unavailable(format!(
                "gcloud exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(AuthError::InvalidResponse("gcloud printed no token".to_string()));
        }
        Ok(AccessToken::expiring_in(token, ASSUMED_LIFETIME_SECS))
    }

    fn name(&self) -> &'static str {
        "gcloud"
    }
}

/// 配置中直接给出的 token（测试、临时运维）
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch(&self, _scope: &str) -> Result<AccessToken, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::Unavailable("static token is empty".to_string()));
        }
        Ok(AccessToken::expiring_in(self.token.clone(), ASSUMED_LIFETIME_SECS))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metadata_source_parses_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/computeMetadata/v1/instance/service-accounts/default/token",
            )
            .match_header("Metadata-Flavor", "Google")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.abc","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let source = MetadataServerSource::new(&server.url(), Duration::from_secs(5)).unwrap();
        let tok = source.fetch("scope").await.unwrap();
        assert_eq!(tok.secret(), "ya29.abc");
        assert!(tok.expires_at() > chrono::Utc::now());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_metadata_source_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                "/computeMetadata/v1/instance/service-accounts/default/token",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let source = MetadataServerSource::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = source.fetch("scope").await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_metadata_source_rejects_garbage() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                "/computeMetadata/v1/instance/service-accounts/default/token",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let source = MetadataServerSource::new(&server.url(), Duration::from_secs(5)).unwrap();
        assert!(matches!(
            source.fetch("scope").await,
            Err(AuthError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_static_source() {
        let tok = StaticTokenSource::new("fixed").fetch("s").await.unwrap();
        assert_eq!(tok.secret(), "fixed");
        assert!(StaticTokenSource::new("").fetch("s").await.is_err());
    }
}

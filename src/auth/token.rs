//! 访问令牌与令牌来源抽象

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::core::AuthError;

/// 短期 Bearer Token；Debug 输出不含 token 值
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// 从「有效秒数」构造
    pub fn expiring_in(value: impl Into<String>, secs: i64) -> Self {
        Self::new(value, Utc::now() + Duration::seconds(secs))
    }

    /// 仅用于设置 Authorization 头
    pub fn secret(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// now 距过期仍超过 margin 才视为可用
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now < self.expires_at - margin
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// 令牌来源：每次调用都向底层身份机制换取一个新 token，不做缓存
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self, scope: &str) -> Result<AccessToken, AuthError>;

    /// 日志中使用的来源名
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_value() {
        let tok = AccessToken::expiring_in("ya29.secret", 3600);
        let dbg = format!("{:?}", tok);
        assert!(!dbg.contains("ya29.secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_is_fresh_respects_margin() {
        let now = Utc::now();
        let tok = AccessToken::new("t", now + Duration::seconds(120));
        assert!(tok.is_fresh(now, Duration::seconds(60)));
        assert!(!tok.is_fresh(now, Duration::seconds(180)));
        assert!(!tok.is_fresh(now + Duration::seconds(121), Duration::zero()));
    }
}

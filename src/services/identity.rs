//! # 외부 신원 조회
//!
//! 멤버 ID로 인증 서비스(RoWifi 사용자 API)에 연결된 외부 계정 ID를 묻습니다.
//!
//! 응답 형식:
//! - 인증된 사용자: `{"success": true, "discord_id": N, "roblox_id": N}`
//! - 인증되지 않은 사용자: `{"success": false, "message": "..."}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::AppError;

#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// 사용자 엔드포인트 주소 (끝의 `/` 제외). 뒤에 `/{member_id}`를 붙여 조회합니다.
    fn base_url(&self) -> &str;

    /// 연결된 외부 계정 ID. 인증되지 않았으면 `None`
    async fn linked_identity(&self, member_id: &str) -> Result<Option<u64>, AppError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    success: bool,
    roblox_id: Option<u64>,
    message: Option<String>,
}

/// `GET {base_url}/{member_id}` 로 묻는 구현
#[derive(Debug, Clone)]
pub struct HttpIdentityLookup {
    client: Client,
    base_url: String,
}

impl HttpIdentityLookup {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityLookup for HttpIdentityLookup {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn linked_identity(&self, member_id: &str) -> Result<Option<u64>, AppError> {
        let url = format!("{}/{}", self.base_url, member_id);
        // 인증되지 않은 사용자도 본문에 success=false를 담아 오므로 상태 코드는 보지 않습니다.
        let body: LookupResponse = self.client.get(&url).send().await?.json().await?;

        if !body.success {
            tracing::debug!(member_id, message = ?body.message, "member has no linked identity");
            return Ok(None);
        }

        Ok(body.roblox_id)
    }
}

//! # 멤버 조회
//!
//! `tag claim`은 현재 소유자가 아직 서버에 있는지 알아야 합니다.
//! 멤버 정보는 커맨드 라우터가 갖고 있으므로 라우터의 멤버 조회 엔드포인트에 묻습니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::AppError;

/// 서버 멤버 여부를 알려주는 외부 서비스
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// `member_id`가 현재 서버 멤버이면 true
    async fn is_member(&self, member_id: &str) -> Result<bool, AppError>;
}

/// `GET {base_url}/{member_id}` 로 묻는 구현
///
/// 200이면 멤버, 404면 멤버 아님. 그 외 상태 코드는 에러입니다.
#[derive(Debug, Clone)]
pub struct HttpMemberDirectory {
    client: Client,
    base_url: String,
}

impl HttpMemberDirectory {
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
impl MemberDirectory for HttpMemberDirectory {
    async fn is_member(&self, member_id: &str) -> Result<bool, AppError> {
        let url = format!("{}/{}", self.base_url, member_id);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                tracing::warn!(member_id, %status, "member lookup returned an unexpected status");
                response.error_for_status()?;
                Err(AppError::Internal(format!("member lookup returned {}", status)))
            }
        }
    }
}

//! # 에러 처리 모듈
//!
//! 태그 명령 처리 중 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 사용자에게 보여줄 에러와 내부 에러를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 사용자 대상 에러(`NotFound`, `NameConflict`, `ReservedName`, `NotOwner`,
//! `OwnerStillPresent`, `MalformedOption`)의 메시지는 커맨드 라우터가
//! 채팅 채널에 그대로 답장으로 보내는 문장입니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 태그를 찾을 수 없음 (HTTP 404)
    ///
    /// 유사한 이름이 있으면 `suggestions`에 최대 5개까지 담깁니다.
    #[error("{}", not_found_message(.suggestions))]
    NotFound { suggestions: Vec<String> },

    /// 이미 존재하는 태그 이름/별칭 (HTTP 409)
    #[error("{0} is already an existing tag.")]
    NameConflict(String),

    /// 태그 명령어 예약어와 겹치는 이름 (HTTP 422)
    #[error("{0} is a reserved key word and cannot be used as a tag name or alias.")]
    ReservedName(String),

    /// 태그 소유자가 아님 (HTTP 403)
    /// 필드는 시도한 동작 이름입니다 (예: "modify", "transfer").
    #[error("You do not own this tag and hence cannot {0} it.")]
    NotOwner(&'static str),

    /// claim 대상 태그의 소유자가 아직 서버 멤버임 (HTTP 409)
    #[error("The tag owner is still in this server.")]
    OwnerStillPresent,

    /// 옵션 값 형식 오류 (HTTP 400)
    #[error("{0}")]
    MalformedOption(String),

    /// 잘못된 요청 (HTTP 400)
    #[error("{0}")]
    BadRequest(String),

    /// 권한 부족 (HTTP 403)
    #[error("{0}")]
    Forbidden(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 외부 API(신원 조회, 멤버 조회) 호출 실패 (HTTP 502)
    #[error("Upstream error: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl AppError {
    /// 제안 목록이 없는 단순 not-found 에러
    pub fn not_found() -> Self {
        AppError::NotFound {
            suggestions: Vec::new(),
        }
    }

    /// 쓰기 도중 발생한 DB 에러를 변환합니다.
    ///
    /// 이름/별칭의 대소문자 무시 UNIQUE 인덱스 위반은 동시에 같은 이름을
    /// 등록하려 한 경우이므로 `NameConflict`로 바꿉니다.
    pub fn from_write(err: sqlx::Error, name: &str) -> Self {
        let unique_violation = err
            .as_database_error()
            .map(|db_err| db_err.is_unique_violation())
            .unwrap_or(false);

        if unique_violation {
            AppError::NameConflict(name.to_string())
        } else {
            AppError::Database(err)
        }
    }
}

fn not_found_message(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        "Tag not found.".to_string()
    } else {
        format!("Tag not found. Did you mean...\n{}", suggestions.join("\n"))
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Upstream, Internal)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::NameConflict(_) => (StatusCode::CONFLICT, "name_conflict", self.to_string()),
            AppError::ReservedName(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "reserved_name",
                self.to_string(),
            ),
            AppError::NotOwner(_) => (StatusCode::FORBIDDEN, "not_owner", self.to_string()),
            AppError::OwnerStillPresent => (
                StatusCode::CONFLICT,
                "owner_still_present",
                self.to_string(),
            ),
            AppError::MalformedOption(ref msg) => {
                (StatusCode::BAD_REQUEST, "malformed_option", msg.clone())
            }
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Something went wrong while running that command.".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Something went wrong while running that command.".to_string(),
                )
            }
            AppError::Upstream(ref e) => {
                tracing::error!("Upstream error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "An external service did not respond properly.".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "not_found", "message": "...", "suggestions": [...] } }
        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::NotFound { suggestions } = &self {
            if !suggestions.is_empty() {
                error["suggestions"] = json!(suggestions);
            }
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_suggestions_one_per_line() {
        let err = AppError::NotFound {
            suggestions: vec!["faqs".to_string(), "faq".to_string()],
        };
        assert_eq!(err.to_string(), "Tag not found. Did you mean...\nfaqs\nfaq");
        assert_eq!(AppError::not_found().to_string(), "Tag not found.");
    }

    #[test]
    fn user_facing_errors_map_to_client_statuses() {
        let cases = [
            (AppError::not_found(), StatusCode::NOT_FOUND),
            (AppError::NameConflict("faq".into()), StatusCode::CONFLICT),
            (AppError::ReservedName("tag".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::NotOwner("modify"), StatusCode::FORBIDDEN),
            (AppError::OwnerStillPresent, StatusCode::CONFLICT),
            (AppError::MalformedOption("bad".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}

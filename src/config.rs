//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: 태그 저장소(SQLite) 경로
//! - `JWT_SECRET`: 커맨드 라우터와 공유하는 실행자 토큰 서명 키
//! - `HOST`, `PORT`: 서버 바인딩 주소와 포트
//! - `IDENTITY_API_URL`: 외부 신원 조회 API의 사용자 엔드포인트
//! - `MEMBER_LOOKUP_URL`: 커맨드 라우터의 멤버 조회 엔드포인트
//! - `HTTP_TIMEOUT_SECS`: 외부 HTTP 호출 타임아웃(초)

use std::env;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 경로 (예: "sqlite:data/tagbot.db?mode=rwc")
    pub database_url: String,
    /// 실행자 토큰 검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 신원 조회 API 주소. 뒤에 `/{member_id}`가 붙습니다.
    pub identity_api_url: String,
    /// 멤버 조회 주소. 뒤에 `/{member_id}`가 붙습니다.
    pub member_lookup_url: String,
    /// 외부 HTTP 호출 타임아웃(초)
    pub http_timeout_secs: u64,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있습니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            identity_api_url: env::var("IDENTITY_API_URL")
                .unwrap_or_else(|_| "https://api.rowifi.link/v1/users".to_string()),
            member_lookup_url: env::var("MEMBER_LOOKUP_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080/members".to_string()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }
}

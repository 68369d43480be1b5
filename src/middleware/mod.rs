//! # 미들웨어 모듈
//!
//! - `auth`: 커맨드 라우터가 서명한 토큰에서 실행자 정보(`RequestContext`)를 추출

pub mod auth;

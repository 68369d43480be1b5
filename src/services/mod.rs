//! # 서비스 모듈
//!
//! 라우트 핸들러가 조합해서 쓰는 로직과 외부 서비스 클라이언트입니다.
//! - `resolver`: 이름/별칭으로 태그 찾기, 유사 이름 추천, 검색
//! - `keywords`: `tag` 명령 그룹의 예약어
//! - `pagination`: 긴 목록을 페이지로 나누기
//! - `members`: 서버 멤버 여부 조회 (커맨드 라우터)
//! - `identity`: 외부 신원 조회 API

pub mod identity;
pub mod keywords;
pub mod members;
pub mod pagination;
pub mod resolver;

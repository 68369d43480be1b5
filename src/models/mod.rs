//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `display`: 채팅에 돌려줄 메시지 모양 (텍스트 / 리치 카드 / 페이지)
//! - `tag`: 태그 엔티티, DB 행, 옵션과 요청 본문
//! - `user`: 유저 정보 조회 요청

pub mod display;
pub mod tag;
pub mod user;

pub use display::*;
pub use tag::*;
pub use user::*;

//! # 라우트 핸들러 모듈
//!
//! 커맨드 라우터가 보낸 명령 호출을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! 모든 엔드포인트는 `/api/v1` 아래에 있고, 헬스체크를 뺀 전부가
//! 실행자 토큰(`Authorization: Bearer ...`)을 요구합니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `tags`: `tag` 명령 그룹 (생성, 수정, 별칭, 소유권, 검색, 목록 등)
//! - `users`: `userinfo`, `api`, `get_id` 명령

pub mod health;
pub mod tags;
pub mod users;


use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::services::{identity::IdentityLookup, members::MemberDirectory};

pub use health::*;
pub use tags::*;
pub use users::*;

/// 모든 핸들러가 공유하는 상태
///
/// 외부 서비스는 트레이트 객체로 들고 있어서 테스트에서 가짜 구현으로 바꿔 끼울 수 있습니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_secret: String,
    pub members: Arc<dyn MemberDirectory>,
    pub identity: Arc<dyn IdentityLookup>,
}

/// 전체 API 라우터를 만듭니다.
///
/// 고정 경로(`all`, `list`, `search`, `prune`, `id`)는 모두 예약어라서
/// `{name}` 경로와 겹치는 태그 이름이 생길 수 없습니다.
pub fn router(state: AppState) -> Router {
    let tag_routes = Router::new()
        .route("/tags", post(create_tag))
        .route("/tags/all", get(list_all))
        .route("/tags/list", get(list_owned))
        .route("/tags/search", get(search_tags))
        .route("/tags/prune", post(prune_tags))
        .route("/tags/id/{id}", get(show_tag_by_id))
        .route(
            "/tags/{name}",
            get(show_tag).patch(edit_tag).delete(delete_tag),
        )
        .route("/tags/{name}/info", get(tag_info))
        .route("/tags/{name}/raw", get(tag_raw))
        .route("/tags/{name}/aliases", get(show_aliases).post(update_aliases))
        .route("/tags/{name}/claim", post(claim_tag))
        .route("/tags/{name}/transfer", post(transfer_tag));

    let api_routes = Router::new()
        .merge(tag_routes)
        .route("/userinfo", post(user_info))
        .route("/identity-api", get(identity_api_info))
        .route("/get-id", get(get_id))
        .route("/health", get(health_check))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}

//! # tagbot 서버 진입점
//!
//! 커뮤니티 채팅 봇의 태그(저장된 응답) 서비스입니다.
//! 커맨드 라우터가 파싱한 `tag ...`/`userinfo` 명령을 HTTP로 받아 처리하고,
//! 채팅에 보낼 표시용 페이로드(텍스트 또는 카드)를 돌려줍니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 외부 서비스 클라이언트(멤버 조회, 신원 조회) 생성
//! 5. API 라우터 설정과 HTTP 서버 시작

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::sync::Arc;

use anyhow::Result;
use config::Config;
use routes::AppState;
use services::{identity::HttpIdentityLookup, members::HttpMemberDirectory};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 계속 진행합니다.
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 tagbot, tower_http, axum 모듈을 debug 레벨로
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagbot=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting tagbot server on {}:{}", config.host, config.port);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let members = HttpMemberDirectory::new(&config.member_lookup_url, config.http_timeout_secs)?;
    let identity = HttpIdentityLookup::new(&config.identity_api_url, config.http_timeout_secs)?;
    tracing::debug!(
        member_lookup = %config.member_lookup_url,
        identity_api = %config.identity_api_url,
        "external services configured"
    );

    // SqlitePool은 내부적으로 Arc라서 clone해도 같은 풀을 가리킵니다.
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        members: Arc::new(members),
        identity: Arc::new(identity),
    };

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

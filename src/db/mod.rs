//! # 데이터베이스 접근 계층 (Tag Store Client)
//!
//! 태그 문서 저장소와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 리졸버(services/)가 이 모듈의 함수를 호출합니다.
//!
//! 하위 모듈:
//! - `tags`: 태그 문서와 별칭의 조회/저장/삭제 쿼리

pub mod tags;

pub use tags::*;

/// 테스트용 인메모리 SQLite 풀. 마이그레이션까지 적용된 상태로 반환합니다.
///
/// 인메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정합니다.
#[cfg(test)]
pub async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    pool
}

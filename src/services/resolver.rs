//! # 태그 리졸버
//!
//! 이름으로 태그를 찾는 유일한 경로입니다.
//!
//! ## 처리 흐름
//! 1. 이름 또는 별칭이 정확히 일치하는 태그를 조회 (인덱스 조회)
//! 2. 찾았고 `update_uses`가 true면 사용 횟수를 원자적으로 1 올림
//! 3. 못 찾았으면 모든 이름/별칭을 불러와 유사도 순으로 최대 5개를 추천
//!
//! 유사도는 정규화된 레벤슈타인 거리(`strsim::normalized_levenshtein`)입니다.
//! 태그 목록은 커뮤니티가 만든 작은 규모라 미스 때마다 전체를 훑어도 충분합니다.

use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::Tag;

/// 조회 실패 시 돌려주는 최대 추천 수
pub const SUGGESTION_LIMIT: usize = 5;
/// 조회 실패 추천의 최소 유사도
pub const SUGGESTION_CUTOFF: f64 = 0.6;
/// `tag search`의 최소 유사도
pub const SEARCH_CUTOFF: f64 = 0.45;

/// 이름이나 별칭으로 태그를 찾습니다.
///
/// 표시용 조회(`update_uses = true`)면 사용 횟수를 1 올리고,
/// 돌려주는 태그에도 새 값을 반영합니다.
///
/// # 에러
/// - `AppError::NotFound`: 일치하는 태그가 없음. 비슷한 이름이 있으면 `suggestions`에 담깁니다.
pub async fn resolve(pool: &SqlitePool, name: &str, update_uses: bool) -> Result<Tag, AppError> {
    let Some(mut tag) = db::find_tag(pool, name).await? else {
        let keys = db::list_keys(pool).await?;
        let suggestions = close_matches(name, &keys, SUGGESTION_LIMIT, SUGGESTION_CUTOFF);
        tracing::debug!(name, suggestions = suggestions.len(), "tag lookup missed");
        return Err(AppError::NotFound { suggestions });
    };

    if update_uses {
        bump_uses(pool, &mut tag).await?;
    }

    Ok(tag)
}

/// ID로 태그를 찾고 사용 횟수를 1 올립니다.
pub async fn resolve_by_id(pool: &SqlitePool, id: &str) -> Result<Tag, AppError> {
    let mut tag = db::get_tag(pool, id).await?.ok_or_else(AppError::not_found)?;
    bump_uses(pool, &mut tag).await?;
    Ok(tag)
}

async fn bump_uses(pool: &SqlitePool, tag: &mut Tag) -> Result<(), AppError> {
    // 조회와 증가 사이에 삭제된 경우
    tag.uses = db::increment_uses(pool, &tag.id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(())
}

/// `tag search`: 모든 이름/별칭 중 검색어와 비슷한 것을 유사도 순으로 돌려줍니다.
///
/// 결과 수 상한은 `max(1, 후보 수 / 1.5)`입니다.
pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<String>, AppError> {
    let keys = db::list_keys(pool).await?;
    let limit = ((keys.len() as f64 / 1.5) as usize).max(1);
    Ok(close_matches(query, &keys, limit, SEARCH_CUTOFF))
}

/// `query`와 유사도가 `cutoff` 이상인 후보를 높은 순으로 최대 `limit`개 고릅니다.
///
/// 유사도가 같으면 후보 목록의 순서를 유지합니다. 중복 후보는 한 번만 나옵니다.
pub fn close_matches(query: &str, candidates: &[String], limit: usize, cutoff: f64) -> Vec<String> {
    let mut scored: Vec<(f64, &String)> = Vec::new();
    for candidate in candidates {
        if scored.iter().any(|(_, seen)| *seen == candidate) {
            continue;
        }
        let score = strsim::normalized_levenshtein(query, candidate);
        if score >= cutoff {
            scored.push((score, candidate));
        }
    }

    // sort_by는 안정 정렬이라 동점이면 원래 순서가 유지됩니다.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::TagEdit;

    async fn seed(pool: &SqlitePool, name: &str, aliases: &[&str]) -> Tag {
        let mut tag = Tag::new(name, "1", &TagEdit::default());
        tag.aliases = aliases.iter().map(|a| a.to_string()).collect();
        db::insert_tag(pool, &tag).await.unwrap();
        tag
    }

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn close_matches_ranks_and_filters() {
        let candidates = keys(&["faq", "faqs", "rules"]);
        let matches = close_matches("faqq", &candidates, SUGGESTION_LIMIT, SUGGESTION_CUTOFF);
        assert!(matches.contains(&"faq".to_string()));
        assert!(matches.contains(&"faqs".to_string()));
        assert!(!matches.contains(&"rules".to_string()));

        let matches = close_matches("faq", &candidates, 1, 0.0);
        assert_eq!(matches, vec!["faq".to_string()]);
    }

    #[test]
    fn close_matches_skips_duplicates() {
        let candidates = keys(&["faq", "faq"]);
        assert_eq!(close_matches("faq", &candidates, 5, 0.5), vec!["faq".to_string()]);
    }

    #[tokio::test]
    async fn alias_resolves_to_owner_tag_and_counts_each_display() {
        let pool = test_pool().await;
        let tag = seed(&pool, "faq", &["questions"]).await;

        let first = resolve(&pool, "questions", true).await.unwrap();
        assert_eq!(first.id, tag.id);
        assert_eq!(first.uses, 1);

        let second = resolve(&pool, "faq", true).await.unwrap();
        assert_eq!(second.uses, 2);

        let peek = resolve(&pool, "faq", false).await.unwrap();
        assert_eq!(peek.uses, 2);
    }

    #[tokio::test]
    async fn miss_suggests_close_names() {
        let pool = test_pool().await;
        seed(&pool, "faq", &[]).await;
        seed(&pool, "faqs", &[]).await;
        seed(&pool, "rules", &[]).await;

        match resolve(&pool, "faqq", true).await {
            Err(AppError::NotFound { suggestions }) => {
                assert!(suggestions.contains(&"faq".to_string()));
                assert!(suggestions.contains(&"faqs".to_string()));
                assert!(!suggestions.contains(&"rules".to_string()));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        match resolve(&pool, "zzzzzz", false).await {
            Err(AppError::NotFound { suggestions }) => assert!(suggestions.is_empty()),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn search_uses_lower_cutoff() {
        let pool = test_pool().await;
        seed(&pool, "welcome", &["welcomes"]).await;
        seed(&pool, "rules", &[]).await;
        seed(&pool, "roles", &[]).await;

        let found = search(&pool, "welcom").await.unwrap();
        assert_eq!(found, vec!["welcome".to_string(), "welcomes".to_string()]);
        assert!(search(&pool, "xyz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_by_id_counts_a_use() {
        let pool = test_pool().await;
        let tag = seed(&pool, "faq", &[]).await;

        assert_eq!(resolve_by_id(&pool, &tag.id).await.unwrap().uses, 1);
        assert!(matches!(
            resolve_by_id(&pool, "nope").await,
            Err(AppError::NotFound { .. })
        ));
    }
}

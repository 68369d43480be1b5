//! # 태그 저장소 쿼리 모듈
//!
//! 태그 문서를 읽고 쓰는 SQL 쿼리 함수들입니다.
//! 모든 함수는 `SqlitePool` 참조를 받아 비동기로 실행되며, 상태를 갖지 않습니다.
//!
//! ## 테이블 구조
//! - `tags`: 태그 문서 한 개가 한 행
//! - `tag_aliases`: 별칭 → 태그 ID. 태그가 삭제되면 `ON DELETE CASCADE`로 함께 삭제됩니다.
//!
//! - `tag_keys`: 이름과 별칭을 `fold_key`로 접은 키. 하나의 UNIQUE 인덱스를 공유합니다.
//!
//! 이름끼리, 별칭끼리, 이름과 다른 태그의 별칭이 동시에 등록되는 경쟁 상황은
//! 모두 `tag_keys`의 제약 위반이 되어 `NameConflict`로 끝납니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 행 하나에 별칭을 붙여 `Tag`로 만듭니다.
async fn hydrate(pool: &SqlitePool, row: TagRow) -> Result<Tag, AppError> {
    let aliases = list_aliases(pool, &row.id).await?;
    Tag::from_row(row, aliases)
}

/// 태그의 별칭을 등록 순서대로 조회합니다.
pub async fn list_aliases(pool: &SqlitePool, tag_id: &str) -> Result<Vec<String>, AppError> {
    let aliases = sqlx::query_scalar::<_, String>(
        "SELECT alias FROM tag_aliases WHERE tag_id = ? ORDER BY position",
    )
    .bind(tag_id)
    .fetch_all(pool)
    .await?;

    Ok(aliases)
}

/// 이름 또는 별칭이 정확히 일치하는(대소문자 구분) 태그를 조회합니다.
///
/// 두 조건 모두 인덱스를 타므로 전체 스캔이 일어나지 않습니다.
pub async fn find_tag(pool: &SqlitePool, key: &str) -> Result<Option<Tag>, AppError> {
    let row = sqlx::query_as::<_, TagRow>(
        r#"
        SELECT id, name, content, owner_id, uses, created, embed, image, url_label, url_target
        FROM tags
        WHERE name = ?
           OR id = (SELECT tag_id FROM tag_aliases WHERE alias = ?)
        LIMIT 1
        "#,
    )
    .bind(key)
    .bind(key)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(hydrate(pool, row).await?)),
        None => Ok(None),
    }
}

/// ID로 태그 하나를 조회합니다.
pub async fn get_tag(pool: &SqlitePool, id: &str) -> Result<Option<Tag>, AppError> {
    let row = sqlx::query_as::<_, TagRow>(
        r#"
        SELECT id, name, content, owner_id, uses, created, embed, image, url_label, url_target
        FROM tags
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(hydrate(pool, row).await?)),
        None => Ok(None),
    }
}

/// 이름이나 별칭으로 이미 쓰이고 있는지 대소문자를 무시하고 확인합니다 (유니코드 포함).
pub async fn is_key_taken(pool: &SqlitePool, key: &str) -> Result<bool, AppError> {
    let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tag_keys WHERE key = ?)")
        .bind(fold_key(key))
        .fetch_one(pool)
        .await?;

    Ok(taken)
}

/// 새 태그 문서를 저장합니다.
pub async fn insert_tag(pool: &SqlitePool, tag: &Tag) -> Result<(), AppError> {
    let row = tag.to_row();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO tags (id, name, content, owner_id, uses, created, embed, image, url_label, url_target)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(&row.name)
    .bind(&row.content)
    .bind(&row.owner_id)
    .bind(row.uses)
    .bind(&row.created)
    .bind(row.embed)
    .bind(&row.image)
    .bind(&row.url_label)
    .bind(&row.url_target)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::from_write(e, &tag.name))?;

    sqlx::query("INSERT INTO tag_keys (key, tag_id, kind) VALUES (?, ?, 'name')")
        .bind(fold_key(&tag.name))
        .bind(&tag.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, &tag.name))?;

    write_aliases(&mut tx, &tag.id, &tag.aliases).await?;

    tx.commit().await?;
    Ok(())
}

/// 태그 문서 전체를 교체합니다 (별칭 포함).
///
/// `uses`와 `created`는 교체하지 않습니다. 사용 횟수는 `increment_uses`만 올립니다.
///
/// ## 반환값
/// - `true`: 교체 성공
/// - `false`: 그 사이에 태그가 삭제됨
pub async fn replace_tag(pool: &SqlitePool, tag: &Tag) -> Result<bool, AppError> {
    let row = tag.to_row();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE tags
        SET name = ?, content = ?, owner_id = ?, embed = ?, image = ?, url_label = ?, url_target = ?
        WHERE id = ?
        "#,
    )
    .bind(&row.name)
    .bind(&row.content)
    .bind(&row.owner_id)
    .bind(row.embed)
    .bind(&row.image)
    .bind(&row.url_label)
    .bind(&row.url_target)
    .bind(&row.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::from_write(e, &tag.name))?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE tag_keys SET key = ? WHERE tag_id = ? AND kind = 'name'")
        .bind(fold_key(&tag.name))
        .bind(&tag.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, &tag.name))?;

    write_aliases(&mut tx, &tag.id, &tag.aliases).await?;

    tx.commit().await?;
    Ok(true)
}

/// 별칭 목록을 통째로 덮어씁니다.
pub async fn set_aliases(pool: &SqlitePool, tag_id: &str, aliases: &[String]) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    write_aliases(&mut tx, tag_id, aliases).await?;
    tx.commit().await?;
    Ok(())
}

async fn write_aliases(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    tag_id: &str,
    aliases: &[String],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM tag_aliases WHERE tag_id = ?")
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM tag_keys WHERE tag_id = ? AND kind = 'alias'")
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;

    for (position, alias) in aliases.iter().enumerate() {
        sqlx::query("INSERT INTO tag_keys (key, tag_id, kind) VALUES (?, ?, 'alias')")
            .bind(fold_key(alias))
            .bind(tag_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::from_write(e, alias))?;

        sqlx::query("INSERT INTO tag_aliases (alias, tag_id, position) VALUES (?, ?, ?)")
            .bind(alias)
            .bind(tag_id)
            .bind(position as i64)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::from_write(e, alias))?;
    }

    Ok(())
}

/// 사용 횟수를 1 올리고 새 값을 반환합니다.
///
/// 읽고-쓰기가 아닌 한 문장의 원자적 갱신입니다.
/// 태그가 이미 삭제되었으면 `None`을 반환합니다.
pub async fn increment_uses(pool: &SqlitePool, id: &str) -> Result<Option<i64>, AppError> {
    let uses = sqlx::query_scalar::<_, i64>("UPDATE tags SET uses = uses + 1 WHERE id = ? RETURNING uses")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(uses)
}

/// 소유자를 바꿉니다.
pub async fn set_owner(pool: &SqlitePool, id: &str, owner_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE tags SET owner_id = ? WHERE id = ?")
        .bind(owner_id)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// ID로 태그를 삭제합니다. 별칭은 함께 삭제됩니다.
pub async fn delete_tag(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// `uses <= max_uses`인 태그를 모두 삭제하고 삭제된 개수를 반환합니다.
pub async fn prune_tags(pool: &SqlitePool, max_uses: i64) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM tags WHERE uses <= ?")
        .bind(max_uses)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// 모든 태그의 이름과 별칭 (저장 순서, 태그마다 이름 다음에 별칭)
pub async fn list_keys(pool: &SqlitePool) -> Result<Vec<String>, AppError> {
    let keys = sqlx::query_scalar::<_, String>(
        r#"
        SELECT key FROM (
            SELECT name AS key, rowid AS tag_order, -1 AS position FROM tags
            UNION ALL
            SELECT a.alias AS key, t.rowid AS tag_order, a.position
            FROM tag_aliases a
            JOIN tags t ON t.id = a.tag_id
        )
        ORDER BY tag_order, position
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(keys)
}

/// 특정 멤버가 소유한 태그의 이름과 별칭
pub async fn list_keys_owned_by(pool: &SqlitePool, owner_id: &str) -> Result<Vec<String>, AppError> {
    let keys = sqlx::query_scalar::<_, String>(
        r#"
        SELECT key FROM (
            SELECT t.name AS key, t.rowid AS tag_order, -1 AS position
            FROM tags t
            WHERE t.owner_id = ?
            UNION ALL
            SELECT a.alias AS key, t.rowid AS tag_order, a.position
            FROM tag_aliases a
            JOIN tags t ON t.id = a.tag_id
            WHERE t.owner_id = ?
        )
        ORDER BY tag_order, position
        "#,
    )
    .bind(owner_id)
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(keys)
}

/// 모든 태그의 (이름, 사용 횟수), 저장 순서
pub async fn list_usage(pool: &SqlitePool) -> Result<Vec<(String, i64)>, AppError> {
    let usage = sqlx::query_as::<_, (String, i64)>("SELECT name, uses FROM tags ORDER BY rowid")
        .fetch_all(pool)
        .await?;

    Ok(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seed(pool: &SqlitePool, name: &str, owner: &str, aliases: &[&str]) -> Tag {
        let mut tag = Tag::new(name, owner, &TagEdit::default());
        tag.aliases = aliases.iter().map(|a| a.to_string()).collect();
        insert_tag(pool, &tag).await.unwrap();
        tag
    }

    #[tokio::test]
    async fn finds_by_name_or_alias_case_sensitively() {
        let pool = test_pool().await;
        let tag = seed(&pool, "faq", "1", &["questions"]).await;

        assert_eq!(find_tag(&pool, "faq").await.unwrap().unwrap().id, tag.id);
        let by_alias = find_tag(&pool, "questions").await.unwrap().unwrap();
        assert_eq!(by_alias.id, tag.id);
        assert_eq!(by_alias.aliases, vec!["questions".to_string()]);
        assert!(find_tag(&pool, "FAQ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn key_taken_ignores_case_across_names_and_aliases() {
        let pool = test_pool().await;
        seed(&pool, "faq", "1", &["Questions"]).await;

        assert!(is_key_taken(&pool, "FAQ").await.unwrap());
        assert!(is_key_taken(&pool, "questions").await.unwrap());
        assert!(!is_key_taken(&pool, "rules").await.unwrap());
    }

    #[tokio::test]
    async fn key_taken_folds_non_ascii_case() {
        let pool = test_pool().await;
        seed(&pool, "Über", "1", &["Ärger"]).await;

        assert!(is_key_taken(&pool, "über").await.unwrap());
        assert!(is_key_taken(&pool, "ÄRGER").await.unwrap());

        let twin = Tag::new("über", "2", &TagEdit::default());
        let err = insert_tag(&pool, &twin).await.unwrap_err();
        assert!(matches!(err, AppError::NameConflict(ref name) if name == "über"));
        assert!(get_tag(&pool, &twin.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn name_cannot_take_another_tags_alias() {
        let pool = test_pool().await;
        seed(&pool, "faq", "1", &["help"]).await;

        let clash = Tag::new("Help", "2", &TagEdit::default());
        let err = insert_tag(&pool, &clash).await.unwrap_err();
        assert!(matches!(err, AppError::NameConflict(_)));
        assert_eq!(list_keys(&pool).await.unwrap(), vec!["faq", "help"]);
    }

    #[tokio::test]
    async fn duplicate_alias_is_a_name_conflict() {
        let pool = test_pool().await;
        let first = seed(&pool, "faq", "1", &["help"]).await;
        let second = seed(&pool, "rules", "1", &[]).await;

        let err = set_aliases(&pool, &second.id, &["HELP".to_string()]).await.unwrap_err();
        assert!(matches!(err, AppError::NameConflict(ref name) if name == "HELP"));
        assert_eq!(list_aliases(&pool, &first.id).await.unwrap(), vec!["help".to_string()]);
        assert!(list_aliases(&pool, &second.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_aliases() {
        let pool = test_pool().await;
        let tag = seed(&pool, "faq", "1", &["f", "questions"]).await;

        assert!(delete_tag(&pool, &tag.id).await.unwrap());
        assert!(find_tag(&pool, "questions").await.unwrap().is_none());
        assert!(list_keys(&pool).await.unwrap().is_empty());
        assert!(!is_key_taken(&pool, "faq").await.unwrap());
        assert!(!is_key_taken(&pool, "f").await.unwrap());
        assert!(!delete_tag(&pool, &tag.id).await.unwrap());
    }

    #[tokio::test]
    async fn increment_uses_is_atomic_and_reports_new_value() {
        let pool = test_pool().await;
        let tag = seed(&pool, "faq", "1", &[]).await;

        assert_eq!(increment_uses(&pool, &tag.id).await.unwrap(), Some(1));
        assert_eq!(increment_uses(&pool, &tag.id).await.unwrap(), Some(2));
        assert_eq!(increment_uses(&pool, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn replace_keeps_uses_and_rewrites_fields() {
        let pool = test_pool().await;
        let mut tag = seed(&pool, "faq", "1", &["f"]).await;
        increment_uses(&pool, &tag.id).await.unwrap();

        tag.content = "updated".into();
        tag.uses = 0;
        assert!(replace_tag(&pool, &tag).await.unwrap());

        let stored = get_tag(&pool, &tag.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "updated");
        assert_eq!(stored.uses, 1);
        assert_eq!(stored.aliases, vec!["f".to_string()]);
    }

    #[tokio::test]
    async fn prune_deletes_up_to_threshold() {
        let pool = test_pool().await;
        let unused = seed(&pool, "a", "1", &[]).await;
        let used = seed(&pool, "b", "1", &[]).await;
        for _ in 0..5 {
            increment_uses(&pool, &used.id).await.unwrap();
        }
        let popular = seed(&pool, "c", "1", &[]).await;
        for _ in 0..6 {
            increment_uses(&pool, &popular.id).await.unwrap();
        }

        assert_eq!(prune_tags(&pool, 0).await.unwrap(), 1);
        assert!(get_tag(&pool, &unused.id).await.unwrap().is_none());
        assert_eq!(prune_tags(&pool, 5).await.unwrap(), 1);
        assert!(get_tag(&pool, &used.id).await.unwrap().is_none());
        assert!(get_tag(&pool, &popular.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn key_listings_follow_creation_order() {
        let pool = test_pool().await;
        seed(&pool, "faq", "1", &["f", "questions"]).await;
        seed(&pool, "rules", "2", &["r"]).await;

        assert_eq!(list_keys(&pool).await.unwrap(), vec!["faq", "f", "questions", "rules", "r"]);
        assert_eq!(list_keys_owned_by(&pool, "2").await.unwrap(), vec!["rules", "r"]);
        assert_eq!(
            list_usage(&pool).await.unwrap(),
            vec![("faq".to_string(), 0), ("rules".to_string(), 0)]
        );
    }
}

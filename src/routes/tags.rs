//! # 태그 명령 핸들러
//!
//! 커맨드 라우터가 전달한 `tag` 명령 하나당 핸들러 하나입니다.
//! 각 핸들러는 리졸버로 태그를 찾고, 권한을 확인하고, 엔티티를 고친 뒤 저장소에 씁니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 명령 | 권한 |
//! |--------|------|------|------|
//! | POST | /api/v1/tags | `tag create` | 누구나 |
//! | GET | /api/v1/tags/all | `tag all` | 누구나 |
//! | GET | /api/v1/tags/list | `tag list`, `tags` | 누구나 |
//! | GET | /api/v1/tags/search | `tag search` | 누구나 |
//! | POST | /api/v1/tags/prune | `tag prune` | 관리자 |
//! | GET | /api/v1/tags/id/{id} | `tag id` | 누구나 |
//! | GET | /api/v1/tags/{name} | `tag <name>` | 누구나 |
//! | PATCH | /api/v1/tags/{name} | `tag edit` | 소유자 |
//! | DELETE | /api/v1/tags/{name} | `tag delete` | 소유자 또는 관리자 |
//! | GET | /api/v1/tags/{name}/info | `tag info` | 누구나 |
//! | GET | /api/v1/tags/{name}/raw | `tag raw` | 누구나 |
//! | GET, POST | /api/v1/tags/{name}/aliases | `tag alias` | 소유자 |
//! | POST | /api/v1/tags/{name}/claim | `tag claim` | 소유자가 서버를 떠난 경우 누구나 |
//! | POST | /api/v1/tags/{name}/transfer | `tag transfer` | 소유자 |
//!
//! 표시용 조회(`<name>`, `info`, `raw`, `id`)만 사용 횟수를 올립니다.
//! 실패하면 저장소에는 아무것도 쓰지 않습니다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    db,
    error::AppError,
    middleware::auth::RequestContext,
    models::*,
    routes::AppState,
    services::{keywords, pagination::Paginator, resolver},
};

/// `tag list` 한 페이지의 항목 수
const LIST_PAGE_SIZE: usize = 15;
/// `tag search` 한 페이지의 항목 수
const SEARCH_PAGE_SIZE: usize = 15;
/// `tag all` 한 페이지의 항목 수
const ALL_PAGE_SIZE: usize = 20;

fn first_page() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "first_page")]
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 없으면 명령을 실행한 멤버
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    #[serde(default = "first_page")]
    pub page: usize,
}

/// `GET /tags/{name}`: 태그 내용을 보여줍니다.
pub async fn show_tag(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Path(name): Path<String>,
) -> Result<Json<DisplayPayload>, AppError> {
    let tag = resolver::resolve(&state.pool, &name, true).await?;
    Ok(Json(tag.to_display()))
}

/// `GET /tags/{name}/info`: 소유자, 사용 횟수 등 태그 정보를 보여줍니다.
pub async fn tag_info(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Path(name): Path<String>,
) -> Result<Json<DisplayPayload>, AppError> {
    let tag = resolver::resolve(&state.pool, &name, true).await?;
    Ok(Json(tag.to_info_card()))
}

/// `GET /tags/{name}/raw`: 마크다운을 이스케이프한 원문. 수정할 때 유용합니다.
pub async fn tag_raw(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Path(name): Path<String>,
) -> Result<Json<DisplayPayload>, AppError> {
    let tag = resolver::resolve(&state.pool, &name, true).await?;
    Ok(Json(tag.to_raw()))
}

/// `GET /tags/id/{id}`: ID로 태그를 찾아 내용과 정보 카드를 함께 보여줍니다.
pub async fn show_tag_by_id(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<Vec<DisplayPayload>>, AppError> {
    let tag = resolver::resolve_by_id(&state.pool, &id).await?;
    Ok(Json(vec![tag.to_display(), tag.to_info_card()]))
}

/// `POST /tags`: 실행한 멤버 소유의 새 태그를 만듭니다.
///
/// 이름은 예약어가 아니어야 하고, 기존 이름/별칭과 겹치지 않아야 합니다(대소문자 무시).
pub async fn create_tag(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<DisplayPayload>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("A tag name is required.".to_string()));
    }
    if keywords::is_reserved(name) {
        return Err(AppError::ReservedName(name.to_string()));
    }
    if db::is_key_taken(&state.pool, name).await? {
        return Err(AppError::NameConflict(name.to_string()));
    }

    let edit = TagEdit::for_create(&req.options)?;
    let tag = Tag::new(name, ctx.actor_id.as_str(), &edit);
    db::insert_tag(&state.pool, &tag).await?;

    tracing::info!(tag_id = %tag.id, name = %tag.name, owner = %ctx.actor_id, "tag created");
    Ok((
        StatusCode::CREATED,
        Json(DisplayPayload::text(format!(
            "Successfully created the tag\nYou can reference it using the id: `{}`",
            tag.id
        ))),
    ))
}

/// `PATCH /tags/{name}`: 소유한 태그의 내용/링크/임베드/이미지를 바꿉니다.
///
/// 옵션 값 `none`은 해당 필드를 지웁니다. 별칭은 `tag alias`로 바꿉니다.
pub async fn edit_tag(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(name): Path<String>,
    Json(options): Json<TagOptions>,
) -> Result<Json<DisplayPayload>, AppError> {
    let mut tag = resolver::resolve(&state.pool, &name, false).await?;
    if !tag.is_owned_by(&ctx.actor_id) {
        return Err(AppError::NotOwner("modify"));
    }

    let edit = TagEdit::for_update(&options)?;
    tag.apply_edit(&edit);

    if !db::replace_tag(&state.pool, &tag).await? {
        return Err(AppError::not_found());
    }

    tracing::info!(tag_id = %tag.id, name = %tag.name, actor = %ctx.actor_id, "tag edited");
    Ok(Json(DisplayPayload::text("Successfully updated the tag!")))
}

/// `DELETE /tags/{name}`: 태그와 모든 별칭을 삭제합니다.
///
/// 소유자 또는 관리자만 삭제할 수 있습니다.
pub async fn delete_tag(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(name): Path<String>,
) -> Result<Json<DisplayPayload>, AppError> {
    let tag = resolver::resolve(&state.pool, &name, false).await?;
    if !tag.is_owned_by(&ctx.actor_id) && !ctx.is_admin {
        return Err(AppError::NotOwner("delete"));
    }

    db::delete_tag(&state.pool, &tag.id).await?;

    tracing::info!(tag_id = %tag.id, name = %tag.name, actor = %ctx.actor_id, admin = ctx.is_admin, "tag deleted");
    Ok(Json(DisplayPayload::text(format!(
        "Successfully deleted tag \"{}\" and its components.",
        tag.name
    ))))
}

/// 별칭 목록 카드
fn aliases_card(tag: &Tag) -> DisplayPayload {
    let mut card = RichCard::titled(format!("Aliases for tag: {}", tag.name));
    if !tag.aliases.is_empty() {
        card.description = Some(
            tag.aliases
                .iter()
                .enumerate()
                .map(|(i, alias)| format!("{}. {}", i + 1, alias))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    DisplayPayload::RichCard(card)
}

/// 쉼표로 구분된 목록을 나눕니다. 빈 항목은 버립니다.
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// `GET /tags/{name}/aliases`: 소유한 태그의 별칭 목록
pub async fn show_aliases(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(name): Path<String>,
) -> Result<Json<DisplayPayload>, AppError> {
    let tag = resolver::resolve(&state.pool, &name, false).await?;
    if !tag.is_owned_by(&ctx.actor_id) {
        return Err(AppError::NotOwner("alias"));
    }
    Ok(Json(aliases_card(&tag)))
}

/// `POST /tags/{name}/aliases`: `{"add": "hello, hi", "remove": "hey"}`
///
/// 추가할 별칭은 모두 검사를 통과해야 하며, 하나라도 실패하면 아무것도 바뀌지 않습니다.
/// 목록에 없는 별칭을 삭제하려는 것은 무시합니다.
pub async fn update_aliases(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(name): Path<String>,
    Json(req): Json<AliasRequest>,
) -> Result<Json<DisplayPayload>, AppError> {
    let mut tag = resolver::resolve(&state.pool, &name, false).await?;
    if !tag.is_owned_by(&ctx.actor_id) {
        return Err(AppError::NotOwner("alias"));
    }

    let to_add = split_list(req.add.as_deref());
    let to_remove = split_list(req.remove.as_deref());
    if to_add.is_empty() && to_remove.is_empty() {
        return Ok(Json(aliases_card(&tag)));
    }

    let mut added: Vec<String> = Vec::new();
    for alias in to_add {
        if added.iter().any(|a| fold_key(a) == fold_key(&alias)) {
            continue;
        }
        if keywords::is_reserved(&alias) {
            return Err(AppError::ReservedName(alias));
        }
        if db::is_key_taken(&state.pool, &alias).await? {
            return Err(AppError::NameConflict(alias));
        }
        added.push(alias);
    }

    tag.aliases.extend(added);
    tag.aliases.retain(|alias| !to_remove.contains(alias));

    db::set_aliases(&state.pool, &tag.id, &tag.aliases).await?;

    tracing::info!(tag_id = %tag.id, name = %tag.name, aliases = tag.aliases.len(), "tag aliases updated");
    Ok(Json(aliases_card(&tag)))
}

/// `POST /tags/{name}/claim`: 소유자가 서버를 떠난 태그를 가져옵니다.
pub async fn claim_tag(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(name): Path<String>,
) -> Result<Json<DisplayPayload>, AppError> {
    let tag = resolver::resolve(&state.pool, &name, false).await?;

    if let Some(owner_id) = &tag.owner_id {
        if state.members.is_member(owner_id).await? {
            return Err(AppError::OwnerStillPresent);
        }
    }

    if !db::set_owner(&state.pool, &tag.id, &ctx.actor_id).await? {
        return Err(AppError::not_found());
    }

    tracing::info!(tag_id = %tag.id, name = %tag.name, previous_owner = ?tag.owner_id, owner = %ctx.actor_id, "tag claimed");
    Ok(Json(DisplayPayload::text(format!(
        "Successfully claimed the tag \"{}\".",
        tag.name
    ))))
}

/// `POST /tags/{name}/transfer`: 소유한 태그를 다른 멤버에게 넘깁니다.
///
/// 받는 멤버는 현재 서버에 있어야 합니다.
pub async fn transfer_tag(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(name): Path<String>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<DisplayPayload>, AppError> {
    let tag = resolver::resolve(&state.pool, &name, false).await?;
    if !tag.is_owned_by(&ctx.actor_id) {
        return Err(AppError::NotOwner("transfer"));
    }

    let member_id = req.member_id.trim();
    if member_id.is_empty() {
        return Err(AppError::BadRequest("A member to transfer to is required.".to_string()));
    }
    if !state.members.is_member(member_id).await? {
        return Err(AppError::BadRequest(format!(
            "Could not find the member {} in this server.",
            member_id
        )));
    }

    if !db::set_owner(&state.pool, &tag.id, member_id).await? {
        return Err(AppError::not_found());
    }

    tracing::info!(tag_id = %tag.id, name = %tag.name, from = %ctx.actor_id, to = %member_id, "tag transferred");
    let member = req
        .member_name
        .unwrap_or_else(|| format!("<@{}>", member_id));
    Ok(Json(DisplayPayload::text(format!(
        "Successfully transferred {} to {}",
        tag.name, member
    ))))
}

/// `POST /tags/prune`: 사용 횟수가 `uses` 이하인 태그를 모두 삭제합니다 (관리자 전용).
///
/// 삭제된 태그는 복구할 수 없습니다.
pub async fn prune_tags(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<PruneRequest>,
) -> Result<Json<DisplayPayload>, AppError> {
    if !ctx.is_admin {
        return Err(AppError::Forbidden(
            "You need administrator permissions to prune tags.".to_string(),
        ));
    }

    let deleted = db::prune_tags(&state.pool, req.uses).await?;

    tracing::info!(threshold = req.uses, deleted, actor = %ctx.actor_id, "tags pruned");
    Ok(Json(DisplayPayload::text(format!(
        "Successfully deleted {} tags.",
        deleted
    ))))
}

/// `GET /tags/search?q=...`: 비슷한 이름/별칭을 찾습니다. 검색어는 2자 이상
pub async fn search_tags(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PageView>, AppError> {
    let q = query.q.trim();
    if q.chars().count() < 2 {
        return Err(AppError::BadRequest(
            "The query must be at least 2 characters.".to_string(),
        ));
    }

    let matches = resolver::search(&state.pool, q).await?;
    if matches.is_empty() {
        return Err(AppError::not_found());
    }

    let view = Paginator::new(matches, SEARCH_PAGE_SIZE).render(query.page, "Close matches found")?;
    Ok(Json(view))
}

/// `GET /tags/list`: 한 멤버(기본값: 실행한 멤버)가 소유한 태그의 이름과 별칭
pub async fn list_owned(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageView>, AppError> {
    let (member_id, member_name) = match query.member_id {
        Some(id) => {
            let name = query.member_name.unwrap_or_else(|| format!("<@{}>", id));
            (id, name)
        }
        None => (ctx.actor_id.clone(), ctx.display_name()),
    };

    let keys = db::list_keys_owned_by(&state.pool, &member_id).await?;
    if keys.is_empty() {
        return Ok(Json(PageView {
            payload: DisplayPayload::text(format!("**{}** does not own any tags.", member_name)),
            pagination: None,
        }));
    }

    let title = format!("All tags owned by {}", member_name);
    let view = Paginator::new(keys, LIST_PAGE_SIZE).render(query.page, &title)?;
    Ok(Json(view))
}

/// `GET /tags/all`: 서버의 모든 태그와 사용 횟수
pub async fn list_all(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView>, AppError> {
    let entries: Vec<String> = db::list_usage(&state.pool)
        .await?
        .into_iter()
        .map(|(name, uses)| format!("{} *(uses: {})*", name, uses))
        .collect();

    if entries.is_empty() {
        return Ok(Json(PageView {
            payload: DisplayPayload::text("No tags were found for the server."),
            pagination: None,
        }));
    }

    let view = Paginator::new(entries, ALL_PAGE_SIZE).render(query.page, "All Server Specific Tags")?;
    Ok(Json(view))
}

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    middleware::auth::RequestContext,
    models::{CardAuthor, DisplayPayload, RichCard, UserInfoRequest},
    routes::AppState,
};

const VERIFIED_RESPONSE: &str = r#"{"success":true,"discord_id":int,"roblox_id":int}"#;
const UNVERIFIED_RESPONSE: &str =
    r#"{"success":false,"message":"User is not verified in the RoWifi database"}"#;

/// `POST /userinfo`: profile card for a user.
///
/// The command router sends what it already knows about the member; the linked
/// external account (if any) decides the thumbnail.
pub async fn user_info(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Json(req): Json<UserInfoRequest>,
) -> Result<Json<DisplayPayload>, AppError> {
    let linked = state.identity.linked_identity(&req.member_id).await?;
    Ok(Json(req.to_card(linked)))
}

/// Member the `api` card is about. Defaults to the caller.
#[derive(Debug, Deserialize)]
pub struct ApiInfoQuery {
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// `GET /identity-api`: how to query the identity API, with an example URL for the member.
pub async fn identity_api_info(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ApiInfoQuery>,
) -> Json<DisplayPayload> {
    let (member_id, member_name) = match query.member_id {
        Some(id) => {
            let name = query.member_name.unwrap_or_else(|| format!("<@{}>", id));
            (id, name)
        }
        None => (ctx.actor_id.clone(), ctx.display_name()),
    };
    let base = state.identity.base_url();

    let mut card = RichCard::titled("RoWifi Users API")
        .field(
            "Responses",
            format!(
                "• If user is verified:\n`{}`\n\n• If user is not verified:\n`{}`",
                VERIFIED_RESPONSE, UNVERIFIED_RESPONSE
            ),
            true,
        )
        .field("Ratelimits", "At the moment, there are no ratelimits", false);
    card.description = Some(format!(
        "Base: `{}/<USERID>`\n\nExample: {}/{}",
        base, base, member_id
    ));
    card.author = Some(CardAuthor {
        name: member_name,
        icon_url: query.avatar_url,
    });

    Json(DisplayPayload::RichCard(card))
}

/// `GET /get-id`: the caller's own id.
pub async fn get_id(ctx: RequestContext) -> Json<DisplayPayload> {
    Json(DisplayPayload::text(format!(
        "Your discord id is: `{}`",
        ctx.actor_id
    )))
}

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::routes::AppState;

/// Claims the command router signs for every forwarded invocation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // invoking member id
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub admin: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Who is running the command and what they are allowed to do.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor_id: String,
    pub actor_name: Option<String>,
    pub is_admin: bool,
}

impl RequestContext {
    /// Display name for replies, falling back to a mention.
    pub fn display_name(&self) -> String {
        self.actor_name
            .clone()
            .unwrap_or_else(|| format!("<@{}>", self.actor_id))
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_actor_token(token, &state.jwt_secret)?;

        Ok(RequestContext {
            actor_id: claims.sub,
            actor_name: claims.name,
            is_admin: claims.admin,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization token is required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

pub fn verify_actor_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Mints a token the way the command router does. Tests only.
#[cfg(test)]
pub fn create_actor_token(actor_id: &str, admin: bool, secret: &str) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now();
    let claims = Claims {
        sub: actor_id.to_string(),
        name: Some(format!("member{}", actor_id)),
        admin,
        iat: now.timestamp(),
        exp: (now + Duration::minutes(15)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encoding")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_carries_admin_flag() {
        let token = create_actor_token("42", true, "secret");
        let claims = verify_actor_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "42");
        assert!(claims.admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_actor_token("42", false, "secret");
        assert!(matches!(
            verify_actor_token(&token, "other"),
            Err(AuthError::InvalidToken)
        ));
    }
}

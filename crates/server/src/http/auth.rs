use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use utils::response::ApiResponse;
use uuid::Uuid;

/// The caller identity resolved by the authentication boundary. Handlers
/// never see an unauthenticated request; they read this from extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn extract_identity(req: &Request) -> Option<Uuid> {
    // 1) Authorization: Bearer <user id>
    if let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
        && let Ok(user_id) = token.parse::<Uuid>()
    {
        return Some(user_id);
    }

    // 2) X-User-Id: <user id>
    req.headers()
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<Uuid>().ok())
}

pub async fn require_user(mut req: Request, next: Next) -> Response {
    let Some(user_id) = extract_identity(&req) else {
        tracing::warn!(
            path = %req.uri().path(),
            method = %req.method(),
            "Unauthorized API request"
        );
        let response = ApiResponse::<()>::error("Unauthorized");
        return (StatusCode::UNAUTHORIZED, Json(response)).into_response();
    };

    req.extensions_mut().insert(AuthUser(user_id));
    next.run(req).await
}

use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware that resolves the bearer access token into a
/// [`Principal`](crate::session::models::Principal) stored in request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req).map_err(IntoResponse::into_response)?;

    let principal = state
        .session_service
        .resolve_principal(token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("MISSING_TOKEN", "Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("MISSING_TOKEN", "Invalid Authorization header"))?;

    auth_str
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.trim().is_empty())
        .map(str::trim)
        .ok_or_else(|| {
            ApiError::unauthorized(
                "MISSING_TOKEN",
                "Invalid Authorization header format. Expected: Bearer <token>",
            )
        })
}

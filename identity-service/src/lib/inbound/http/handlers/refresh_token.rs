use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::login::TokenPairResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequestBody>,
) -> Result<ApiSuccess<TokenPairResponseData>, ApiError> {
    if body.refresh_token.trim().is_empty() {
        return Err(ApiError::unprocessable("Refresh token must not be blank"));
    }

    state
        .session_service
        .refresh(body.refresh_token.trim())
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, pair.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequestBody {
    refresh_token: String,
}

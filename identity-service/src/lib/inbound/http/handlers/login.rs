use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::session::models::LoginCommand;
use crate::session::models::TokenPair;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<TokenPairResponseData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .session_service
        .login(command)
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, pair.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

impl LoginRequestBody {
    fn try_into_command(self) -> Result<LoginCommand, ApiError> {
        if self.email.trim().is_empty() {
            return Err(ApiError::unprocessable("Email must not be blank"));
        }
        if self.password.is_empty() {
            return Err(ApiError::unprocessable("Password must not be blank"));
        }
        Ok(LoginCommand::new(self.email, self.password))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPairResponseData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl From<TokenPair> for TokenPairResponseData {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
        }
    }
}

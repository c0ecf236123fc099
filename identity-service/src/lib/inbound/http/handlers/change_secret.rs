use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::account::models::ChangeSecretCommand;
use crate::inbound::http::router::AppState;
use crate::session::models::Principal;

pub async fn change_secret(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<ChangeSecretRequestBody>,
) -> Result<StatusCode, ApiError> {
    state
        .account_service
        .change_secret(&principal.account_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeSecretRequestBody {
    current_password: String,
    new_password: String,
    confirm_new_password: String,
}

impl ChangeSecretRequestBody {
    fn try_into_command(self) -> Result<ChangeSecretCommand, ApiError> {
        let fields = [
            ("current_password", &self.current_password),
            ("new_password", &self.new_password),
            ("confirm_new_password", &self.confirm_new_password),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ApiError::unprocessable(format!("{} must not be blank", name)));
        }

        Ok(ChangeSecretCommand::new(
            self.current_password,
            self.new_password,
            self.confirm_new_password,
        ))
    }
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::session::models::Principal;

/// Marks the account for deletion; removal itself happens out of band.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<ApiSuccess<DeleteAccountResponseData>, ApiError> {
    state
        .account_service
        .schedule_deletion(&principal.account_id)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::ACCEPTED,
                DeleteAccountResponseData {
                    message: "Account deletion scheduled".to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteAccountResponseData {
    pub message: String,
}

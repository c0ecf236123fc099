use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::Account;
use crate::inbound::http::router::AppState;
use crate::session::models::Principal;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    state
        .account_service
        .get_account(&principal.account_id)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileResponseData {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture_url: Option<String>,
    pub enabled: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub roles: Vec<String>,
    pub deletion_requested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for ProfileResponseData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            first_name: account.first_name.as_str().to_string(),
            last_name: account.last_name.as_str().to_string(),
            email: account.email.as_str().to_string(),
            phone_number: account.phone_number.as_str().to_string(),
            date_of_birth: account.date_of_birth,
            profile_picture_url: account.profile_picture_url.clone(),
            enabled: account.enabled,
            email_verified: account.email_verified,
            phone_verified: account.phone_verified,
            roles: account.authorities(),
            deletion_requested_at: account.deletion_requested_at,
            created_at: account.created_at,
        }
    }
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::errors::IdentityError;

pub mod change_secret;
pub mod deactivate_account;
pub mod delete_account;
pub mod get_profile;
pub mod login;
pub mod reactivate_account;
pub mod refresh_token;
pub mod register;

const GENERIC_FAILURE: &str = "An unexpected error occurred";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(ApiErrorData),
    UnprocessableEntity(ApiErrorData),
    BadRequest(ApiErrorData),
    NotFound(ApiErrorData),
    Conflict(ApiErrorData),
    Unauthorized(ApiErrorData),
}

impl ApiError {
    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(ApiErrorData::new("VALIDATION_FAILED", message))
    }

    pub fn unauthorized(code: &str, message: impl Into<String>) -> Self {
        ApiError::Unauthorized(ApiErrorData::new(code, message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, data) = match self {
            ApiError::InternalServerError(data) => (StatusCode::INTERNAL_SERVER_ERROR, data),
            ApiError::UnprocessableEntity(data) => (StatusCode::UNPROCESSABLE_ENTITY, data),
            ApiError::BadRequest(data) => (StatusCode::BAD_REQUEST, data),
            ApiError::NotFound(data) => (StatusCode::NOT_FOUND, data),
            ApiError::Conflict(data) => (StatusCode::CONFLICT, data),
            ApiError::Unauthorized(data) => (StatusCode::UNAUTHORIZED, data),
        };

        (status, Json(ApiResponseBody::new(status, data))).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        if err.is_fatal() {
            tracing::error!(code = err.code(), "Request failed: {}", err);
            return ApiError::InternalServerError(ApiErrorData::new(err.code(), GENERIC_FAILURE));
        }

        let data = ApiErrorData::new(err.code(), err.to_string());
        match err {
            IdentityError::TokenInvalid
            | IdentityError::TokenExpired
            | IdentityError::TokenWrongType => {
                tracing::warn!(code = data.code.as_str(), "Token rejected");
                ApiError::Unauthorized(data)
            }
            IdentityError::BadCredentials
            | IdentityError::AccountDisabled
            | IdentityError::AccountLocked
            | IdentityError::CredentialsExpired => {
                tracing::info!(code = data.code.as_str(), "Authentication refused");
                ApiError::Unauthorized(data)
            }
            IdentityError::EmailExists | IdentityError::PhoneExists => {
                tracing::debug!(code = data.code.as_str(), "Conflict");
                ApiError::Conflict(data)
            }
            IdentityError::MissingSecrets
            | IdentityError::SecretMismatch
            | IdentityError::InvalidCurrentSecret
            | IdentityError::AlreadyDeactivated
            | IdentityError::AlreadyActivated => {
                tracing::debug!(code = data.code.as_str(), "Request rejected");
                ApiError::BadRequest(data)
            }
            IdentityError::InvalidEmail(_)
            | IdentityError::InvalidPhoneNumber(_)
            | IdentityError::InvalidName(_) => ApiError::UnprocessableEntity(data),
            IdentityError::NotFound(_) => ApiError::NotFound(data),
            IdentityError::RoleNotFound(_)
            | IdentityError::DatabaseError(_)
            | IdentityError::Internal(_) => ApiError::InternalServerError(data),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub code: String,
    pub message: String,
}

impl ApiErrorData {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

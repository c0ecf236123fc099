use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::EmailError;
use crate::account::errors::PersonNameError;
use crate::account::errors::PhoneNumberError;
use crate::account::models::Account;
use crate::account::models::EmailAddress;
use crate::account::models::PersonName;
use crate::account::models::PhoneNumber;
use crate::account::models::RegisterAccountCommand;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .account_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::CREATED, account.into()))
}

/// HTTP request body for registering an account (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    password: Option<String>,
    confirm_password: Option<String>,
    date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid first name: {0}")]
    FirstName(PersonNameError),

    #[error("Invalid last name: {0}")]
    LastName(PersonNameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid phone number: {0}")]
    PhoneNumber(#[from] PhoneNumberError),

    #[error("Date of birth must be in the past")]
    DateOfBirth,
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterAccountCommand, ParseRegisterRequestError> {
        let first_name =
            PersonName::new(self.first_name).map_err(ParseRegisterRequestError::FirstName)?;
        let last_name =
            PersonName::new(self.last_name).map_err(ParseRegisterRequestError::LastName)?;
        let email = EmailAddress::new(self.email)?;
        let phone_number = PhoneNumber::new(self.phone_number)?;

        if let Some(date_of_birth) = self.date_of_birth {
            if date_of_birth >= Utc::now().date_naive() {
                return Err(ParseRegisterRequestError::DateOfBirth);
            }
        }

        Ok(RegisterAccountCommand {
            first_name,
            last_name,
            email,
            phone_number,
            secret: self.password,
            confirm_secret: self.confirm_password,
            date_of_birth: self.date_of_birth,
        })
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::unprocessable(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub id: String,
    pub email: String,
}

impl From<&Account> for RegisterResponseData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn body() -> RegisterRequestBody {
        RegisterRequestBody {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "Ada@Example.com".to_string(),
            phone_number: "+15550100".to_string(),
            password: Some("hunter22".to_string()),
            confirm_password: Some("hunter22".to_string()),
            date_of_birth: None,
        }
    }

    #[test]
    fn test_valid_body_parses() {
        let command = body().try_into_command().unwrap();
        assert_eq!(command.email.as_str(), "ada@example.com");
        assert_eq!(command.secrets(), Some(("hunter22", "hunter22")));
    }

    #[test]
    fn test_future_date_of_birth_is_rejected() {
        let mut body = body();
        body.date_of_birth = Some(Utc::now().date_naive() + Duration::days(1));
        assert!(matches!(
            body.try_into_command(),
            Err(ParseRegisterRequestError::DateOfBirth)
        ));
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let mut body = body();
        body.last_name = "  ".to_string();
        assert!(matches!(
            body.try_into_command(),
            Err(ParseRegisterRequestError::LastName(PersonNameError::Blank))
        ));
    }

    #[test]
    fn test_missing_secrets_are_left_to_the_service() {
        let mut body = body();
        body.password = None;
        assert!(body.try_into_command().is_ok());
    }
}

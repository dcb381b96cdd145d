use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::body_or_default;
use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let body = body_or_default(body);

    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| {
            ApiSuccess::with_message(
                StatusCode::CREATED,
                "User Registered Successfully",
                user.into(),
            )
        })
}

/// HTTP request body for registration (raw JSON). Every field is optional
/// so a missing one reports the same error as a blank one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    full_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, UserError> {
        let (Some(full_name), Some(email), Some(password)) = (
            present(self.full_name),
            present(self.email),
            present(self.password),
        ) else {
            return Err(UserError::MissingFields);
        };

        Ok(RegisterUserCommand::new(
            FullName::new(full_name)?,
            EmailAddress::new(email)?,
            password,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub data: UserData,
}

impl From<&User> for RegisterResponseData {
    fn from(user: &User) -> Self {
        Self { data: user.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(full_name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            full_name: Some(full_name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn test_blank_field_is_missing() {
        let result = request("Alice", "   ", "p1").try_into_command();
        assert!(matches!(result, Err(UserError::MissingFields)));
    }

    #[test]
    fn test_absent_field_is_missing() {
        let body: RegisterRequest =
            serde_json::from_str(r#"{"fullName": "Alice", "email": "a@x.com"}"#).unwrap();
        assert!(matches!(body.try_into_command(), Err(UserError::MissingFields)));
    }

    #[test]
    fn test_malformed_email() {
        let result = request("Alice", "not-an-email", "p1").try_into_command();
        assert!(matches!(result, Err(UserError::InvalidEmail(_))));
    }

    #[test]
    fn test_valid_request() {
        let command = request(" Alice ", "a@x.com", "p1").try_into_command().unwrap();
        assert_eq!(command.full_name.as_str(), "Alice");
        assert_eq!(command.email.as_str(), "a@x.com");
    }
}

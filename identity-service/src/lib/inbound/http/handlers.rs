use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod google;
pub mod list_users;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

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
        ApiSuccess(status, Json(ApiResponseBody::new(None, data)))
    }

    pub fn with_message(status: StatusCode, message: &str, data: T) -> Self {
        ApiSuccess(
            status,
            Json(ApiResponseBody::new(Some(message.to_string()), data)),
        )
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
}

impl ApiError {
    pub fn internal() -> Self {
        Self::InternalServerError("Internal Server Error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiErrorBody::new(message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUserId(_)
            | UserError::InvalidFullName(_)
            | UserError::InvalidEmail(_)
            | UserError::MissingFields
            | UserError::EmailAlreadyExists(_)
            | UserError::FullNameAlreadyExists(_)
            | UserError::EmailRequired
            | UserError::UnknownEmail(_)
            | UserError::IncorrectPassword => ApiError::BadRequest(err.to_string()),
            UserError::RefreshTokenMissing
            | UserError::RefreshTokenInvalid
            | UserError::RefreshTokenRevoked => ApiError::Unauthorized(err.to_string()),
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::GoogleAccountConflict | UserError::UnverifiedOAuthEmail => {
                ApiError::Unauthorized(err.to_string())
            }
            UserError::Password(_) | UserError::Token(_) | UserError::DatabaseError(_) => {
                tracing::error!(error = %err, "Request failed");
                ApiError::internal()
            }
        }
    }
}

/// Parsed JSON body, or the empty request when the body is missing, not JSON,
/// or mistyped. Field validation then answers with the usual 400.
pub fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unusable JSON body");
            T::default()
        }
    }
}

/// Success envelope: `{"success": true, "message"?: ..., ...data}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(message: Option<String>, data: T) -> Self {
        Self {
            success: true,
            message,
            data,
        }
    }
}

/// Error envelope: `{"error": true, "message": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    error: bool,
    message: String,
}

impl ApiErrorBody {
    pub fn new(message: String) -> Self {
        Self {
            error: true,
            message,
        }
    }
}

/// Payload for responses that only carry a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoData {}

/// Public projection of a user; never includes credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            full_name: user.full_name.as_str().to_string(),
            email: user.email.as_str().to_string(),
        }
    }
}

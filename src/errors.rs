use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::authz::Denial;
use crate::filters::FilterError;

pub type AppResult<T> = Result<T, AppError>;

/// Field name -> messages, rendered under `errors` in 422 responses.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{}", first_message(.0))]
    Validation(FieldErrors),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("database error")]
    Database(sqlx::Error),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::Validation(errors)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn token(err: impl Into<String>) -> Self {
        Self::Token(err.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine code for the body. Gate denials carry only `message`.
    fn code(&self) -> Option<&'static str> {
        let code = match self {
            AppError::Unauthenticated | AppError::Forbidden(_) => return None,
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::BadRequest(_) => "bad_request",
            AppError::Validation(_) => "validation",
            AppError::Configuration(_) => "configuration",
            AppError::Token(_) => "token",
            AppError::Database(_) => "database",
            AppError::Internal(_) => "internal",
        };
        Some(code)
    }
}

fn first_message(errors: &FieldErrors) -> String {
    errors
        .values()
        .flat_map(|messages| messages.iter())
        .next()
        .cloned()
        .unwrap_or_else(|| "The given data was invalid.".to_string())
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Database(err) => tracing::error!(error = %err, "database failure"),
            AppError::Internal(msg) | AppError::Configuration(msg) => tracing::error!(%msg, "request failed"),
            _ => {}
        }

        let payload = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            errors: match self {
                AppError::Validation(errors) => Some(errors),
                _ => None,
            },
        };

        (status, Json(payload)).into_response()
    }
}

/// Unique violations that slip past the pre-insert checks surface as 409.
impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        let unique = value
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if unique {
            tracing::warn!(error = %value, "unique constraint rejected write");
            Self::conflict("The record conflicts with an existing one.")
        } else {
            Self::Database(value)
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<Denial> for AppError {
    fn from(value: Denial) -> Self {
        match value {
            Denial::Unauthenticated => Self::Unauthenticated,
            forbidden @ Denial::Forbidden { .. } => Self::Forbidden(forbidden.to_string()),
        }
    }
}

impl From<FilterError> for AppError {
    fn from(value: FilterError) -> Self {
        match value {
            FilterError::MalformedValue { field, .. } => {
                let message = value.to_string();
                Self::invalid(field, message)
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(value: validator::ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        for (field, failures) in value.field_errors() {
            for failure in failures.iter() {
                // struct-level rules name their target field explicitly
                let target = failure
                    .params
                    .get("field")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| field.to_string());
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {target} field is invalid ({}).", failure.code));
                errors.entry(target).or_default().push(message);
            }
        }
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::{Capability, Role};

    #[test]
    fn denial_maps_to_exact_status_and_message() {
        let err: AppError = Denial::Unauthenticated.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Unauthenticated");

        let err: AppError = Denial::Forbidden {
            capability: Capability::Edit,
            required: vec![Role::Admin, Role::Manager],
        }
        .into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Unauthorized. Required role: admin or manager");
    }

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), 4096).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn gate_denials_render_message_only() {
        assert_eq!(
            body_of(Denial::Unauthenticated.into()).await,
            serde_json::json!({"message": "Unauthenticated"})
        );

        let forbidden = Denial::Forbidden {
            capability: Capability::Delete,
            required: vec![Role::Admin],
        };
        assert_eq!(
            body_of(forbidden.into()).await,
            serde_json::json!({"message": "Unauthorized. Required role: admin"})
        );

        let body = body_of(AppError::not_found("Produtor not found")).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Produtor not found");
    }

    #[tokio::test]
    async fn unique_violation_becomes_conflict() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE t (doc TEXT UNIQUE)").execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO t (doc) VALUES ('1')").execute(&pool).await.unwrap();

        let err: AppError = sqlx::query("INSERT INTO t (doc) VALUES ('1')")
            .execute(&pool)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: AppError = sqlx::query("SELECT * FROM missing").execute(&pool).await.unwrap_err().into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_filter_is_unprocessable() {
        let err: AppError = FilterError::MalformedValue {
            field: "produtor_id",
            value: "abc".to_string(),
            expected: "an integer",
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        match err {
            AppError::Validation(errors) => assert!(errors.contains_key("produtor_id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

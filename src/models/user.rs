use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::authz::Role;

pub const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[schema(example = "Extensionista Rural")]
    pub role_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(value: DbUser) -> Self {
        User {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            role_label: value.role.label().to_string(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Ana Souza")]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address."), length(max = 255))]
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."))]
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
    /// Defaults to `extension-agent` when omitted.
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[validate(length(min = 1))]
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Admin-side account creation.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "passwords_match_on_create", skip_on_field_errors = false))]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address."), length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."))]
    pub password: String,
    pub password_confirmation: String,
    pub role: Role,
}

/// Admin-side account update. `role` may be repeated but never changed.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "passwords_match_on_update", skip_on_field_errors = false))]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address."), length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."))]
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub role: Option<Role>,
}

fn mismatch() -> ValidationError {
    let mut err = ValidationError::new("confirmed");
    err.message = Some("As senhas não conferem.".into());
    err.add_param("field".into(), &"password");
    err
}

fn passwords_match_on_create(request: &CreateUserRequest) -> Result<(), ValidationError> {
    if request.password == request.password_confirmation {
        Ok(())
    } else {
        Err(mismatch())
    }
}

fn passwords_match_on_update(request: &UpdateUserRequest) -> Result<(), ValidationError> {
    match request.password.as_deref() {
        None | Some("") => Ok(()),
        Some(password) if request.password_confirmation.as_deref() == Some(password) => Ok(()),
        Some(_) => Err(mismatch()),
    }
}

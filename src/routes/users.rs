use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::{Authorized, CanManageUsers};
use crate::errors::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::filters::resources;
use crate::models::user::{CreateUserRequest, DbUser, UpdateUserRequest, User, USER_COLUMNS};
use crate::models::{Data, MessageResponse, PageMeta};
use crate::service::{paginate, Checks, Pagination};
use crate::utils::{hash_password, utc_now};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPage {
    pub data: Vec<User>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserMessage {
    pub message: String,
    pub user: User,
}

pub(crate) async fn fetch_user(pool: &SqlitePool, id: i64) -> AppResult<DbUser> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    sqlx::query_as::<_, DbUser>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub(crate) async fn ensure_email_available(
    pool: &SqlitePool,
    email: &str,
    ignore_id: Option<i64>,
) -> AppResult<()> {
    let mut checks = Checks::new();
    checks
        .unique(pool, "users", "email", email, ignore_id, "email")
        .await?;
    checks.finish()
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "Users, newest first", body = UserPage),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn index(
    State(state): State<AppState>,
    _auth: Authorized<CanManageUsers>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<UserPage>> {
    let pagination = Pagination::from_params(&params)?;
    let predicate = state.filters.resolve(resources::USERS, &params)?;
    let page = paginate::<DbUser>(
        &state.pool,
        "users",
        USER_COLUMNS,
        &predicate,
        "created_at DESC, id DESC",
        pagination,
    )
    .await?;

    Ok(Json(UserPage {
        data: page.data.into_iter().map(User::from).collect(),
        meta: page.meta,
    }))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserMessage),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn store(
    State(state): State<AppState>,
    _auth: Authorized<CanManageUsers>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserMessage>)> {
    ensure_email_available(&state.pool, &payload.email, None).await?;

    let password_hash = hash_password(&payload.password)?;
    let now = utc_now();
    let id: i64 = sqlx::query(
        "INSERT INTO users (name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(password_hash)
    .bind(payload.role)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?
    .last_insert_rowid();

    tracing::info!(user_id = id, role = payload.role.as_str(), "user created");
    let user = fetch_user(&state.pool, id).await?.into();
    Ok((
        StatusCode::CREATED,
        Json(UserMessage {
            message: "Usuário criado com sucesso.".to_string(),
            user,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User detail", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn show(
    State(state): State<AppState>,
    _auth: Authorized<CanManageUsers>,
    Path(id): Path<i64>,
) -> AppResult<Json<Data<User>>> {
    let user = fetch_user(&state.pool, id).await?;
    Ok(Json(Data::new(user.into())))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserMessage),
        (status = 422, description = "Invalid payload or attempted role change")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    _auth: Authorized<CanManageUsers>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> AppResult<Json<UserMessage>> {
    let existing = fetch_user(&state.pool, id).await?;

    if let Some(role) = payload.role {
        if role != existing.role {
            return Err(AppError::invalid("role", "The role of an existing user cannot be changed."));
        }
    }
    ensure_email_available(&state.pool, &payload.email, Some(id)).await?;

    let password_hash = match payload.password.as_deref() {
        Some(password) if !password.is_empty() => hash_password(password)?,
        _ => existing.password_hash,
    };

    sqlx::query("UPDATE users SET name = ?, email = ?, password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(password_hash)
        .bind(utc_now())
        .bind(id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = id, "user updated");
    let user = fetch_user(&state.pool, id).await?.into();
    Ok(Json(UserMessage {
        message: "Usuário atualizado com sucesso.".to_string(),
        user,
    }))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn destroy(
    State(state): State<AppState>,
    _auth: Authorized<CanManageUsers>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("User not found"));
    }

    tracing::info!(user_id = id, "user deleted");
    Ok(Json(MessageResponse::new("Usuário deletado com sucesso.")))
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::app::AppState;
use crate::authz::{Caller, Role};
use crate::errors::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::models::user::{AuthResponse, DbUser, LoginRequest, RegisterRequest, User, USER_COLUMNS};
use crate::models::MessageResponse;
use crate::routes::users::{ensure_email_available, fetch_user};
use crate::utils::{hash_password, utc_now, verify_password};

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 422, description = "Invalid payload or email already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    ensure_email_available(&state.pool, &payload.email, None).await?;

    let role = payload.role.unwrap_or(Role::ExtensionAgent);
    let password_hash = hash_password(&payload.password)?;
    let now = utc_now();

    let user_id: i64 = sqlx::query(
        "INSERT INTO users (name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?
    .last_insert_rowid();

    tracing::info!(user_id, role = role.as_str(), "user registered");
    let user: User = fetch_user(&state.pool, user_id).await?.into();
    let token = state.jwt.encode(user.id)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    let db_user = sqlx::query_as::<_, DbUser>(&sql)
        .bind(&payload.email)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    if !verify_password(&payload.password, &db_user.password_hash)? {
        tracing::warn!(user_id = db_user.id, "failed login");
        return Err(AppError::unauthorized("invalid credentials"));
    }

    let token = state.jwt.encode(db_user.id)?;
    Ok(Json(AuthResponse {
        token,
        user: db_user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn me(State(state): State<AppState>, caller: Caller) -> AppResult<Json<User>> {
    let user = fetch_user(&state.pool, caller.user_id).await?;
    Ok(Json(user.into()))
}

/// Tokens are stateless; logout only acknowledges.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout acknowledged", body = MessageResponse))
)]
pub async fn logout(_caller: Caller) -> AppResult<Json<MessageResponse>> {
    Ok(Json(MessageResponse::new("Logged out")))
}

//! Generic CRUD handlers, mounted once per [`Resource`].
//!
//! Reads need any authenticated caller; writes go through the capability
//! extractors, which reject before the body is read.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app::AppState;
use crate::authz::{Authorized, Caller, CanCreate, CanDelete, CanEdit};
use crate::errors::AppResult;
use crate::extract::ValidJson;
use crate::models::{Data, Paginated};
use crate::service::{self, Resource};

pub async fn index<R: Resource>(
    State(state): State<AppState>,
    _caller: Caller,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Paginated<R>>> {
    let page = service::list::<R>(&state.pool, &state.filters, &params).await?;
    Ok(Json(page))
}

pub async fn show<R: Resource>(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> AppResult<Json<Data<R>>> {
    let record = service::find::<R>(&state.pool, id).await?;
    Ok(Json(Data::new(record)))
}

pub async fn store<R: Resource>(
    State(state): State<AppState>,
    _auth: Authorized<CanCreate>,
    ValidJson(payload): ValidJson<R::Payload>,
) -> AppResult<(StatusCode, Json<Data<R>>)> {
    let record = service::create::<R>(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(Data::new(record))))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    _auth: Authorized<CanEdit>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<R::Payload>,
) -> AppResult<Json<Data<R>>> {
    let record = service::update::<R>(&state.pool, id, &payload).await?;
    Ok(Json(Data::new(record)))
}

pub async fn destroy<R: Resource>(
    State(state): State<AppState>,
    _auth: Authorized<CanDelete>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    service::delete::<R>(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

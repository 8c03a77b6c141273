//! Resource service: filtering, pagination and persistence shared by every
//! rural resource. Authorization is applied by the route extractors before
//! any function here runs.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, SqlitePool};
use validator::Validate;

use crate::errors::{AppError, AppResult, FieldErrors};
use crate::filters::{FilterRegistry, Predicate};
use crate::models::{PageMeta, Paginated};

/// A CRUD resource exposed under `/{NAME}`.
#[async_trait]
pub trait Resource: Serialize + for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    /// URL segment and filter registry key.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Select list for reads, in response field order.
    const COLUMNS: &'static str;
    /// Singular name used in not-found messages.
    const LABEL: &'static str;

    type Payload: DeserializeOwned + Validate + Send + Sync + 'static;

    /// Database-backed rules (uniqueness, referenced rows). `id` is set on update.
    async fn check(pool: &SqlitePool, payload: &Self::Payload, id: Option<i64>) -> AppResult<()>;

    async fn insert(pool: &SqlitePool, payload: &Self::Payload) -> AppResult<i64>;

    async fn update(pool: &SqlitePool, id: i64, payload: &Self::Payload) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub const DEFAULT_PER_PAGE: i64 = 15;
    pub const MAX_PER_PAGE: i64 = 100;
    /// Highest page whose offset still fits in an i64 at any page size.
    pub const MAX_PAGE: i64 = i64::MAX / Self::MAX_PER_PAGE;

    /// Reads `page` and `per_page`; out-of-range values are clamped.
    pub fn from_params(params: &HashMap<String, String>) -> AppResult<Self> {
        let page = parse_positive(params, "page")?
            .unwrap_or(1)
            .clamp(1, Self::MAX_PAGE);
        let per_page = parse_positive(params, "per_page")?
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE);
        Ok(Self { page, per_page })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

fn parse_positive(params: &HashMap<String, String>, key: &'static str) -> AppResult<Option<i64>> {
    match params.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::invalid(key, format!("The {key} must be an integer."))),
    }
}

/// Counts and fetches one page of `table` rows matching `predicate`.
pub async fn paginate<T>(
    pool: &SqlitePool,
    table: &str,
    columns: &str,
    predicate: &Predicate,
    order_by: &str,
    pagination: Pagination,
) -> AppResult<Paginated<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut count = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table} WHERE 1=1"));
    predicate.push_sql(&mut count);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::new(format!("SELECT {columns} FROM {table} WHERE 1=1"));
    predicate.push_sql(&mut select);
    select.push(format!(" ORDER BY {order_by} LIMIT "));
    select.push_bind(pagination.per_page);
    select.push(" OFFSET ");
    select.push_bind(pagination.offset());
    let data = select.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Paginated {
        data,
        meta: PageMeta::new(pagination.page, pagination.per_page, total),
    })
}

pub async fn list<R: Resource>(
    pool: &SqlitePool,
    registry: &FilterRegistry,
    params: &HashMap<String, String>,
) -> AppResult<Paginated<R>> {
    let pagination = Pagination::from_params(params)?;
    let predicate = registry.resolve(R::NAME, params)?;
    paginate(pool, R::TABLE, R::COLUMNS, &predicate, "id ASC", pagination).await
}

pub async fn find<R: Resource>(pool: &SqlitePool, id: i64) -> AppResult<R> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?", R::COLUMNS, R::TABLE);
    sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} not found", R::LABEL)))
}

pub async fn create<R: Resource>(pool: &SqlitePool, payload: &R::Payload) -> AppResult<R> {
    R::check(pool, payload, None).await?;
    let id = R::insert(pool, payload).await?;
    tracing::info!(resource = R::NAME, id, "created");
    find(pool, id).await
}

pub async fn update<R: Resource>(pool: &SqlitePool, id: i64, payload: &R::Payload) -> AppResult<R> {
    find::<R>(pool, id).await?;
    R::check(pool, payload, Some(id)).await?;
    R::update(pool, id, payload).await?;
    tracing::info!(resource = R::NAME, id, "updated");
    find(pool, id).await
}

pub async fn delete<R: Resource>(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?", R::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("{} not found", R::LABEL)));
    }
    tracing::info!(resource = R::NAME, id, "deleted");
    Ok(())
}

/// Accumulates database-backed field errors so all of them are reported at once.
#[derive(Debug, Default)]
pub struct Checks {
    errors: FieldErrors,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails `field` when another row of `table` already has `column = value`.
    pub async fn unique(
        &mut self,
        pool: &SqlitePool,
        table: &str,
        column: &str,
        value: &str,
        ignore_id: Option<i64>,
        field: &str,
    ) -> AppResult<()> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = ? AND id != ?");
        let taken: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .bind(ignore_id.unwrap_or(0))
            .fetch_one(pool)
            .await?;
        if taken > 0 {
            self.push(field, format!("The {field} has already been taken."));
        }
        Ok(())
    }

    /// Fails `field` when `table` has no row with this id.
    pub async fn exists(&mut self, pool: &SqlitePool, table: &str, id: i64, field: &str) -> AppResult<()> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?");
        let found: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
        if found == 0 {
            self.push(field, format!("The selected {field} is invalid."));
        }
        Ok(())
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

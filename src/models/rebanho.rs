use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::AppResult;
use crate::filters::resources;
use crate::service::{Checks, Resource};
use crate::utils::utc_now;

/// Herd of one species kept on a property.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rebanho {
    pub id: i64,
    pub especie: String,
    pub quantidade: i64,
    pub finalidade: Option<String>,
    pub data_atualizacao: Option<NaiveDate>,
    pub propriedade_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RebanhoRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Bovino")]
    pub especie: String,
    #[validate(range(min = 1, message = "The quantidade must be at least 1."))]
    #[schema(example = 120)]
    pub quantidade: i64,
    #[validate(length(max = 255))]
    #[schema(example = "Corte")]
    pub finalidade: Option<String>,
    pub data_atualizacao: Option<NaiveDate>,
    pub propriedade_id: i64,
}

#[async_trait]
impl Resource for Rebanho {
    const NAME: &'static str = resources::REBANHOS;
    const TABLE: &'static str = "rebanhos";
    const COLUMNS: &'static str =
        "id, especie, quantidade, finalidade, data_atualizacao, propriedade_id, created_at, updated_at";
    const LABEL: &'static str = "Rebanho";

    type Payload = RebanhoRequest;

    async fn check(pool: &SqlitePool, payload: &RebanhoRequest, _id: Option<i64>) -> AppResult<()> {
        let mut checks = Checks::new();
        checks
            .exists(pool, "propriedades", payload.propriedade_id, "propriedade_id")
            .await?;
        checks.finish()
    }

    async fn insert(pool: &SqlitePool, payload: &RebanhoRequest) -> AppResult<i64> {
        let now = utc_now();
        let id = sqlx::query(
            "INSERT INTO rebanhos (especie, quantidade, finalidade, data_atualizacao, propriedade_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&payload.especie)
        .bind(payload.quantidade)
        .bind(&payload.finalidade)
        .bind(payload.data_atualizacao)
        .bind(payload.propriedade_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    async fn update(pool: &SqlitePool, id: i64, payload: &RebanhoRequest) -> AppResult<()> {
        sqlx::query(
            "UPDATE rebanhos SET especie = ?, quantidade = ?, finalidade = ?, data_atualizacao = ?, propriedade_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&payload.especie)
        .bind(payload.quantidade)
        .bind(&payload.finalidade)
        .bind(payload.data_atualizacao)
        .bind(payload.propriedade_id)
        .bind(utc_now())
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

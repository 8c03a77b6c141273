use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::AppResult;
use crate::filters::resources;
use crate::service::{Checks, Resource};
use crate::utils::utc_now;

/// Cultivated area of a property dedicated to one crop.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UnidadeProducao {
    pub id: i64,
    pub nome_cultura: String,
    pub area_total_ha: f64,
    pub coordenadas_geograficas: Option<String>,
    pub propriedade_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UnidadeProducaoRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Milho")]
    pub nome_cultura: String,
    #[validate(range(min = 0.0, message = "The area_total_ha must be at least 0."))]
    #[schema(example = 12.5)]
    pub area_total_ha: f64,
    #[validate(length(max = 255))]
    #[schema(example = "-3.7319,-38.5267")]
    pub coordenadas_geograficas: Option<String>,
    pub propriedade_id: i64,
}

#[async_trait]
impl Resource for UnidadeProducao {
    const NAME: &'static str = resources::UNIDADES;
    const TABLE: &'static str = "unidades_producao";
    const COLUMNS: &'static str =
        "id, nome_cultura, area_total_ha, coordenadas_geograficas, propriedade_id, created_at, updated_at";
    const LABEL: &'static str = "Unidade de produção";

    type Payload = UnidadeProducaoRequest;

    async fn check(pool: &SqlitePool, payload: &UnidadeProducaoRequest, _id: Option<i64>) -> AppResult<()> {
        let mut checks = Checks::new();
        checks
            .exists(pool, "propriedades", payload.propriedade_id, "propriedade_id")
            .await?;
        checks.finish()
    }

    async fn insert(pool: &SqlitePool, payload: &UnidadeProducaoRequest) -> AppResult<i64> {
        let now = utc_now();
        let id = sqlx::query(
            "INSERT INTO unidades_producao (nome_cultura, area_total_ha, coordenadas_geograficas, propriedade_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&payload.nome_cultura)
        .bind(payload.area_total_ha)
        .bind(&payload.coordenadas_geograficas)
        .bind(payload.propriedade_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    async fn update(pool: &SqlitePool, id: i64, payload: &UnidadeProducaoRequest) -> AppResult<()> {
        sqlx::query(
            "UPDATE unidades_producao SET nome_cultura = ?, area_total_ha = ?, coordenadas_geograficas = ?, propriedade_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&payload.nome_cultura)
        .bind(payload.area_total_ha)
        .bind(&payload.coordenadas_geograficas)
        .bind(payload.propriedade_id)
        .bind(utc_now())
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

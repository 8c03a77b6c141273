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

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Propriedade {
    pub id: i64,
    pub nome: String,
    pub municipio: String,
    pub uf: String,
    pub inscricao_estadual: Option<String>,
    pub area_total: f64,
    pub produtor_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PropriedadeRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Sítio Boa Esperança")]
    pub nome: String,
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Fortaleza")]
    pub municipio: String,
    #[validate(length(equal = 2, message = "The uf must be 2 characters."))]
    #[schema(example = "CE")]
    pub uf: String,
    #[validate(length(max = 255))]
    pub inscricao_estadual: Option<String>,
    #[validate(range(min = 0.0, message = "The area_total must be at least 0."))]
    #[schema(example = 42.5)]
    pub area_total: f64,
    #[schema(example = 1)]
    pub produtor_id: i64,
}

#[async_trait]
impl Resource for Propriedade {
    const NAME: &'static str = resources::PROPRIEDADES;
    const TABLE: &'static str = "propriedades";
    const COLUMNS: &'static str =
        "id, nome, municipio, uf, inscricao_estadual, area_total, produtor_id, created_at, updated_at";
    const LABEL: &'static str = "Propriedade";

    type Payload = PropriedadeRequest;

    async fn check(pool: &SqlitePool, payload: &PropriedadeRequest, id: Option<i64>) -> AppResult<()> {
        let mut checks = Checks::new();
        if let Some(inscricao) = payload.inscricao_estadual.as_deref() {
            checks
                .unique(pool, Self::TABLE, "inscricao_estadual", inscricao, id, "inscricao_estadual")
                .await?;
        }
        checks
            .exists(pool, "produtores_rurais", payload.produtor_id, "produtor_id")
            .await?;
        checks.finish()
    }

    async fn insert(pool: &SqlitePool, payload: &PropriedadeRequest) -> AppResult<i64> {
        let now = utc_now();
        let id = sqlx::query(
            "INSERT INTO propriedades (nome, municipio, uf, inscricao_estadual, area_total, produtor_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&payload.nome)
        .bind(&payload.municipio)
        .bind(payload.uf.to_uppercase())
        .bind(&payload.inscricao_estadual)
        .bind(payload.area_total)
        .bind(payload.produtor_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    async fn update(pool: &SqlitePool, id: i64, payload: &PropriedadeRequest) -> AppResult<()> {
        sqlx::query(
            "UPDATE propriedades SET nome = ?, municipio = ?, uf = ?, inscricao_estadual = ?, area_total = ?, produtor_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&payload.nome)
        .bind(&payload.municipio)
        .bind(payload.uf.to_uppercase())
        .bind(&payload.inscricao_estadual)
        .bind(payload.area_total)
        .bind(payload.produtor_id)
        .bind(utc_now())
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

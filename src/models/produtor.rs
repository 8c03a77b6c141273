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

/// Rural producer (person or company).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProdutorRural {
    pub id: i64,
    pub nome: String,
    pub cpf_cnpj: String,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub endereco: Option<String>,
    pub data_cadastro: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProdutorRequest {
    #[validate(length(min = 1, max = 255, message = "The nome field is required (max 255 characters)."))]
    #[schema(example = "João da Silva")]
    pub nome: String,
    #[validate(length(min = 1, max = 18, message = "The cpf_cnpj field is required (max 18 characters)."))]
    #[schema(example = "123.456.789-00")]
    pub cpf_cnpj: String,
    #[validate(length(max = 20))]
    #[schema(example = "(85) 99999-0000")]
    pub telefone: Option<String>,
    #[validate(email(message = "The email must be a valid email address."), length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub endereco: Option<String>,
}

#[async_trait]
impl Resource for ProdutorRural {
    const NAME: &'static str = resources::PRODUTORES;
    const TABLE: &'static str = "produtores_rurais";
    const COLUMNS: &'static str =
        "id, nome, cpf_cnpj, telefone, email, endereco, data_cadastro, created_at, updated_at";
    const LABEL: &'static str = "Produtor rural";

    type Payload = ProdutorRequest;

    async fn check(pool: &SqlitePool, payload: &ProdutorRequest, id: Option<i64>) -> AppResult<()> {
        let mut checks = Checks::new();
        checks
            .unique(pool, Self::TABLE, "cpf_cnpj", &payload.cpf_cnpj, id, "cpf_cnpj")
            .await?;
        checks.finish()
    }

    async fn insert(pool: &SqlitePool, payload: &ProdutorRequest) -> AppResult<i64> {
        let now = utc_now();
        let id = sqlx::query(
            "INSERT INTO produtores_rurais (nome, cpf_cnpj, telefone, email, endereco, data_cadastro, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&payload.nome)
        .bind(&payload.cpf_cnpj)
        .bind(&payload.telefone)
        .bind(&payload.email)
        .bind(&payload.endereco)
        .bind(now.date_naive())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    async fn update(pool: &SqlitePool, id: i64, payload: &ProdutorRequest) -> AppResult<()> {
        sqlx::query(
            "UPDATE produtores_rurais SET nome = ?, cpf_cnpj = ?, telefone = ?, email = ?, endereco = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&payload.nome)
        .bind(&payload.cpf_cnpj)
        .bind(&payload.telefone)
        .bind(&payload.email)
        .bind(&payload.endereco)
        .bind(utc_now())
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

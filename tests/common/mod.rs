#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use rural_registry::authz::Role;
use rural_registry::create_app;
use rural_registry::jwt::JwtConfig;
use rural_registry::utils::hash_password;

pub const JWT_SECRET: &str = "test-secret";

static NEXT_ACCOUNT: AtomicUsize = AtomicUsize::new(1);

/// Router over a fresh migrated SQLite file. Keep the struct alive for the
/// duration of the test; dropping it removes the database.
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn spawn() -> Result<TestApp> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("test.db");

    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator =
        sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")).await?;
    migrator.run(&pool).await?;

    std::env::set_var("JWT_SECRET", JWT_SECRET);
    let app = create_app(pool.clone()).await?;

    Ok(TestApp { app, pool, _dir: dir })
}

impl TestApp {
    /// Inserts an account with `role` and returns a bearer token for it.
    pub async fn token_for(&self, role: Role) -> Result<String> {
        let (_, token) = self.user_with_token(role).await?;
        Ok(token)
    }

    pub async fn user_with_token(&self, role: Role) -> Result<(i64, String)> {
        let now = Utc::now();
        let email = format!("{}-{}@example.com", role.as_str(), NEXT_ACCOUNT.fetch_add(1, Ordering::Relaxed));
        let id: i64 = sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(role.label())
        .bind(&email)
        .bind(hash_password("password123")?)
        .bind(role)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        let token = JwtConfig::new(JWT_SECRET, 24).encode(id)?;
        Ok((id, token))
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` when the body is empty).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let resp = self.app.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn produtor(&self, nome: &str, cpf_cnpj: &str) -> Result<i64> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO produtores_rurais (nome, cpf_cnpj, data_cadastro, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(nome)
        .bind(cpf_cnpj)
        .bind(now.date_naive())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn propriedade(&self, produtor_id: i64, nome: &str, municipio: &str, area_total: f64) -> Result<i64> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO propriedades (nome, municipio, uf, area_total, produtor_id, created_at, updated_at) \
             VALUES (?, ?, 'CE', ?, ?, ?, ?)",
        )
        .bind(nome)
        .bind(municipio)
        .bind(area_total)
        .bind(produtor_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn rebanho(&self, propriedade_id: i64, especie: &str, quantidade: i64) -> Result<i64> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO rebanhos (especie, quantidade, propriedade_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(especie)
        .bind(quantidade)
        .bind(propriedade_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn unidade(&self, propriedade_id: i64, cultura: &str, area_total_ha: f64) -> Result<i64> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO unidades_producao (nome_cultura, area_total_ha, propriedade_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(cultura)
        .bind(area_total_ha)
        .bind(propriedade_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }
}

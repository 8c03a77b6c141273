mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use rural_registry::seed::{self, SeedSummary};

#[tokio::test]
async fn seed_inserts_demo_data_once() -> Result<()> {
    let t = common::spawn().await?;

    let summary = seed::run(&t.pool, seed::DEFAULT_PASSWORD).await?;
    assert_eq!(
        summary,
        SeedSummary {
            users: 4,
            produtores: 8,
            propriedades: 12,
            rebanhos: 24,
            unidades: 12,
        }
    );

    // unique emails make a second run fail without partial writes
    assert!(seed::run(&t.pool, seed::DEFAULT_PASSWORD).await.is_err());
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&t.pool).await?;
    assert_eq!(users, 4);

    Ok(())
}

#[tokio::test]
async fn seeded_accounts_can_log_in_with_their_roles() -> Result<()> {
    let t = common::spawn().await?;
    seed::run(&t.pool, seed::DEFAULT_PASSWORD).await?;

    for (email, role) in [
        ("admin@adagri.ce.gov.br", "admin"),
        ("gestor@adagri.ce.gov.br", "manager"),
        ("tecnico@adagri.ce.gov.br", "technician"),
        ("extensionista@adagri.ce.gov.br", "extension-agent"),
    ] {
        let (status, body) = t
            .send(
                "POST",
                "/auth/login",
                None,
                Some(json!({"email": email, "password": seed::DEFAULT_PASSWORD})),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{email}");
        assert_eq!(body["user"]["role"], role);
    }

    Ok(())
}

#[tokio::test]
async fn seeded_registry_feeds_the_reports() -> Result<()> {
    let t = common::spawn().await?;
    seed::run(&t.pool, seed::DEFAULT_PASSWORD).await?;
    let token = t.token_for(rural_registry::authz::Role::ExtensionAgent).await?;

    let (status, body) = t
        .get("/relatorios/propriedades-por-municipio?municipio=Fortaleza", &token)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["total_propriedades"], 3);

    let (_, stats) = t.get("/dashboard/stats", &token).await?;
    assert_eq!(stats["totalProdutores"], 8);
    assert_eq!(stats["totalPropriedades"], 12);

    Ok(())
}

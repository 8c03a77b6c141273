mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use rural_registry::authz::Role;

fn produtor_payload(cpf_cnpj: &str) -> serde_json::Value {
    json!({"nome": "Maria Souza", "cpf_cnpj": cpf_cnpj})
}

#[tokio::test]
async fn create_is_open_to_everyone_but_extension_agents() -> Result<()> {
    let t = common::spawn().await?;

    for (index, role) in [Role::Admin, Role::Manager, Role::Technician].into_iter().enumerate() {
        let token = t.token_for(role).await?;
        let (status, body) = t
            .send(
                "POST",
                "/produtores-rurais",
                Some(&token),
                Some(produtor_payload(&format!("0000000000{index}"))),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{role}: {body}");
    }

    let token = t.token_for(Role::ExtensionAgent).await?;
    let (status, body) = t
        .send("POST", "/produtores-rurais", Some(&token), Some(produtor_payload("99999999999")))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Unauthorized. Required role: admin or manager or technician"
    );

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM produtores_rurais")
        .fetch_one(&t.pool)
        .await?;
    assert_eq!(total, 3);

    Ok(())
}

#[tokio::test]
async fn edit_requires_admin_or_manager() -> Result<()> {
    let t = common::spawn().await?;
    let id = t.produtor("Maria", "11111111111").await?;
    let uri = format!("/produtores-rurais/{id}");

    for role in [Role::Technician, Role::ExtensionAgent] {
        let token = t.token_for(role).await?;
        let (status, body) = t
            .send("PUT", &uri, Some(&token), Some(produtor_payload("11111111111")))
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
        assert_eq!(body["message"], "Unauthorized. Required role: admin or manager");
    }

    let token = t.token_for(Role::Manager).await?;
    let (status, body) = t
        .send("PUT", &uri, Some(&token), Some(produtor_payload("11111111111")))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["nome"], "Maria Souza");

    Ok(())
}

#[tokio::test]
async fn technician_delete_is_forbidden_and_admin_delete_succeeds() -> Result<()> {
    let t = common::spawn().await?;
    let id = t.produtor("Maria", "11111111111").await?;
    let uri = format!("/produtores-rurais/{id}");

    let technician = t.token_for(Role::Technician).await?;
    let (status, body) = t.send("DELETE", &uri, Some(&technician), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "Unauthorized. Required role: admin"}));

    let manager = t.token_for(Role::Manager).await?;
    let (status, _) = t.send("DELETE", &uri, Some(&manager), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = t.token_for(Role::Admin).await?;
    let (status, body) = t.send("DELETE", &uri, Some(&admin), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null(), "expected empty body, got {body}");

    let (status, _) = t.get(&uri, &admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn denied_write_leaves_storage_untouched() -> Result<()> {
    let t = common::spawn().await?;
    let produtor_id = t.produtor("Maria", "11111111111").await?;
    let propriedade_id = t.propriedade(produtor_id, "Sítio", "Crato", 10.0).await?;

    let agent = t.token_for(Role::ExtensionAgent).await?;
    let (status, _) = t
        .send(
            "PUT",
            &format!("/propriedades/{propriedade_id}"),
            Some(&agent),
            Some(json!({"nome": "Outro", "municipio": "Crato", "uf": "CE", "area_total": 1.0, "produtor_id": produtor_id})),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let nome: String = sqlx::query_scalar("SELECT nome FROM propriedades WHERE id = ?")
        .bind(propriedade_id)
        .fetch_one(&t.pool)
        .await?;
    assert_eq!(nome, "Sítio");

    Ok(())
}

#[tokio::test]
async fn anonymous_writes_are_unauthenticated_before_validation() -> Result<()> {
    let t = common::spawn().await?;

    let (status, body) = t
        .send("POST", "/rebanhos", None, Some(json!({"especie": ""})))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"message": "Unauthenticated"}));

    let (status, _) = t.send("GET", "/rebanhos", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn every_role_can_read() -> Result<()> {
    let t = common::spawn().await?;
    t.produtor("Maria", "11111111111").await?;

    for role in Role::ALL {
        let token = t.token_for(role).await?;
        for uri in ["/produtores-rurais", "/propriedades", "/rebanhos", "/unidades-producao"] {
            let (status, _) = t.get(uri, &token).await?;
            assert_eq!(status, StatusCode::OK, "{role} {uri}");
        }
    }

    Ok(())
}

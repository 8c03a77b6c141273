mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use rural_registry::authz::Role;

fn new_user(email: &str, role: &str) -> serde_json::Value {
    json!({
        "name": "Carla Lima",
        "email": email,
        "password": "password123",
        "password_confirmation": "password123",
        "role": role
    })
}

#[tokio::test]
async fn only_admins_manage_users() -> Result<()> {
    let t = common::spawn().await?;

    for role in [Role::Manager, Role::Technician, Role::ExtensionAgent] {
        let token = t.token_for(role).await?;
        let (status, body) = t.get("/users", &token).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
        assert_eq!(body["message"], "Unauthorized. Required role: admin");

        let (status, _) = t
            .send("POST", "/users", Some(&token), Some(new_user("x@example.com", "manager")))
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
    }

    let (status, _) = t.send("GET", "/users", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn admin_creates_lists_and_deletes_users() -> Result<()> {
    let t = common::spawn().await?;
    let admin = t.token_for(Role::Admin).await?;

    let (status, body) = t
        .send("POST", "/users", Some(&admin), Some(new_user("carla@example.com", "technician")))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Usuário criado com sucesso.");
    assert_eq!(body["user"]["role"], "technician");
    assert_eq!(body["user"]["role_label"], "Técnico de Campo");
    let id = body["user"]["id"].as_i64().unwrap_or_default();

    let (status, body) = t.get("/users", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"][0]["email"], "carla@example.com");

    let (status, body) = t.get(&format!("/users/{id}"), &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Carla Lima");

    let (status, body) = t.send("DELETE", &format!("/users/{id}"), Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Usuário deletado com sucesso.");

    let (status, _) = t.send("DELETE", &format!("/users/{id}"), Some(&admin), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn create_rejects_invalid_role_mismatched_password_and_taken_email() -> Result<()> {
    let t = common::spawn().await?;
    let admin = t.token_for(Role::Admin).await?;

    let (status, body) = t
        .send("POST", "/users", Some(&admin), Some(new_user("a@example.com", "owner")))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["role"].is_array(), "{body}");

    let mut mismatched = new_user("b@example.com", "manager");
    mismatched["password_confirmation"] = json!("password999");
    let (status, body) = t.send("POST", "/users", Some(&admin), Some(mismatched)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["password"][0], "As senhas não conferem.");

    let (status, _) = t
        .send("POST", "/users", Some(&admin), Some(new_user("c@example.com", "manager")))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = t
        .send("POST", "/users", Some(&admin), Some(new_user("c@example.com", "manager")))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["email"].is_array(), "{body}");

    Ok(())
}

#[tokio::test]
async fn update_keeps_role_and_optional_password() -> Result<()> {
    let t = common::spawn().await?;
    let admin = t.token_for(Role::Admin).await?;
    let (_, body) = t
        .send("POST", "/users", Some(&admin), Some(new_user("carla@example.com", "technician")))
        .await?;
    let id = body["user"]["id"].as_i64().unwrap_or_default();
    let uri = format!("/users/{id}");

    let (status, body) = t
        .send(
            "PUT",
            &uri,
            Some(&admin),
            Some(json!({"name": "Carla L.", "email": "carla@example.com", "role": "admin"})),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["role"].is_array(), "{body}");

    let (status, body) = t
        .send(
            "PUT",
            &uri,
            Some(&admin),
            Some(json!({"name": "Carla L.", "email": "carla@example.com", "role": "technician"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Usuário atualizado com sucesso.");
    assert_eq!(body["user"]["name"], "Carla L.");

    // password untouched when omitted
    let (status, _) = t
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "carla@example.com", "password": "password123"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .send(
            "PUT",
            &uri,
            Some(&admin),
            Some(json!({
                "name": "Carla L.",
                "email": "carla@example.com",
                "password": "new-password",
                "password_confirmation": "new-password"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "carla@example.com", "password": "new-password"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

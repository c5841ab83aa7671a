mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn protected_routes_reject_missing_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = common::client_from("198.51.100.20")?;

    for path in ["/api/v1/auth/me", "/api/v1/notifications", "/api/v1/bookmarks"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", path);

        let body = res.json::<Value>().await?;
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_missing_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = common::client_from("198.51.100.21")?;

    let res = client.get(server.url("/api/v1/admin/dashboard")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/api/v1/admin/users"))
        .bearer_auth("not-a-real-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn register_rejects_invalid_input_before_touching_the_database() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = common::client_from("198.51.100.22")?;

    let res = client
        .post(server.url("/api/v1/auth/register"))
        .header("content-type", "application/json")
        .body("{broken")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "INVALID_JSON");

    let res = client
        .post(server.url("/api/v1/auth/register"))
        .json(&json!({"email": "not-an-email", "password": "Passw0rd!", "nickname": "tester"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "VALIDATION_ERROR");
    Ok(())
}

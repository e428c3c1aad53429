mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn missing_prompt_text_names_the_field() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.user();

    let res = server
        .client
        .post(server.url("/prompts"))
        .bearer_auth(&user.token)
        .json(&json!({"name": "Weekly review", "templateType": "default", "userId": user.id}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err = res.json::<Value>().await?;
    assert_eq!(err["details"], json!([{"field": "promptText", "message": "is required"}]));
    assert_eq!(server.storage.row_count("prompts").await, 0);
    Ok(())
}

#[tokio::test]
async fn prompt_lifecycle() -> Result<()> {
    let server = TestServer::start().await?;
    let (user, other) = (server.user(), server.user());

    let res = server
        .client
        .post(server.url("/prompts"))
        .bearer_auth(&user.token)
        .json(&json!({
            "name": "Tidy",
            "templateType": "default",
            "promptText": "Tidy this up",
            "isDefault": true
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let prompt = res.json::<Value>().await?;
    assert_eq!(prompt["ownerId"], user.id.to_string());
    assert_eq!(prompt["templateType"], "default");
    assert_eq!(prompt["isDefault"], true);
    let path = format!("/prompts/{}", prompt["id"].as_str().unwrap_or_default());

    let res = server
        .client
        .patch(server.url(&path))
        .bearer_auth(&user.token)
        .json(&json!({"promptText": "Tidy this up, briefly"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["promptText"], "Tidy this up, briefly");

    let res = server.client.get(server.url("/prompts")).bearer_auth(&other.token).send().await?;
    assert_eq!(res.json::<Value>().await?, json!([]));
    let res = server.client.delete(server.url(&path)).bearer_auth(&other.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.delete(server.url(&path)).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn template_catalog_is_public() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/prompts/templates/types")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let catalog = res.json::<Value>().await?;
    for key in ["default", "summarize", "action_items", "outline", "journal"] {
        assert!(catalog[key]["name"].is_string(), "missing template {}", key);
        assert!(catalog[key]["instructions"].is_string());
    }
    Ok(())
}

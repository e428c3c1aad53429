mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;
use focus_api::completion::ScriptedCompletion;

#[tokio::test]
async fn buffered_processing_uses_builtin_template() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.user();

    let res = server
        .client
        .post(server.url("/process-note"))
        .bearer_auth(&user.token)
        .json(&json!({"note": "call mom, buy milk", "promptType": "action_items", "userId": "someone-else"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({"content": "Hello, world", "templateType": "action_items", "source": "template"}));

    let sent = server.completion.last_request().expect("completion was called");
    assert_eq!(sent.user, "call mom, buy milk");
    Ok(())
}

#[tokio::test]
async fn stored_prompts_drive_processing_for_their_owner_only() -> Result<()> {
    let server = TestServer::start().await?;
    let (owner, other) = (server.user(), server.user());

    let res = server
        .client
        .post(server.url("/prompts"))
        .bearer_auth(&owner.token)
        .json(&json!({"name": "Mine", "templateType": "summarize", "promptText": "Owner instructions", "isDefault": true}))
        .send()
        .await?;
    let prompt_id = res.json::<Value>().await?["id"].as_str().unwrap_or_default().to_string();

    let res = server
        .client
        .post(server.url("/process-note"))
        .bearer_auth(&owner.token)
        .json(&json!({"content": "notes", "promptType": "summarize"}))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["source"], "default_prompt");
    assert_eq!(server.completion.last_request().map(|r| r.system), Some("Owner instructions".to_string()));

    // Another user naming the prompt id gets 404, and its text is never sent
    let res = server
        .client
        .post(server.url("/process-note"))
        .bearer_auth(&other.token)
        .json(&json!({"note": "theirs", "promptId": prompt_id}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.completion.last_request().map(|r| r.user), Some("notes".to_string()));

    // Another user's default prompt is not applied either
    let res = server
        .client
        .post(server.url("/process-note"))
        .bearer_auth(&other.token)
        .json(&json!({"note": "theirs", "promptType": "summarize"}))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["source"], "template");
    Ok(())
}

#[tokio::test]
async fn processing_validation() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.user();

    let res = server
        .client
        .post(server.url("/process-note"))
        .bearer_auth(&user.token)
        .json(&json!({"note": "  "}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["details"][0]["field"], "note");

    let res = server
        .client
        .post(server.url("/process-note"))
        .bearer_auth(&user.token)
        .json(&json!({"note": "x", "promptType": "haiku"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["details"][0]["field"], "promptType");

    let res = server
        .client
        .post(server.url("/process-note-stream"))
        .bearer_auth(&user.token)
        .json(&json!({"note": "wrong field"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(server.completion.last_request().is_none());
    Ok(())
}

#[tokio::test]
async fn stream_relays_chunks_in_order_then_done() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.user();

    let res = server
        .client
        .post(server.url("/process-note-stream"))
        .bearer_auth(&user.token)
        .json(&json!({"content": "my note", "customPrompt": "Reply warmly"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"), "{}", content_type);

    let body = res.text().await?;
    let events = common::sse_events(&body);
    let expected: Vec<(String, String)> = [("message", "Hello"), ("message", ", "), ("message", "world"), ("done", "[DONE]")]
        .iter()
        .map(|(e, d)| (e.to_string(), d.to_string()))
        .collect();
    assert_eq!(events, expected);
    assert_eq!(server.completion.last_request().map(|r| r.system), Some("Reply warmly".to_string()));
    Ok(())
}

#[tokio::test]
async fn stream_failure_ends_with_generic_error_event() -> Result<()> {
    let server = TestServer::start_with(ScriptedCompletion::new(["partial", "lost"]).failing_after(1)).await?;
    let user = server.user();

    let res = server
        .client
        .post(server.url("/process-note-stream"))
        .bearer_auth(&user.token)
        .json(&json!({"content": "my note"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.text().await?;
    let events = common::sse_events(&body);
    assert_eq!(
        events,
        vec![
            ("message".to_string(), "partial".to_string()),
            ("error".to_string(), "Failed to process note".to_string()),
        ]
    );
    assert!(!body.contains("scripted failure"));
    Ok(())
}

#[tokio::test]
async fn buffered_failure_is_a_generic_500() -> Result<()> {
    let server = TestServer::start_with(ScriptedCompletion::new(["x"]).failing_after(0)).await?;
    let user = server.user();

    let res = server
        .client
        .post(server.url("/process-note"))
        .bearer_auth(&user.token)
        .json(&json!({"note": "my note"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Failed to process note");
    Ok(())
}

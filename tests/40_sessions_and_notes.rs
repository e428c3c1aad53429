mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn pomodoro_sessions_are_scoped() -> Result<()> {
    let server = TestServer::start().await?;
    let (user, other) = (server.user(), server.user());

    let res = server
        .client
        .post(server.url("/pomodoro-sessions"))
        .bearer_auth(&user.token)
        .json(&json!({"duration": 0}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["details"][0]["field"], "duration");

    let res = server
        .client
        .post(server.url("/pomodoro-sessions"))
        .bearer_auth(&user.token)
        .json(&json!({"duration": 25, "ownerId": other.id}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let session = res.json::<Value>().await?;
    assert_eq!(session["ownerId"], user.id.to_string());
    assert_eq!(session["duration"], 25);
    assert_eq!(session["completed"], false);
    assert!(session["taskId"].is_null());
    let path = format!("/pomodoro-sessions/{}", session["id"].as_str().unwrap_or_default());

    let res = server
        .client
        .patch(server.url(&path))
        .bearer_auth(&user.token)
        .json(&json!({"completed": true}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["completed"], true);

    let res = server.client.get(server.url(&path)).bearer_auth(&other.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn sessions_cannot_link_another_users_task() -> Result<()> {
    let server = TestServer::start().await?;
    let (me, them) = (server.user(), server.user());

    let res = server
        .client
        .post(server.url("/tasks"))
        .bearer_auth(&them.token)
        .json(&json!({"title": "their task"}))
        .send()
        .await?;
    let their_task = res.json::<Value>().await?["id"].clone();

    let res = server
        .client
        .post(server.url("/pomodoro-sessions"))
        .bearer_auth(&me.token)
        .json(&json!({"duration": 25, "taskId": their_task}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["details"][0]["field"], "taskId");
    assert_eq!(body["details"][0]["message"], "Task not found");

    let res = server.client.get(server.url("/pomodoro-sessions")).bearer_auth(&me.token).send().await?;
    assert_eq!(res.json::<Value>().await?, json!([]));

    // The owner can link it
    let res = server
        .client
        .post(server.url("/pomodoro-sessions"))
        .bearer_auth(&them.token)
        .json(&json!({"duration": 25, "taskId": their_task}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?["taskId"], their_task);
    Ok(())
}

async fn save_version(server: &TestServer, token: &str, note_id: &str, title: &str) -> Result<Value> {
    let res = server
        .client
        .post(server.url("/note-versions"))
        .bearer_auth(token)
        .json(&json!({
            "noteId": note_id,
            "title": title,
            "content": format!("content of {}", title),
            "format": "markdown",
            "processingMetadata": {"model": "test"}
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json::<Value>().await?)
}

#[tokio::test]
async fn note_versions_history_is_newest_first_and_immutable() -> Result<()> {
    let server = TestServer::start().await?;
    let (user, other) = (server.user(), server.user());

    for title in ["v1", "v2", "v3"] {
        save_version(&server, &user.token, "note-1", title).await?;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    let unrelated = save_version(&server, &user.token, "note-2", "other").await?;
    save_version(&server, &other.token, "note-1", "foreign").await?;

    let res = server
        .client
        .get(server.url("/note-versions?noteId=note-1&limit=2"))
        .bearer_auth(&user.token)
        .send()
        .await?;
    let titles: Vec<String> = res
        .json::<Vec<Value>>()
        .await?
        .iter()
        .filter_map(|v| v["title"].as_str().map(str::to_string))
        .collect();
    assert_eq!(titles, vec!["v3", "v2"]);

    let res = server.client.get(server.url("/note-versions")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.json::<Vec<Value>>().await?.len(), 4);

    let path = format!("/note-versions/{}", unrelated["id"].as_str().unwrap_or_default());
    assert_eq!(unrelated["processingMetadata"], json!({"model": "test"}));
    assert_eq!(unrelated["isProcessed"], false);

    let res = server
        .client
        .patch(server.url(&path))
        .bearer_auth(&user.token)
        .json(&json!({"title": "rewrite"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let res = server.client.delete(server.url(&path)).bearer_auth(&other.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = server.client.delete(server.url(&path)).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

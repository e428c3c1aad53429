mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn create_get_and_cross_user_isolation() -> Result<()> {
    let server = TestServer::start().await?;
    let (u1, u2) = (server.user(), server.user());

    let res = server
        .client
        .post(server.url("/tasks"))
        .bearer_auth(&u1.token)
        .json(&json!({"title": "Test task"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let task = res.json::<Value>().await?;
    assert_eq!(task["ownerId"], u1.id.to_string());
    assert_eq!(task["title"], "Test task");
    assert_eq!(task["completed"], false);
    assert!(task["description"].is_null());
    let id = task["id"].as_str().unwrap_or_default().to_string();

    // Owner reads back the same fields
    let res = server.client.get(server.url(&format!("/tasks/{}", id))).bearer_auth(&u1.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, task);

    // Another user cannot see, change or remove it, repeatedly
    for _ in 0..2 {
        let res = server.client.get(server.url(&format!("/tasks/{}", id))).bearer_auth(&u2.token).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.json::<Value>().await?["code"], "NOT_FOUND");
    }
    let res = server
        .client
        .patch(server.url(&format!("/tasks/{}", id)))
        .bearer_auth(&u2.token)
        .json(&json!({"title": "hijacked"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = server.client.delete(server.url(&format!("/tasks/{}", id))).bearer_auth(&u2.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.get(server.url("/tasks")).bearer_auth(&u2.token).send().await?;
    assert_eq!(res.json::<Value>().await?, json!([]));

    // Unchanged for the owner
    let res = server.client.get(server.url(&format!("/tasks/{}", id))).bearer_auth(&u1.token).send().await?;
    assert_eq!(res.json::<Value>().await?["title"], "Test task");
    Ok(())
}

#[tokio::test]
async fn client_identity_fields_are_ignored() -> Result<()> {
    let server = TestServer::start().await?;
    let (me, victim) = (server.user(), server.user());

    let res = server
        .client
        .post(server.url("/tasks"))
        .bearer_auth(&me.token)
        .json(&json!({
            "title": "spoof",
            "userId": victim.id,
            "user_id": victim.id,
            "ownerId": victim.id,
            "owner_id": victim.id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let task = res.json::<Value>().await?;
    assert_eq!(task["ownerId"], me.id.to_string());

    // A userId query parameter does not select someone else's rows
    let res = server
        .client
        .get(server.url(&format!("/tasks?userId={}", me.id)))
        .bearer_auth(&victim.token)
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?, json!([]));

    // Patching the owner is silently dropped; an owner-only patch is empty
    let id = task["id"].as_str().unwrap_or_default();
    let res = server
        .client
        .patch(server.url(&format!("/tasks/{}", id)))
        .bearer_auth(&me.token)
        .json(&json!({"ownerId": victim.id}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_list_and_delete() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.user();

    let mut ids = Vec::new();
    for title in ["first", "second", "third"] {
        let res = server
            .client
            .post(server.url("/tasks"))
            .bearer_auth(&user.token)
            .json(&json!({"title": title, "description": "d"}))
            .send()
            .await?;
        ids.push(res.json::<Value>().await?["id"].as_str().unwrap_or_default().to_string());
    }

    let res = server.client.get(server.url("/tasks")).bearer_auth(&user.token).send().await?;
    let titles: Vec<String> = res
        .json::<Vec<Value>>()
        .await?
        .iter()
        .filter_map(|t| t["title"].as_str().map(str::to_string))
        .collect();
    assert_eq!(titles, vec!["first", "second", "third"]);

    let res = server.client.get(server.url("/tasks?limit=2")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.json::<Vec<Value>>().await?.len(), 2);

    let res = server.client.get(server.url("/tasks?limit=zero")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .patch(server.url(&format!("/tasks/{}", ids[1])))
        .bearer_auth(&user.token)
        .json(&json!({"completed": true, "description": null}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["completed"], true);
    assert!(updated["description"].is_null());
    assert_eq!(updated["title"], "second");

    let res = server.client.delete(server.url(&format!("/tasks/{}", ids[0]))).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"deleted": true, "id": ids[0]}));

    let res = server.client.get(server.url(&format!("/tasks/{}", ids[0]))).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.storage.row_count("tasks").await, 2);
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_and_ids() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.user();

    let res = server
        .client
        .post(server.url("/tasks"))
        .bearer_auth(&user.token)
        .json(&json!({"title": "", "completed": "yes"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err = res.json::<Value>().await?;
    assert_eq!(err["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = err["details"]
        .as_array()
        .map(|d| d.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(fields, vec!["title", "completed"]);

    let res = server
        .client
        .post(server.url("/tasks"))
        .bearer_auth(&user.token)
        .header("Content-Type", "application/json")
        .body("{\"title\":")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["details"][0]["field"], "body");

    let res = server.client.get(server.url("/tasks/not-a-uuid")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let huge = "x".repeat(80 * 1024);
    let res = server
        .client
        .post(server.url("/tasks"))
        .bearer_auth(&user.token)
        .json(&json!({"title": huge}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.storage.row_count("tasks").await, 0);
    Ok(())
}

#[tokio::test]
async fn offset_pages_reach_rows_past_the_cap() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.user();

    // More rows than the test server's list cap of 50
    let mut created = Vec::new();
    for i in 0..101 {
        let res = server
            .client
            .post(server.url("/tasks"))
            .bearer_auth(&user.token)
            .json(&json!({"title": format!("task {}", i)}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        created.push(res.json::<Value>().await?["id"].clone());
    }

    let res = server.client.get(server.url("/tasks")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.json::<Vec<Value>>().await?.len(), 50);

    let mut listed = Vec::new();
    for offset in [0, 50, 100, 150] {
        let res = server
            .client
            .get(server.url(&format!("/tasks?limit=50&offset={}", offset)))
            .bearer_auth(&user.token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        listed.extend(res.json::<Vec<Value>>().await?.into_iter().map(|t| t["id"].clone()));
    }
    assert_eq!(listed.len(), 101);
    let newest = created.last().cloned().unwrap_or_default();
    assert!(listed.contains(&newest));
    for id in &created {
        assert_eq!(listed.iter().filter(|l| *l == id).count(), 1);
    }

    let res = server.client.get(server.url("/tasks?offset=-1")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["details"][0]["field"], "offset");
    Ok(())
}

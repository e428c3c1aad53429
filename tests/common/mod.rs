#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use uuid::Uuid;

use focus_api::auth::{generate_jwt, Claims, JwtAuthenticator};
use focus_api::completion::ScriptedCompletion;
use focus_api::config::AppConfig;
use focus_api::database::MemoryStorage;
use focus_api::AppState;

pub const SECRET: &str = "integration-test-secret";
pub const AUDIENCE: &str = "authenticated";

/// A running in-process server with its own storage.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub storage: Arc<MemoryStorage>,
    pub completion: Arc<ScriptedCompletion>,
    pub client: reqwest::Client,
}

/// A signed-in test user.
pub struct User {
    pub id: Uuid,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(ScriptedCompletion::new(["Hello", ", ", "world"])).await
    }

    pub async fn start_with(completion: ScriptedCompletion) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        config.security.jwt_audience = AUDIENCE.to_string();
        config.api.max_list_limit = 50;
        config.api.max_request_size_bytes = 64 * 1024;

        let storage = Arc::new(MemoryStorage::new());
        let completion = Arc::new(completion);
        let authenticator = Arc::new(JwtAuthenticator::new(SECRET, AUDIENCE)?);
        let state = AppState::new(config, authenticator, storage.clone(), completion.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, focus_api::app(state)).await {
                tracing::error!("test server stopped: {}", e);
            }
        });

        let server = Self { port, base_url, storage, completion, client: reqwest::Client::new() };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn user(&self) -> User {
        user_with_secret(SECRET)
    }
}

pub fn user_with_secret(secret: &str) -> User {
    let id = Uuid::new_v4();
    let claims = Claims::new(id, format!("{}@example.com", id.simple()), AUDIENCE, 1).expect("claims");
    let token = generate_jwt(&claims, secret).expect("token");
    User { id, token }
}

/// Splits an SSE body into `(event, data)` pairs, skipping comments.
pub fn sse_events(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .filter_map(|block| {
            let mut event = "message".to_string();
            let mut data: Vec<&str> = Vec::new();
            for line in block.lines() {
                if let Some(v) = line.strip_prefix("event:") {
                    event = v.strip_prefix(' ').unwrap_or(v).to_string();
                } else if let Some(v) = line.strip_prefix("data:") {
                    data.push(v.strip_prefix(' ').unwrap_or(v));
                }
            }
            if data.is_empty() {
                None
            } else {
                Some((event, data.join("\n")))
            }
        })
        .collect()
}

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Completion, CompletionError, CompletionRequest, CompletionStream};
use crate::config::CompletionConfig;

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiCompletion {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChunkResponse {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChatContent,
}

#[derive(Debug, Default, Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompletion {
    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        if config.api_key.is_empty() {
            return Err(CompletionError::NotConfigured("OPENAI_API_KEY"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(model = %config.model, base_url = %config.base_url, "Configured completion client");
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    async fn send(&self, request: &CompletionRequest, stream: bool) -> Result<reqwest::Response, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            temperature: self.temperature,
            stream,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream { status: status.as_u16(), body });
        }
        Ok(response)
    }
}

#[async_trait]
impl Completion for OpenAiCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let response: ChatResponse = self.send(&request, false).await?.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CompletionError::Decode("response has no message content".to_string()))
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream, CompletionError> {
        let response = self.send(&request, true).await?;
        debug!(model = %self.model, "Opened completion stream");
        let body = response.bytes_stream().map(|r| r.map(|b| b.to_vec())).boxed();
        Ok(event_stream(body))
    }
}

#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
    Skip,
}

fn parse_line(line: &str) -> Result<SseLine, CompletionError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }
    if data.is_empty() {
        return Ok(SseLine::Skip);
    }
    let chunk: ChunkResponse =
        serde_json::from_str(data).map_err(|e| CompletionError::Decode(format!("bad stream event: {}", e)))?;
    match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(text) if !text.is_empty() => Ok(SseLine::Delta(text)),
        _ => Ok(SseLine::Skip),
    }
}

struct EventState {
    body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String, CompletionError>>,
    finished: bool,
}

impl EventState {
    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.push_line(&String::from_utf8_lossy(&raw));
            if self.finished {
                self.buffer.clear();
                return;
            }
        }
    }

    fn push_line(&mut self, line: &str) {
        match parse_line(line.trim_end()) {
            Ok(SseLine::Delta(text)) => self.pending.push_back(Ok(text)),
            Ok(SseLine::Done) => self.finished = true,
            Ok(SseLine::Skip) => {}
            Err(e) => {
                self.pending.push_back(Err(e));
                self.finished = true;
            }
        }
    }
}

/// Turns an upstream SSE byte stream into content deltas, ending at `[DONE]`.
fn event_stream(body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>) -> CompletionStream {
    let state = EventState { body, buffer: Vec::new(), pending: VecDeque::new(), finished: false };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(bytes)) => {
                    state.buffer.extend_from_slice(&bytes);
                    state.drain_lines();
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.push_back(Err(e.into()));
                }
                None => {
                    state.finished = true;
                    if !state.buffer.is_empty() {
                        let rest = std::mem::take(&mut state.buffer);
                        state.push_line(&String::from_utf8_lossy(&rest));
                    }
                }
            }
        }
    })
    .boxed()
}

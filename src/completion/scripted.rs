use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use super::{Completion, CompletionError, CompletionRequest, CompletionStream};

/// Replays fixed chunks. Used by the development server when no API key is
/// configured, and by tests.
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    chunks: Vec<String>,
    fail_after: Option<usize>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            fail_after: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Emit the first `n` chunks, then fail.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }

    fn record(&self, request: CompletionRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.record(request);
        if self.fail_after.is_some() {
            return Err(CompletionError::Failed("scripted failure".to_string()));
        }
        Ok(self.chunks.concat())
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream, CompletionError> {
        self.record(request);
        let take = self.fail_after.unwrap_or(self.chunks.len()).min(self.chunks.len());
        let mut items: Vec<Result<String, CompletionError>> =
            self.chunks[..take].iter().cloned().map(Ok).collect();
        if self.fail_after.is_some() {
            items.push(Err(CompletionError::Failed("scripted failure".to_string())));
        }
        Ok(stream::iter(items).boxed())
    }
}

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream, StreamExt};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::Principal;
use crate::completion::CompletionStream;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::processing::{ProcessNote, ProcessNoteStream, ProcessedNote};
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// POST /process-note - buffered
pub async fn process_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(ProcessNote(request)): ValidatedJson<ProcessNote>,
) -> ApiResult<ProcessedNote> {
    let processed = state.note_processor().process(&principal, request).await?;
    Ok(ApiResponse::success(processed))
}

/// POST /process-note-stream - chunks as SSE `data` events, then `done`
pub async fn process_note_stream(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(ProcessNoteStream(request)): ValidatedJson<ProcessNoteStream>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let upstream = state.note_processor().process_stream(&principal, request).await?;
    let keep_alive = KeepAlive::new().interval(Duration::from_secs(state.config.api.sse_keep_alive_secs));

    Ok(Sse::new(sse_events(upstream, principal.id())).keep_alive(keep_alive))
}

/// Logs when the response is dropped before the upstream finished.
struct StreamGuard {
    principal: Uuid,
    chunks: usize,
    finished: bool,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if !self.finished {
            info!(principal = %self.principal, chunks = self.chunks, "Client disconnected, released completion stream");
        }
    }
}

struct Relay {
    upstream: CompletionStream,
    guard: StreamGuard,
}

fn sse_events(upstream: CompletionStream, principal: Uuid) -> impl Stream<Item = Result<Event, Infallible>> {
    let relay = Relay { upstream, guard: StreamGuard { principal, chunks: 0, finished: false } };

    stream::unfold(Some(relay), |relay| async move {
        let Some(mut relay) = relay else {
            return None;
        };
        match relay.upstream.next().await {
            Some(Ok(chunk)) => {
                relay.guard.chunks += 1;
                // SSE fields cannot carry bare carriage returns
                let event = Event::default().data(chunk.replace('\r', ""));
                Some((Ok(event), Some(relay)))
            }
            Some(Err(e)) => {
                error!(principal = %relay.guard.principal, "Completion stream failed: {}", e);
                relay.guard.finished = true;
                Some((Ok(Event::default().event("error").data("Failed to process note")), None))
            }
            None => {
                relay.guard.finished = true;
                info!(principal = %relay.guard.principal, chunks = relay.guard.chunks, "Completion stream finished");
                Some((Ok(Event::default().event("done").data("[DONE]")), None))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionError;

    #[tokio::test]
    async fn relays_chunks_then_done() {
        let upstream: CompletionStream =
            stream::iter(vec![Ok("a".to_string()), Ok("b".to_string())]).boxed();
        let events: Vec<_> = sse_events(upstream, Uuid::nil()).collect().await;
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn upstream_error_ends_with_error_event() {
        let upstream: CompletionStream = stream::iter(vec![
            Ok("a".to_string()),
            Err(CompletionError::Failed("boom".into())),
            Ok("never".to_string()),
        ])
        .boxed();
        let events: Vec<_> = sse_events(upstream, Uuid::nil()).collect().await;
        assert_eq!(events.len(), 2);
    }
}

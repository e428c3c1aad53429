//! AI-assisted note processing.
//!
//! Instructions are resolved per request, first match wins: a custom prompt
//! from the body, a stored prompt named by id, the caller's default prompt
//! for the template type, then the built-in template.

pub mod templates;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Principal;
use crate::completion::{Completion, CompletionError, CompletionRequest, CompletionStream};
use crate::filter::Filter;
use crate::models::Prompt;
use crate::repository::{OwnedRepository, RepositoryError};
use crate::validation::{Body, InvalidInput, Validate};

pub use templates::{Template, DEFAULT_TEMPLATE, TEMPLATES};

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Unknown template type: {0}")]
    UnknownTemplate(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Options shared by both processing endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRequest {
    pub content: String,
    pub prompt_id: Option<Uuid>,
    pub prompt_type: String,
    pub custom_prompt: Option<String>,
}

impl NoteRequest {
    fn from_body(mut body: Body, content_fields: &[&str]) -> Result<Self, InvalidInput> {
        let content = body.required_str_alias(content_fields);
        let prompt_id = body.optional_uuid("promptId");
        let prompt_type = body.optional_non_empty_str("promptType");
        let custom_prompt = body.optional_str("customPrompt").filter(|s| !s.trim().is_empty());
        body.finish(|| NoteRequest {
            content: content.unwrap_or_default(),
            prompt_id,
            prompt_type: prompt_type.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            custom_prompt,
        })
    }
}

/// Body of `POST /process-note`; the note may be sent as `note` or `content`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessNote(pub NoteRequest);

impl Validate for ProcessNote {
    fn validate(body: Body) -> Result<Self, InvalidInput> {
        NoteRequest::from_body(body, &["note", "content"]).map(ProcessNote)
    }
}

/// Body of `POST /process-note-stream`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessNoteStream(pub NoteRequest);

impl Validate for ProcessNoteStream {
    fn validate(body: Body) -> Result<Self, InvalidInput> {
        NoteRequest::from_body(body, &["content"]).map(ProcessNoteStream)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSource {
    Custom,
    Prompt,
    DefaultPrompt,
    Template,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrompt {
    pub instructions: String,
    pub template_type: String,
    pub source: PromptSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedNote {
    pub content: String,
    pub template_type: String,
    pub source: PromptSource,
}

pub struct NoteProcessor {
    prompts: OwnedRepository<Prompt>,
    completion: Arc<dyn Completion>,
}

impl NoteProcessor {
    pub fn new(prompts: OwnedRepository<Prompt>, completion: Arc<dyn Completion>) -> Self {
        Self { prompts, completion }
    }

    pub async fn resolve(&self, principal: &Principal, request: &NoteRequest) -> Result<ResolvedPrompt, ProcessingError> {
        if let Some(custom) = &request.custom_prompt {
            return Ok(ResolvedPrompt {
                instructions: custom.clone(),
                template_type: request.prompt_type.clone(),
                source: PromptSource::Custom,
            });
        }

        if let Some(id) = request.prompt_id {
            let prompt = self.prompts.get(principal, id).await?;
            return Ok(ResolvedPrompt {
                instructions: prompt.prompt_text,
                template_type: prompt.template_type,
                source: PromptSource::Prompt,
            });
        }

        let defaults = Filter::new()
            .eq("template_type", request.prompt_type.as_str())
            .eq("is_default", true)
            .limit(1);
        if let Some(prompt) = self.prompts.list(principal, defaults).await?.into_iter().next() {
            return Ok(ResolvedPrompt {
                instructions: prompt.prompt_text,
                template_type: prompt.template_type,
                source: PromptSource::DefaultPrompt,
            });
        }

        let template = templates::find(&request.prompt_type)
            .ok_or_else(|| ProcessingError::UnknownTemplate(request.prompt_type.clone()))?;
        Ok(ResolvedPrompt {
            instructions: template.instructions.to_string(),
            template_type: template.key.to_string(),
            source: PromptSource::Template,
        })
    }

    pub async fn process(&self, principal: &Principal, request: NoteRequest) -> Result<ProcessedNote, ProcessingError> {
        let resolved = self.resolve(principal, &request).await?;
        debug!(principal = %principal.id(), source = ?resolved.source, template_type = %resolved.template_type, "Processing note");

        let content = self
            .completion
            .complete(CompletionRequest::new(resolved.instructions, request.content))
            .await?;

        info!(principal = %principal.id(), chars = content.len(), "Processed note");
        Ok(ProcessedNote { content, template_type: resolved.template_type, source: resolved.source })
    }

    pub async fn process_stream(&self, principal: &Principal, request: NoteRequest) -> Result<CompletionStream, ProcessingError> {
        let resolved = self.resolve(principal, &request).await?;
        debug!(principal = %principal.id(), source = ?resolved.source, template_type = %resolved.template_type, "Streaming note");

        Ok(self
            .completion
            .complete_stream(CompletionRequest::new(resolved.instructions, request.content))
            .await?)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{impl_resource_ids, IntoFields, Resource};
use crate::filter::Fields;
use crate::validation::{Body, InvalidInput, Validate};

/// An immutable snapshot of a scratchpad note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct NoteVersion {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub note_id: String,
    pub title: String,
    pub content: String,
    pub format: String,
    pub is_processed: bool,
    pub processing_metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Resource for NoteVersion {
    const TABLE: &'static str = "note_versions";
    const NAME: &'static str = "Note version";
    const TRACKS_UPDATES: bool = false;

    type New = NewNoteVersion;

    impl_resource_ids!();
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNoteVersion {
    pub note_id: String,
    pub title: String,
    pub content: String,
    pub format: String,
    pub is_processed: bool,
    pub processing_metadata: Option<Value>,
}

impl Validate for NewNoteVersion {
    fn validate(mut body: Body) -> Result<Self, InvalidInput> {
        let note_id = body.required_str("noteId");
        let title = body.required_str("title");
        let content = body.required_str("content");
        let format = body.required_str("format");
        let is_processed = body.optional_bool("isProcessed");
        let processing_metadata = body.optional_object("processingMetadata");
        body.finish(|| NewNoteVersion {
            note_id: note_id.unwrap_or_default(),
            title: title.unwrap_or_default(),
            content: content.unwrap_or_default(),
            format: format.unwrap_or_default(),
            is_processed: is_processed.unwrap_or(false),
            processing_metadata,
        })
    }
}

impl IntoFields for NewNoteVersion {
    fn into_fields(self) -> Fields {
        Fields::new()
            .set("note_id", self.note_id)
            .set("title", self.title)
            .set("content", self.content)
            .set("format", self.format)
            .set("is_processed", self.is_processed)
            .set("processing_metadata", self.processing_metadata)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{impl_resource_ids, IntoFields, Patchable, Resource};
use crate::filter::{Fields, Param};
use crate::validation::{Body, InvalidInput, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Task {
    const TABLE: &'static str = "tasks";
    const NAME: &'static str = "Task";
    const TRACKS_UPDATES: bool = true;

    type New = NewTask;

    impl_resource_ids!();
}

impl Patchable for Task {
    type Patch = TaskPatch;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl Validate for NewTask {
    fn validate(mut body: Body) -> Result<Self, InvalidInput> {
        let title = body.required_str("title");
        let description = body.optional_str("description");
        let completed = body.optional_bool("completed");
        body.finish(|| NewTask {
            title: title.unwrap_or_default(),
            description,
            completed: completed.unwrap_or(false),
        })
    }
}

impl IntoFields for NewTask {
    fn into_fields(self) -> Fields {
        Fields::new()
            .set("title", self.title)
            .set("description", self.description)
            .set("completed", self.completed)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl Validate for TaskPatch {
    fn validate(mut body: Body) -> Result<Self, InvalidInput> {
        let title = body.optional_non_empty_str("title");
        let description = body.nullable_str("description");
        let completed = body.optional_bool("completed");
        let patch = body.finish(|| TaskPatch { title, description, completed })?;
        if patch == TaskPatch::default() {
            return Err(InvalidInput::field("body", "at least one of title, description, completed is required"));
        }
        Ok(patch)
    }
}

impl IntoFields for TaskPatch {
    fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        if let Some(title) = self.title {
            fields.insert("title", title);
        }
        if let Some(description) = self.description {
            fields.insert("description", Param::from(description));
        }
        if let Some(completed) = self.completed {
            fields.insert("completed", completed);
        }
        fields
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{impl_resource_ids, IntoFields, OwnedReference, Patchable, Resource, Task};
use crate::filter::Fields;
use crate::validation::{Body, InvalidInput, Validate};

/// A finished or abandoned focus interval. `duration` is in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PomodoroSession {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub task_id: Option<Uuid>,
    pub duration: i32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Resource for PomodoroSession {
    const TABLE: &'static str = "pomodoro_sessions";
    const NAME: &'static str = "Pomodoro session";
    const TRACKS_UPDATES: bool = false;

    type New = NewPomodoroSession;

    impl_resource_ids!();

    fn references(input: &NewPomodoroSession) -> Vec<OwnedReference> {
        input
            .task_id
            .map(|id| OwnedReference { field: "taskId", table: Task::TABLE, name: Task::NAME, id })
            .into_iter()
            .collect()
    }
}

impl Patchable for PomodoroSession {
    type Patch = PomodoroSessionPatch;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPomodoroSession {
    pub task_id: Option<Uuid>,
    pub duration: i32,
    pub completed: bool,
}

impl Validate for NewPomodoroSession {
    fn validate(mut body: Body) -> Result<Self, InvalidInput> {
        let task_id = body.optional_uuid("taskId");
        let duration = body.required_positive_int("duration");
        let completed = body.optional_bool("completed");
        body.finish(|| NewPomodoroSession {
            task_id,
            duration: duration.unwrap_or_default(),
            completed: completed.unwrap_or(false),
        })
    }
}

impl IntoFields for NewPomodoroSession {
    fn into_fields(self) -> Fields {
        Fields::new()
            .set("task_id", self.task_id)
            .set("duration", self.duration)
            .set("completed", self.completed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PomodoroSessionPatch {
    pub completed: bool,
}

impl Validate for PomodoroSessionPatch {
    fn validate(mut body: Body) -> Result<Self, InvalidInput> {
        let completed = body.required_bool("completed");
        body.finish(|| PomodoroSessionPatch { completed: completed.unwrap_or(false) })
    }
}

impl IntoFields for PomodoroSessionPatch {
    fn into_fields(self) -> Fields {
        Fields::new().set("completed", self.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_must_be_positive() {
        let err = NewPomodoroSession::validate(Body::from_value(json!({"duration": -5})).unwrap()).unwrap_err();
        assert_eq!(err.fields(), vec!["duration"]);
    }

    #[test]
    fn task_id_must_be_uuid() {
        let err = NewPomodoroSession::validate(Body::from_value(json!({"duration": 25, "taskId": 7})).unwrap())
            .unwrap_err();
        assert_eq!(err.fields(), vec!["taskId"]);
    }

    #[test]
    fn linked_task_is_an_owned_reference() {
        let task = Uuid::new_v4();
        let input = NewPomodoroSession { task_id: Some(task), duration: 25, completed: false };
        let refs = PomodoroSession::references(&input);
        assert_eq!(refs.len(), 1);
        assert_eq!((refs[0].field, refs[0].table, refs[0].id), ("taskId", "tasks", task));

        let unlinked = NewPomodoroSession { task_id: None, ..input };
        assert!(PomodoroSession::references(&unlinked).is_empty());
    }

    #[test]
    fn patch_requires_completed() {
        assert!(PomodoroSessionPatch::validate(Body::from_value(json!({})).unwrap()).is_err());
        let patch = PomodoroSessionPatch::validate(Body::from_value(json!({"completed": true})).unwrap()).unwrap();
        assert!(patch.completed);
    }
}

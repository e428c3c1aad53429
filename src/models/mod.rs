//! Persisted resources. Every resource has exactly one owner, fixed at
//! creation.
//!
//! Rows deserialize from snake_case storage columns and serialize to the
//! camelCase HTTP shape.

pub mod note_version;
pub mod pomodoro;
pub mod prompt;
pub mod task;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::auth::Principal;
use crate::filter::Fields;
use crate::validation::Validate;

pub use note_version::{NewNoteVersion, NoteVersion};
pub use pomodoro::{NewPomodoroSession, PomodoroSession, PomodoroSessionPatch};
pub use prompt::{NewPrompt, Prompt, PromptPatch};
pub use task::{NewTask, Task, TaskPatch};

pub const ID_COLUMN: &str = "id";
pub const OWNER_COLUMN: &str = "owner_id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Columns a patch may never write.
pub const IMMUTABLE_COLUMNS: &[&str] = &[ID_COLUMN, OWNER_COLUMN, CREATED_AT_COLUMN];

/// Conversion of validated input into column assignments. Input types carry
/// no owner, so the owner column can only come from the repository.
pub trait IntoFields {
    fn into_fields(self) -> Fields;
}

/// A link from new input to another resource the same principal must own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedReference {
    /// Request field carrying the id, for error reports.
    pub field: &'static str,
    pub table: &'static str,
    pub name: &'static str,
    pub id: Uuid,
}

pub trait Resource: DeserializeOwned + Serialize + Send + Sync + 'static {
    const TABLE: &'static str;
    /// Human name used in error messages.
    const NAME: &'static str;
    /// Whether the table has an `updated_at` column.
    const TRACKS_UPDATES: bool;

    type New: IntoFields + Validate + Send;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;

    fn references(_input: &Self::New) -> Vec<OwnedReference> {
        Vec::new()
    }

    fn is_owned_by(&self, principal: &Principal) -> bool {
        self.owner_id() == principal.id()
    }
}

/// Resources that can change after creation.
pub trait Patchable: Resource {
    type Patch: IntoFields + Validate + Send;
}

macro_rules! impl_resource_ids {
    () => {
        fn id(&self) -> ::uuid::Uuid {
            self.id
        }

        fn owner_id(&self) -> ::uuid::Uuid {
            self.owner_id
        }
    };
}

pub(crate) use impl_resource_ids;

use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_TEMPLATE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    #[serde(skip)]
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub instructions: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        key: "default",
        name: "Clean up",
        description: "Fix grammar and structure while keeping the original meaning",
        instructions: "You are an editing assistant. Rewrite the user's note with corrected spelling, grammar \
            and punctuation. Keep the author's voice and meaning. Use Markdown headings and lists where they \
            make the note easier to scan. Return only the rewritten note.",
    },
    Template {
        key: "summarize",
        name: "Summarize",
        description: "Condense the note into a short summary",
        instructions: "Summarize the user's note in at most five sentences. Lead with the single most important \
            point. Do not add information that is not in the note. Return only the summary.",
    },
    Template {
        key: "action_items",
        name: "Action items",
        description: "Extract concrete tasks from the note",
        instructions: "Extract every actionable task from the user's note as a Markdown checklist (`- [ ] ...`). \
            Start each item with a verb. Include owners or dates only when the note states them. If there are \
            no tasks, reply with `No action items.`",
    },
    Template {
        key: "outline",
        name: "Outline",
        description: "Reorganize the note as a hierarchical outline",
        instructions: "Reorganize the user's note into a hierarchical Markdown outline with at most three levels. \
            Group related ideas and drop repetition. Return only the outline.",
    },
    Template {
        key: "journal",
        name: "Journal entry",
        description: "Turn rough notes into a reflective journal entry",
        instructions: "Turn the user's note into a short first-person journal entry. Keep every fact from the \
            note, write in full sentences, and end with one line on what to focus on next.",
    },
];

pub fn find(key: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.key == key)
}

/// The catalog keyed by template type.
pub fn catalog() -> Value {
    let mut map = Map::new();
    for template in TEMPLATES {
        map.insert(template.key.to_string(), serde_json::json!(template));
    }
    Value::Object(map)
}
